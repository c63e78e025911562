/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use super::Token;

/// Parse the *An+B* notation, as found in the `:nth-child()` selector,
/// from the single token the tokenizer produced in `LexMode::NthChild`.
///
/// Return `Ok((A, B))`, or `Err(())` for a syntax error.
pub fn parse_nth(token: &Token) -> Result<(i32, i32), ()> {
    match *token {
        Token::Nth(ref text) => parse_nth_string(&text.to_str()),
        Token::Number(ref value) => Ok((0, value.int_value.ok_or(())?)),
        Token::Ident(ref value) => {
            match_ignore_ascii_case! { &value.to_str(),
                "even" => Ok((2, 0)),
                "odd" => Ok((2, 1)),
                _ => Err(()),
            }
        }
        _ => Err(()),
    }
}

/// Parse the text of an `Nth` token: `[+-]?<digits>?n`, optionally followed by
/// `<ws>* [+-] <ws>* <digits>`. Surrounding whitespace is ignored.
///
/// Coefficients saturate to the range of `i32`.
pub fn parse_nth_string(text: &str) -> Result<(i32, i32), ()> {
    let bytes = text.trim_matches(is_css_whitespace).as_bytes();
    let mut i = 0;

    let a_sign = match bytes.first() {
        Some(b'-') => {
            i += 1;
            -1
        }
        Some(b'+') => {
            i += 1;
            1
        }
        _ => 1,
    };
    let digits_start = i;
    let a_magnitude = parse_digits(bytes, &mut i);
    let a = if i == digits_start {
        a_sign
    } else {
        a_magnitude.saturating_mul(a_sign)
    };

    match bytes.get(i) {
        Some(b'n') | Some(b'N') => i += 1,
        _ => return Err(()),
    }
    skip_whitespace(bytes, &mut i);
    if i == bytes.len() {
        return Ok((a, 0));
    }

    let b_sign = match bytes[i] {
        b'+' => 1,
        b'-' => -1,
        _ => return Err(()),
    };
    i += 1;
    skip_whitespace(bytes, &mut i);
    let digits_start = i;
    let b = parse_digits(bytes, &mut i);
    if i == digits_start || i != bytes.len() {
        return Err(());
    }
    Ok((a, b.saturating_mul(b_sign)))
}

fn is_css_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

fn skip_whitespace(bytes: &[u8], i: &mut usize) {
    while bytes.get(*i).map_or(false, |&b| is_css_whitespace(b as char)) {
        *i += 1;
    }
}

fn parse_digits(bytes: &[u8], i: &mut usize) -> i32 {
    let mut value: i32 = 0;
    while let Some(&b) = bytes.get(*i) {
        if !b.is_ascii_digit() {
            break;
        }
        value = value.saturating_mul(10).saturating_add((b - b'0') as i32);
        *i += 1;
    }
    value
}
