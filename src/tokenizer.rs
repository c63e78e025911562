/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

// https://drafts.csswg.org/css-syntax/#tokenization

use std::cell::Cell;
use std::char;

use self::Token::*;
use crate::match_byte;
use crate::source::{SourceBuffer, SourceLocation, SourcePosition};
use crate::string::{ParserString, StringBuilder};

/// One of the pieces the CSS input is broken into.
///
/// String-like payloads borrow from the `SourceBuffer`
/// when the token contained no escape sequence.
#[derive(PartialEq, Debug, Clone)]
pub enum Token<'i> {
    /// A [`<ident-token>`](https://drafts.csswg.org/css-syntax/#ident-token-diagram)
    Ident(ParserString<'i>),

    /// A [`<function-token>`](https://drafts.csswg.org/css-syntax/#function-token-diagram)
    ///
    /// The value (name) does not include the `(` marker.
    Function(ParserString<'i>),

    /// A [`<at-keyword-token>`](https://drafts.csswg.org/css-syntax/#at-keyword-token-diagram)
    ///
    /// The value does not include the `@` marker.
    AtKeyword(ParserString<'i>),

    /// A [`<hash-token>`](https://drafts.csswg.org/css-syntax/#hash-token-diagram) with the type flag set to "unrestricted"
    ///
    /// The value does not include the `#` marker.
    Hash(ParserString<'i>),

    /// A [`<hash-token>`](https://drafts.csswg.org/css-syntax/#hash-token-diagram) with the type flag set to "id"
    ///
    /// The value does not include the `#` marker.
    IdHash(ParserString<'i>), // Hash that is a valid ID selector.

    /// A [`<string-token>`](https://drafts.csswg.org/css-syntax/#string-token-diagram)
    ///
    /// The value does not include the quotes.
    QuotedString(ParserString<'i>),

    /// A [`<url-token>`](https://drafts.csswg.org/css-syntax/#url-token-diagram) or `url( <string-token> )`
    ///
    /// The value does not include the `url(` `)` markers or the quotes.
    Url(ParserString<'i>),

    /// A [`<number-token>`](https://drafts.csswg.org/css-syntax/#number-token-diagram)
    Number(Numeric),

    /// A [`<percentage-token>`](https://drafts.csswg.org/css-syntax/#percentage-token-diagram)
    ///
    /// The value is **not** divided by 100.
    Percentage(Numeric),

    /// A [`<dimension-token>`](https://drafts.csswg.org/css-syntax/#dimension-token-diagram)
    /// whose unit is one the tokenizer knows.
    Dimension(Numeric, Unit),

    /// A dimension whose unit is not a known keyword.
    ///
    /// Whether the unit is acceptable is left to whoever consumes the value.
    UnknownDimension(Numeric, ParserString<'i>),

    /// A [`<unicode-range-token>`](https://drafts.csswg.org/css-syntax/#urange)
    ///
    /// Components are the start and end code points, respectively.
    ///
    /// The tokenizer only reads up to 6 hex digit (up to 0xFF_FFFF),
    /// but does not check that code points are within the range of Unicode (up to U+10_FFFF).
    UnicodeRange(u32, u32),

    /// An *An+B* expression, only produced in `LexMode::NthChild`.
    ///
    /// The value is the source text, whitespace around the binary sign included.
    Nth(ParserString<'i>),

    /// A [`<whitespace-token>`](https://drafts.csswg.org/css-syntax/#whitespace-token-diagram)
    WhiteSpace,

    /// A `<delim-token>`
    Delim(char),

    /// A `:` `<colon-token>`
    Colon, // :

    /// A `;` `<semicolon-token>`
    Semicolon, // ;

    /// A `,` `<comma-token>`
    Comma, // ,

    /// A `~=` [`<include-match-token>`](https://drafts.csswg.org/css-syntax/#include-match-token-diagram)
    IncludeMatch,

    /// A `|=` [`<dash-match-token>`](https://drafts.csswg.org/css-syntax/#dash-match-token-diagram)
    DashMatch,

    /// A `^=` [`<prefix-match-token>`](https://drafts.csswg.org/css-syntax/#prefix-match-token-diagram)
    PrefixMatch,

    /// A `$=` [`<suffix-match-token>`](https://drafts.csswg.org/css-syntax/#suffix-match-token-diagram)
    SuffixMatch,

    /// A `*=` [`<substring-match-token>`](https://drafts.csswg.org/css-syntax/#substring-match-token-diagram)
    SubstringMatch,

    /// A `<!--` [`<CDO-token>`](https://drafts.csswg.org/css-syntax/#CDO-token-diagram)
    CDO,

    /// A `-->` [`<CDC-token>`](https://drafts.csswg.org/css-syntax/#CDC-token-diagram)
    CDC,

    /// `!` followed by optional whitespace and `important`.
    Important,

    /// A `<(-token>`
    ParenthesisBlock,

    /// A `<[-token>`
    SquareBracketBlock,

    /// A `<{-token>`
    CurlyBracketBlock,

    /// A `<)-token>`
    CloseParenthesis,

    /// A `<]-token>`
    CloseSquareBracket,

    /// A `<}-token>`
    CloseCurlyBracket,

    /// A `<bad-string-token>`
    ///
    /// This token always indicates a parse error.
    BadString,

    /// A `<bad-url-token>`
    ///
    /// This token always indicates a parse error.
    BadUrl,

    /// `and`, in `LexMode::MediaQuery`.
    MediaAnd,
    /// `not`, in `LexMode::MediaQuery`.
    MediaNot,
    /// `only`, in `LexMode::MediaQuery`.
    MediaOnly,
    /// `or`, in `LexMode::MediaQuery`.
    MediaOr,

    /// `and`, in `LexMode::Supports`.
    SupportsAnd,
    /// `not`, in `LexMode::Supports`.
    SupportsNot,
    /// `or`, in `LexMode::Supports`.
    SupportsOr,
}

impl<'i> Token<'i> {
    /// Return whether this token represents a parse error.
    ///
    /// `BadUrl` and `BadString` are tokenizer-level parse errors.
    ///
    /// `CloseParenthesis`, `CloseSquareBracket`, and `CloseCurlyBracket` are *unmatched*
    /// and therefore parse errors when returned by one of the driver's `next*` helpers.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            *self,
            BadUrl | BadString | CloseParenthesis | CloseSquareBracket | CloseCurlyBracket
        )
    }

    /// Detach the payload from the source buffer.
    pub fn into_owned(self) -> Token<'static> {
        match self {
            Ident(s) => Ident(s.into_owned()),
            Function(s) => Function(s.into_owned()),
            AtKeyword(s) => AtKeyword(s.into_owned()),
            Hash(s) => Hash(s.into_owned()),
            IdHash(s) => IdHash(s.into_owned()),
            QuotedString(s) => QuotedString(s.into_owned()),
            Url(s) => Url(s.into_owned()),
            Number(n) => Number(n),
            Percentage(n) => Percentage(n),
            Dimension(n, unit) => Dimension(n, unit),
            UnknownDimension(n, unit) => UnknownDimension(n, unit.into_owned()),
            UnicodeRange(start, end) => UnicodeRange(start, end),
            Nth(s) => Nth(s.into_owned()),
            WhiteSpace => WhiteSpace,
            Delim(c) => Delim(c),
            Colon => Colon,
            Semicolon => Semicolon,
            Comma => Comma,
            IncludeMatch => IncludeMatch,
            DashMatch => DashMatch,
            PrefixMatch => PrefixMatch,
            SuffixMatch => SuffixMatch,
            SubstringMatch => SubstringMatch,
            CDO => CDO,
            CDC => CDC,
            Important => Important,
            ParenthesisBlock => ParenthesisBlock,
            SquareBracketBlock => SquareBracketBlock,
            CurlyBracketBlock => CurlyBracketBlock,
            CloseParenthesis => CloseParenthesis,
            CloseSquareBracket => CloseSquareBracket,
            CloseCurlyBracket => CloseCurlyBracket,
            BadString => BadString,
            BadUrl => BadUrl,
            MediaAnd => MediaAnd,
            MediaNot => MediaNot,
            MediaOnly => MediaOnly,
            MediaOr => MediaOr,
            SupportsAnd => SupportsAnd,
            SupportsNot => SupportsNot,
            SupportsOr => SupportsOr,
        }
    }
}

/// The numeric payload of `Number`, `Percentage` and dimension tokens.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Numeric {
    /// The value, clamped to the range of `f32`.
    pub value: f64,

    /// If the origin source did not include a fractional part or an exponent,
    /// the value as an integer, saturated to the range of `i32`.
    pub int_value: Option<i32>,

    /// Whether the number had a `+` or `-` sign.
    ///
    /// This is used is some cases like the <An+B> micro syntax. (See the `parse_nth` function.)
    pub has_sign: bool,
}

impl Numeric {
    /// An unsigned integer value.
    pub fn integer(value: i32) -> Numeric {
        Numeric {
            value: value as f64,
            int_value: Some(value),
            has_sign: false,
        }
    }
}

/// Units the tokenizer recognizes on a dimension.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum Unit {
    Em,
    Ex,
    Px,
    Cm,
    Mm,
    In,
    Pt,
    Pc,
    Q,
    Deg,
    Rad,
    Grad,
    Turn,
    Ms,
    S,
    Hz,
    Khz,
    Dppx,
    X,
    Dpi,
    Dpcm,
    Fr,
    Ch,
    Rem,
    Vw,
    Vh,
    Vmin,
    Vmax,
}

impl Unit {
    /// Look up a unit keyword, ASCII case-insensitively.
    pub fn from_ident(name: &str) -> Option<Unit> {
        ascii_case_insensitive_phf_map! {
            unit -> Unit = {
                "em" => Unit::Em,
                "ex" => Unit::Ex,
                "px" => Unit::Px,
                "cm" => Unit::Cm,
                "mm" => Unit::Mm,
                "in" => Unit::In,
                "pt" => Unit::Pt,
                "pc" => Unit::Pc,
                "q" => Unit::Q,
                "deg" => Unit::Deg,
                "rad" => Unit::Rad,
                "grad" => Unit::Grad,
                "turn" => Unit::Turn,
                "ms" => Unit::Ms,
                "s" => Unit::S,
                "hz" => Unit::Hz,
                "khz" => Unit::Khz,
                "dppx" => Unit::Dppx,
                "x" => Unit::X,
                "dpi" => Unit::Dpi,
                "dpcm" => Unit::Dpcm,
                "fr" => Unit::Fr,
                "ch" => Unit::Ch,
                "rem" => Unit::Rem,
                "vw" => Unit::Vw,
                "vh" => Unit::Vh,
                "vmin" => Unit::Vmin,
                "vmax" => Unit::Vmax,
            }
        }
        unit::get(name).copied()
    }

    /// The lowercase keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Em => "em",
            Unit::Ex => "ex",
            Unit::Px => "px",
            Unit::Cm => "cm",
            Unit::Mm => "mm",
            Unit::In => "in",
            Unit::Pt => "pt",
            Unit::Pc => "pc",
            Unit::Q => "q",
            Unit::Deg => "deg",
            Unit::Rad => "rad",
            Unit::Grad => "grad",
            Unit::Turn => "turn",
            Unit::Ms => "ms",
            Unit::S => "s",
            Unit::Hz => "hz",
            Unit::Khz => "khz",
            Unit::Dppx => "dppx",
            Unit::X => "x",
            Unit::Dpi => "dpi",
            Unit::Dpcm => "dpcm",
            Unit::Fr => "fr",
            Unit::Ch => "ch",
            Unit::Rem => "rem",
            Unit::Vw => "vw",
            Unit::Vh => "vh",
            Unit::Vmin => "vmin",
            Unit::Vmax => "vmax",
        }
    }
}

/// Which sub-lexers are active.
///
/// The mode is chosen by the caller for every token;
/// the tokenizer itself never switches modes.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum LexMode {
    /// Plain CSS tokens.
    Normal,
    /// `and`, `not`, `only` and `or` become media keyword tokens.
    MediaQuery,
    /// `and`, `not` and `or` become supports keyword tokens.
    Supports,
    /// *An+B* expressions become `Nth` tokens.
    NthChild,
}

/// A saved position to go back to with `Tokenizer::reset`.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct TokenizerState {
    position: usize,
    token_start: usize,
}

impl TokenizerState {
    /// The position this state was saved at.
    #[inline]
    pub fn position(&self) -> SourcePosition {
        SourcePosition(self.position)
    }
}

/// Breaks a `SourceBuffer` into tokens, one at a time.
pub struct Tokenizer<'i> {
    source: &'i SourceBuffer,
    /// Counted in code units, padding included.
    position: usize,
    token_start: usize,
    first_line: u32,
    /// Cache for `source_location()`
    last_known_line_break: Cell<(u32, usize)>,
}

impl<'i> Tokenizer<'i> {
    /// A tokenizer at the start of `source`, whose text begins on line 1.
    #[inline]
    pub fn new(source: &'i SourceBuffer) -> Tokenizer<'i> {
        Tokenizer::with_first_line(source, 1)
    }

    /// A tokenizer at the start of `source`, whose text begins on `first_line`.
    #[inline]
    pub fn with_first_line(source: &'i SourceBuffer, first_line: u32) -> Tokenizer<'i> {
        Tokenizer {
            source,
            position: 0,
            token_start: 0,
            first_line,
            last_known_line_break: Cell::new((first_line, source.prefix_len())),
        }
    }

    /// The next token in `mode`, or `Err(())` at the end of the input.
    ///
    /// Comments are skipped.
    pub fn next(&mut self, mode: LexMode) -> Result<Token<'i>, ()> {
        loop {
            self.token_start = self.position;
            if self.is_eof() {
                return Err(());
            }
            if mode == LexMode::NthChild {
                if let Some(token) = consume_nth(self) {
                    return Ok(token);
                }
            }
            if self.starts_with(b"/*") {
                consume_comment(self);
                continue;
            }
            let token = next_token(self);
            return Ok(match mode {
                LexMode::MediaQuery => media_keyword(token),
                LexMode::Supports => supports_keyword(token),
                LexMode::Normal | LexMode::NthChild => token,
            });
        }
    }

    /// The buffer being tokenized.
    #[inline]
    pub fn source(&self) -> &'i SourceBuffer {
        self.source
    }

    /// Save the current position.
    #[inline]
    pub fn state(&self) -> TokenizerState {
        TokenizerState {
            position: self.position,
            token_start: self.token_start,
        }
    }

    /// Go back (or forward) to a saved position.
    #[inline]
    pub fn reset(&mut self, state: &TokenizerState) {
        self.position = state.position;
        self.token_start = state.token_start;
    }

    /// The current position.
    #[inline]
    pub fn position(&self) -> SourcePosition {
        SourcePosition(self.position)
    }

    /// Where the last token returned by `next` started.
    #[inline]
    pub fn token_start(&self) -> SourcePosition {
        SourcePosition(self.token_start)
    }

    /// The line of the current position.
    #[inline]
    pub fn line(&self) -> u32 {
        self.current_source_location().line
    }

    /// The line the last token started on.
    #[inline]
    pub fn token_start_line(&self) -> u32 {
        self.source_location(self.token_start()).line
    }

    /// The text from `start` to the current position.
    #[inline]
    pub fn slice_from(&self, start: SourcePosition) -> ParserString<'i> {
        self.source.slice(start.0, self.position)
    }

    /// Line and column of the current position.
    #[inline]
    pub fn current_source_location(&self) -> SourceLocation {
        self.source_location(self.position())
    }

    /// Line and column of `position`, relative to the caller's text:
    /// the synthetic prefix is not counted.
    pub fn source_location(&self, position: SourcePosition) -> SourceLocation {
        let text_start = self.source.prefix_len();
        let target = position.0.max(text_start).min(self.source.len());
        let (mut line_number, mut line_start) = {
            let (line, after_break) = self.last_known_line_break.get();
            if target >= after_break {
                (line, after_break)
            } else {
                (self.first_line, text_start)
            }
        };
        let mut index = line_start;
        while index < target {
            match self.source.unit_at(index) {
                0x0A | 0x0C => {
                    index += 1;
                    line_number += 1;
                    line_start = index;
                }
                0x0D => {
                    index += 1;
                    if self.source.unit_at(index) == 0x0A {
                        index += 1;
                    }
                    line_number += 1;
                    line_start = index;
                }
                _ => index += 1,
            }
        }
        self.last_known_line_break.set((line_number, line_start));
        SourceLocation {
            line: line_number,
            // `target == line_start` at the beginning of a line,
            // so add 1 so that the column numbers start at 1.
            column: (target.saturating_sub(line_start) + 1) as u32,
        }
    }

    /// Upper bound on the decoded length of the identifier at the current position.
    #[inline]
    pub fn peek_max_identifier_len(&self) -> usize {
        self.max_identifier_len_from(self.position)
    }

    /// Upper bound on the decoded length of a string whose opening `quote`
    /// was just consumed.
    #[inline]
    pub fn peek_max_string_len(&self, quote: char) -> usize {
        self.max_string_len_from(self.position, quote as u16)
    }

    /// Upper bound on the decoded length of an unquoted URL
    /// whose `url(` and leading whitespace were just consumed.
    #[inline]
    pub fn peek_max_uri_len(&self) -> usize {
        self.max_uri_len_from(self.position)
    }

    fn max_identifier_len_from(&self, start: usize) -> usize {
        let len = self.source.len();
        let mut index = start;
        while index < len {
            let unit = self.source.unit_at(index);
            if unit == b'\\' as u16 {
                index += 2;
            } else if unit >= 0x80 || unit == 0 || is_name_byte(unit as u8) {
                index += 1;
            } else {
                break;
            }
        }
        index.min(len) - start
    }

    fn max_string_len_from(&self, start: usize, quote: u16) -> usize {
        let len = self.source.len();
        let mut index = start;
        while index < len {
            match self.source.unit_at(index) {
                unit if unit == quote => break,
                0x0A | 0x0C | 0x0D => break,
                0x5C => index += 2,
                _ => index += 1,
            }
        }
        index.min(len) - start
    }

    fn max_uri_len_from(&self, start: usize) -> usize {
        let len = self.source.len();
        let mut index = start;
        while index < len {
            match self.source.unit_at(index) {
                0x29 | 0x20 | 0x09 | 0x0A | 0x0C | 0x0D => break,
                0x5C => index += 2,
                _ => index += 1,
            }
        }
        index.min(len) - start
    }

    // If false, `tokenizer.next_unit()` will not return the end sentinel.
    #[inline]
    fn is_eof(&self) -> bool {
        !self.has_at_least(0)
    }

    // If true, the input has at least `n` code units left *after* the current one.
    #[inline]
    fn has_at_least(&self, n: usize) -> bool {
        self.position + n < self.source.len()
    }

    #[inline]
    fn advance(&mut self, n: usize) {
        self.position += n
    }

    #[inline]
    fn next_unit(&self) -> u16 {
        self.source.unit_at(self.position)
    }

    // Non-ASCII code units all map to 0x80.
    #[inline]
    fn next_byte(&self) -> u8 {
        lead_byte(self.next_unit())
    }

    #[inline]
    fn byte_at(&self, offset: usize) -> u8 {
        lead_byte(self.source.unit_at(self.position + offset))
    }

    #[inline]
    fn has_newline_at(&self, offset: usize) -> bool {
        self.position + offset < self.source.len()
            && matches!(self.byte_at(offset), b'\n' | b'\r' | b'\x0C')
    }

    #[inline]
    fn starts_with(&self, needle: &[u8]) -> bool {
        needle
            .iter()
            .enumerate()
            .all(|(i, &b)| self.source.unit_at(self.position + i) == b as u16)
    }

    // Consume one code point, pairing surrogates in a wide buffer.
    fn consume_char(&mut self) -> char {
        let unit = self.next_unit();
        self.advance(1);
        match unit {
            0xD800..=0xDBFF => {
                let trail = self.next_unit();
                if (0xDC00..=0xDFFF).contains(&trail) && !self.is_eof() {
                    self.advance(1);
                    let c = 0x10000 + (((unit as u32) - 0xD800) << 10) + ((trail as u32) - 0xDC00);
                    char::from_u32(c).unwrap_or('\u{FFFD}')
                } else {
                    '\u{FFFD}'
                }
            }
            0xDC00..=0xDFFF => '\u{FFFD}',
            _ => char::from_u32(unit as u32).unwrap_or('\u{FFFD}'),
        }
    }

    fn consume_newline(&mut self) {
        let byte = self.next_byte();
        debug_assert!(byte == b'\r' || byte == b'\n' || byte == b'\x0C');
        self.advance(1);
        if byte == b'\r' && self.next_byte() == b'\n' {
            self.advance(1);
        }
    }
}

#[inline]
fn lead_byte(unit: u16) -> u8 {
    if unit < 0x80 {
        unit as u8
    } else {
        0x80
    }
}

#[inline]
fn is_name_byte(b: u8) -> bool {
    matches!(b, b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'-')
}

#[inline]
fn is_whitespace_byte(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')
}

fn next_token<'i>(tokenizer: &mut Tokenizer<'i>) -> Token<'i> {
    let b = tokenizer.next_byte();
    match_byte! { b,
        b' ' | b'\t' | b'\n' | b'\r' | b'\x0C' => {
            consume_whitespace(tokenizer);
            WhiteSpace
        },
        b'"' => { consume_string(tokenizer, false) },
        b'#' => {
            tokenizer.advance(1);
            if is_ident_start(tokenizer) { IdHash(consume_name(tokenizer)) }
            else if !tokenizer.is_eof() && match_byte! { tokenizer.next_byte(),
                // Any other valid case here already resulted in IdHash.
                b'0'..=b'9' | b'-' => true,
                b'\\' => !tokenizer.has_newline_at(1),
                _ => false,
            } { Hash(consume_name(tokenizer)) }
            else { Delim('#') }
        },
        b'$' => {
            if tokenizer.starts_with(b"$=") { tokenizer.advance(2); SuffixMatch }
            else { tokenizer.advance(1); Delim('$') }
        },
        b'\'' => { consume_string(tokenizer, true) },
        b'(' => { tokenizer.advance(1); ParenthesisBlock },
        b')' => { tokenizer.advance(1); CloseParenthesis },
        b'*' => {
            if tokenizer.starts_with(b"*=") { tokenizer.advance(2); SubstringMatch }
            else { tokenizer.advance(1); Delim('*') }
        },
        b'+' => {
            if (
                tokenizer.has_at_least(1)
                && tokenizer.byte_at(1).is_ascii_digit()
            ) || (
                tokenizer.has_at_least(2)
                && tokenizer.byte_at(1) == b'.'
                && tokenizer.byte_at(2).is_ascii_digit()
            ) {
                consume_numeric(tokenizer)
            } else {
                tokenizer.advance(1);
                Delim('+')
            }
        },
        b',' => { tokenizer.advance(1); Comma },
        b'-' => {
            if (
                tokenizer.has_at_least(1)
                && tokenizer.byte_at(1).is_ascii_digit()
            ) || (
                tokenizer.has_at_least(2)
                && tokenizer.byte_at(1) == b'.'
                && tokenizer.byte_at(2).is_ascii_digit()
            ) {
                consume_numeric(tokenizer)
            } else if tokenizer.starts_with(b"-->") {
                tokenizer.advance(3);
                CDC
            } else if is_ident_start(tokenizer) {
                consume_ident_like(tokenizer)
            } else {
                tokenizer.advance(1);
                Delim('-')
            }
        },
        b'.' => {
            if tokenizer.has_at_least(1)
                && tokenizer.byte_at(1).is_ascii_digit() {
                consume_numeric(tokenizer)
            } else {
                tokenizer.advance(1);
                Delim('.')
            }
        },
        b'0'..=b'9' => { consume_numeric(tokenizer) },
        b':' => { tokenizer.advance(1); Colon },
        b';' => { tokenizer.advance(1); Semicolon },
        b'<' => {
            if tokenizer.starts_with(b"<!--") {
                tokenizer.advance(4);
                CDO
            } else {
                tokenizer.advance(1);
                Delim('<')
            }
        },
        b'@' => {
            tokenizer.advance(1);
            if is_ident_start(tokenizer) { AtKeyword(consume_name(tokenizer)) }
            else { Delim('@') }
        },
        b'u' | b'U' => {
            if tokenizer.has_at_least(2)
               && tokenizer.byte_at(1) == b'+'
               && matches!(tokenizer.byte_at(2), b'0'..=b'9' | b'a'..=b'f' | b'A'..=b'F' | b'?')
            { consume_unicode_range(tokenizer) }
            else { consume_ident_like(tokenizer) }
        },
        b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'\0' => { consume_ident_like(tokenizer) },
        b'[' => { tokenizer.advance(1); SquareBracketBlock },
        b'\\' => {
            if !tokenizer.has_newline_at(1) { consume_ident_like(tokenizer) }
            else { tokenizer.advance(1); Delim('\\') }
        },
        b']' => { tokenizer.advance(1); CloseSquareBracket },
        b'^' => {
            if tokenizer.starts_with(b"^=") { tokenizer.advance(2); PrefixMatch }
            else { tokenizer.advance(1); Delim('^') }
        },
        b'{' => { tokenizer.advance(1); CurlyBracketBlock },
        b'|' => {
            if tokenizer.starts_with(b"|=") { tokenizer.advance(2); DashMatch }
            else { tokenizer.advance(1); Delim('|') }
        },
        b'}' => { tokenizer.advance(1); CloseCurlyBracket },
        b'~' => {
            if tokenizer.starts_with(b"~=") { tokenizer.advance(2); IncludeMatch }
            else { tokenizer.advance(1); Delim('~') }
        },
        b'!' => { consume_important(tokenizer) },
        b => {
            if !b.is_ascii() {
                consume_ident_like(tokenizer)
            } else {
                tokenizer.advance(1);
                Delim(b as char)
            }
        },
    }
}

fn consume_whitespace(tokenizer: &mut Tokenizer) {
    while !tokenizer.is_eof() && is_whitespace_byte(tokenizer.next_byte()) {
        tokenizer.advance(1);
    }
}

fn consume_comment(tokenizer: &mut Tokenizer) {
    tokenizer.advance(2); // consume "/*"
    while !tokenizer.is_eof() {
        if tokenizer.starts_with(b"*/") {
            tokenizer.advance(2);
            return;
        }
        tokenizer.advance(1);
    }
}

fn consume_important<'i>(tokenizer: &mut Tokenizer<'i>) -> Token<'i> {
    tokenizer.advance(1); // consume '!'
    let after_bang = tokenizer.position;
    loop {
        consume_whitespace(tokenizer);
        if tokenizer.starts_with(b"/*") {
            consume_comment(tokenizer);
        } else {
            break;
        }
    }
    if is_ident_start(tokenizer) && consume_name(tokenizer).eq_ignore_ascii_case("important") {
        return Important;
    }
    tokenizer.position = after_bang;
    Delim('!')
}

fn media_keyword(token: Token) -> Token {
    if let Ident(ref name) = token {
        let keyword = match_ignore_ascii_case! { &name.to_str(),
            "and" => Some(MediaAnd),
            "not" => Some(MediaNot),
            "only" => Some(MediaOnly),
            "or" => Some(MediaOr),
            _ => None,
        };
        if let Some(keyword) = keyword {
            return keyword;
        }
    }
    token
}

fn supports_keyword(token: Token) -> Token {
    if let Ident(ref name) = token {
        let keyword = match_ignore_ascii_case! { &name.to_str(),
            "and" => Some(SupportsAnd),
            "not" => Some(SupportsNot),
            "or" => Some(SupportsOr),
            _ => None,
        };
        if let Some(keyword) = keyword {
            return keyword;
        }
    }
    token
}

// [+-]? <digits>? [nN] ( <ws>* [+-] <ws>* <digits> )?
// `odd`, `even` and plain integers stay ordinary tokens.
fn consume_nth<'i>(tokenizer: &mut Tokenizer<'i>) -> Option<Token<'i>> {
    let start = tokenizer.position();
    let mut offset = 0;
    if matches!(tokenizer.byte_at(0), b'+' | b'-') {
        offset += 1;
    }
    while tokenizer.byte_at(offset).is_ascii_digit() {
        offset += 1;
    }
    if !matches!(tokenizer.byte_at(offset), b'n' | b'N') {
        return None;
    }
    offset += 1;
    let after_n = offset;

    let mut end = None;
    let mut probe = after_n;
    while is_whitespace_byte(tokenizer.byte_at(probe)) {
        probe += 1;
    }
    if matches!(tokenizer.byte_at(probe), b'+' | b'-') {
        probe += 1;
        while is_whitespace_byte(tokenizer.byte_at(probe)) {
            probe += 1;
        }
        if tokenizer.byte_at(probe).is_ascii_digit() {
            while tokenizer.byte_at(probe).is_ascii_digit() {
                probe += 1;
            }
            end = Some(probe);
        }
    }
    let end = match end {
        Some(end) => end,
        None => {
            // `n` must not be the start of a longer identifier, like `none`.
            let next = tokenizer.byte_at(after_n);
            if is_name_byte(next) || next == b'\\' || !next.is_ascii() {
                return None;
            }
            after_n
        }
    };
    tokenizer.advance(end);
    Some(Nth(tokenizer.slice_from(start)))
}

fn consume_string<'i>(tokenizer: &mut Tokenizer<'i>, single_quote: bool) -> Token<'i> {
    match consume_quoted_string(tokenizer, single_quote) {
        Ok(value) => QuotedString(value),
        Err(()) => BadString,
    }
}

/// Return `Err(())` on syntax error (ie. unescaped newline)
fn consume_quoted_string<'i>(
    tokenizer: &mut Tokenizer<'i>,
    single_quote: bool,
) -> Result<ParserString<'i>, ()> {
    tokenizer.advance(1); // Skip the initial quote
    let quote = if single_quote { b'\'' } else { b'"' };
    let start_pos = tokenizer.position();
    let mut string;
    loop {
        if tokenizer.is_eof() {
            return Ok(tokenizer.slice_from(start_pos));
        }
        match_byte! { tokenizer.next_byte(),
            b'"' => {
                if !single_quote {
                    let value = tokenizer.slice_from(start_pos);
                    tokenizer.advance(1);
                    return Ok(value)
                }
                tokenizer.advance(1);
            },
            b'\'' => {
                if single_quote {
                    let value = tokenizer.slice_from(start_pos);
                    tokenizer.advance(1);
                    return Ok(value)
                }
                tokenizer.advance(1);
            },
            b'\\' | b'\0' => {
                let capacity = tokenizer.max_string_len_from(start_pos.0, quote as u16);
                string = StringBuilder::from_prefix(&tokenizer.slice_from(start_pos), capacity);
                break
            },
            b'\n' | b'\r' | b'\x0C' => { return Err(()) },
            _ => {
                tokenizer.advance(1);
            },
        }
    }

    while !tokenizer.is_eof() {
        let unit = tokenizer.next_unit();
        match_byte! { lead_byte(unit),
            b'\n' | b'\r' | b'\x0C' => {
                return Err(());
            },
            b'"' => {
                tokenizer.advance(1);
                if !single_quote {
                    break;
                }
                string.push_unit(unit);
            },
            b'\'' => {
                tokenizer.advance(1);
                if single_quote {
                    break;
                }
                string.push_unit(unit);
            },
            b'\\' => {
                tokenizer.advance(1);
                if !tokenizer.is_eof() {
                    match_byte! { tokenizer.next_byte(),
                        // Escaped newline
                        b'\n' | b'\x0C' | b'\r' => {
                            tokenizer.consume_newline();
                        },
                        _ => {
                            string.push_char(consume_escape(tokenizer));
                        },
                    }
                }
                // else: escaped EOF, do nothing.
            },
            b'\0' => {
                tokenizer.advance(1);
                string.push_char('\u{FFFD}');
            },
            _ => {
                tokenizer.advance(1);
                string.push_unit(unit);
            },
        }
    }
    Ok(string.finish())
}

#[inline]
fn is_ident_start(tokenizer: &Tokenizer) -> bool {
    !tokenizer.is_eof()
        && match_byte! { tokenizer.next_byte(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'\0' => true,
            b'-' => {
                tokenizer.has_at_least(1) && match_byte! { tokenizer.byte_at(1),
                    b'a'..=b'z' | b'A'..=b'Z' | b'-' | b'_' | b'\0' => true,
                    b'\\' => !tokenizer.has_newline_at(2),
                    b => !b.is_ascii(),
                }
            },
            b'\\' => !tokenizer.has_newline_at(1),
            b => !b.is_ascii(),
        }
}

fn consume_ident_like<'i>(tokenizer: &mut Tokenizer<'i>) -> Token<'i> {
    let value = consume_name(tokenizer);
    if !tokenizer.is_eof() && tokenizer.next_byte() == b'(' {
        tokenizer.advance(1);
        if value.eq_ignore_ascii_case("url") {
            consume_url(tokenizer)
        } else {
            Function(value)
        }
    } else {
        Ident(value)
    }
}

fn consume_name<'i>(tokenizer: &mut Tokenizer<'i>) -> ParserString<'i> {
    let start_pos = tokenizer.position();
    let mut value;
    loop {
        if tokenizer.is_eof() {
            return tokenizer.slice_from(start_pos);
        }
        match_byte! { tokenizer.next_byte(),
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'-' => { tokenizer.advance(1) },
            b'\\' | b'\0' => {
                let capacity = tokenizer.max_identifier_len_from(start_pos.0);
                value = StringBuilder::from_prefix(&tokenizer.slice_from(start_pos), capacity);
                break
            },
            b => {
                if b.is_ascii() {
                    return tokenizer.slice_from(start_pos);
                }
                tokenizer.advance(1);
            },
        }
    }

    while !tokenizer.is_eof() {
        let unit = tokenizer.next_unit();
        match_byte! { lead_byte(unit),
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'-' => {
                tokenizer.advance(1);
                value.push_unit(unit);
            },
            b'\\' => {
                if tokenizer.has_newline_at(1) { break }
                tokenizer.advance(1);
                value.push_char(consume_escape(tokenizer));
            },
            b'\0' => {
                tokenizer.advance(1);
                value.push_char('\u{FFFD}');
            },
            b => {
                if b.is_ascii() {
                    break;
                }
                tokenizer.advance(1);
                value.push_unit(unit);
            },
        }
    }
    value.finish()
}

#[inline]
fn byte_to_decimal_digit(b: u8) -> Option<u32> {
    if b.is_ascii_digit() {
        Some((b - b'0') as u32)
    } else {
        None
    }
}

#[inline]
fn byte_to_hex_digit(b: u8) -> Option<u32> {
    Some(match_byte! { b,
        b'0' ..= b'9' => { b - b'0' },
        b'a' ..= b'f' => { b - b'a' + 10 },
        b'A' ..= b'F' => { b - b'A' + 10 },
        _ => {
            return None
        },
    } as u32)
}

fn consume_numeric<'i>(tokenizer: &mut Tokenizer<'i>) -> Token<'i> {
    // Parse [+-]?\d*(\.\d+)?([eE][+-]?\d+)?
    // But this is always called so that there is at least one digit in \d*(\.\d+)?

    // Do all the math in f64 so that large numbers overflow to +/-inf
    // and i32::{MIN, MAX} are within range.

    let (has_sign, sign) = match tokenizer.next_byte() {
        b'-' => (true, -1.),
        b'+' => (true, 1.),
        _ => (false, 1.),
    };
    if has_sign {
        tokenizer.advance(1);
    }

    let mut integral_part: f64 = 0.;
    while let Some(digit) = byte_to_decimal_digit(tokenizer.next_byte()) {
        integral_part = integral_part * 10. + digit as f64;
        tokenizer.advance(1);
    }

    let mut is_integer = true;

    let mut fractional_part: f64 = 0.;
    if tokenizer.next_byte() == b'.' && tokenizer.byte_at(1).is_ascii_digit() {
        is_integer = false;
        tokenizer.advance(1); // Consume '.'
        let mut factor = 0.1;
        while let Some(digit) = byte_to_decimal_digit(tokenizer.next_byte()) {
            fractional_part += digit as f64 * factor;
            factor *= 0.1;
            tokenizer.advance(1);
        }
    }

    let mut value = sign * (integral_part + fractional_part);

    if matches!(tokenizer.next_byte(), b'e' | b'E')
        && (tokenizer.byte_at(1).is_ascii_digit()
            || (matches!(tokenizer.byte_at(1), b'+' | b'-')
                && tokenizer.byte_at(2).is_ascii_digit()))
    {
        is_integer = false;
        tokenizer.advance(1);
        let (has_sign, sign) = match tokenizer.next_byte() {
            b'-' => (true, -1.),
            b'+' => (true, 1.),
            _ => (false, 1.),
        };
        if has_sign {
            tokenizer.advance(1);
        }
        let mut exponent: f64 = 0.;
        while let Some(digit) = byte_to_decimal_digit(tokenizer.next_byte()) {
            exponent = exponent * 10. + digit as f64;
            tokenizer.advance(1);
        }
        value *= f64::powf(10., sign * exponent);
    }

    // 0 times an overflowing exponent.
    if value.is_nan() {
        value = 0.;
    }
    let value = value.max(-f32::MAX as f64).min(f32::MAX as f64);

    let int_value = if is_integer {
        Some(if value >= i32::MAX as f64 {
            i32::MAX
        } else if value <= i32::MIN as f64 {
            i32::MIN
        } else {
            value as i32
        })
    } else {
        None
    };

    let numeric = Numeric {
        value,
        int_value,
        has_sign,
    };

    if !tokenizer.is_eof() && tokenizer.next_byte() == b'%' {
        tokenizer.advance(1);
        return Percentage(numeric);
    }
    if is_ident_start(tokenizer) {
        let unit = consume_name(tokenizer);
        match Unit::from_ident(&unit.to_str()) {
            Some(unit) => Dimension(numeric, unit),
            None => UnknownDimension(numeric, unit),
        }
    } else {
        Number(numeric)
    }
}

fn consume_url<'i>(tokenizer: &mut Tokenizer<'i>) -> Token<'i> {
    while !tokenizer.is_eof() {
        match_byte! { tokenizer.next_byte(),
            b' ' | b'\t' | b'\n' | b'\r' | b'\x0C' => { tokenizer.advance(1) },
            b'"' => { return consume_quoted_url(tokenizer, false) },
            b'\'' => { return consume_quoted_url(tokenizer, true) },
            b')' => { tokenizer.advance(1); break },
            _ => { return consume_unquoted_url(tokenizer) },
        }
    }
    return Url(tokenizer.source.slice(0, 0));

    fn consume_quoted_url<'i>(tokenizer: &mut Tokenizer<'i>, single_quote: bool) -> Token<'i> {
        match consume_quoted_string(tokenizer, single_quote) {
            Ok(value) => consume_url_end(tokenizer, value),
            Err(()) => consume_bad_url(tokenizer),
        }
    }

    fn consume_unquoted_url<'i>(tokenizer: &mut Tokenizer<'i>) -> Token<'i> {
        let start_pos = tokenizer.position();
        let mut string;
        loop {
            if tokenizer.is_eof() {
                return Url(tokenizer.slice_from(start_pos));
            }
            match_byte! { tokenizer.next_byte(),
                b' ' | b'\t' | b'\n' | b'\r' | b'\x0C' => {
                    let value = tokenizer.slice_from(start_pos);
                    return consume_url_end(tokenizer, value)
                },
                b')' => {
                    let value = tokenizer.slice_from(start_pos);
                    tokenizer.advance(1);
                    return Url(value)
                },
                b'\x01'..=b'\x08' | b'\x0B' | b'\x0E'..=b'\x1F' | b'\x7F'  // non-printable
                    | b'"' | b'\'' | b'(' => {
                    tokenizer.advance(1);
                    return consume_bad_url(tokenizer)
                },
                b'\\' | b'\0' => {
                    let capacity = tokenizer.max_uri_len_from(start_pos.0);
                    string = StringBuilder::from_prefix(&tokenizer.slice_from(start_pos), capacity);
                    break
                },
                _ => {
                    tokenizer.advance(1);
                },
            }
        }
        while !tokenizer.is_eof() {
            let unit = tokenizer.next_unit();
            match_byte! { lead_byte(unit),
                b' ' | b'\t' | b'\n' | b'\r' | b'\x0C' => {
                    return consume_url_end(tokenizer, string.finish())
                },
                b')' => {
                    tokenizer.advance(1);
                    break;
                },
                b'\x01'..=b'\x08' | b'\x0B' | b'\x0E'..=b'\x1F' | b'\x7F'  // non-printable
                    | b'"' | b'\'' | b'(' => {
                    tokenizer.advance(1);
                    return consume_bad_url(tokenizer);
                },
                b'\\' => {
                    tokenizer.advance(1);
                    if tokenizer.has_newline_at(0) {
                        return consume_bad_url(tokenizer)
                    }
                    string.push_char(consume_escape(tokenizer));
                },
                b'\0' => {
                    tokenizer.advance(1);
                    string.push_char('\u{FFFD}');
                },
                _ => {
                    tokenizer.advance(1);
                    string.push_unit(unit);
                },
            }
        }
        Url(string.finish())
    }

    fn consume_url_end<'i>(tokenizer: &mut Tokenizer<'i>, string: ParserString<'i>) -> Token<'i> {
        while !tokenizer.is_eof() {
            match_byte! { tokenizer.next_byte(),
                b' ' | b'\t' | b'\n' | b'\r' | b'\x0C' => { tokenizer.advance(1) },
                b')' => {
                    tokenizer.advance(1);
                    break
                },
                _ => {
                    tokenizer.advance(1);
                    return consume_bad_url(tokenizer);
                },
            }
        }
        Url(string)
    }

    fn consume_bad_url<'i>(tokenizer: &mut Tokenizer<'i>) -> Token<'i> {
        // Consume up to the closing )
        while !tokenizer.is_eof() {
            match_byte! { tokenizer.next_byte(),
                b')' => {
                    tokenizer.advance(1);
                    break
                },
                b'\\' => {
                    tokenizer.advance(1);
                    if !tokenizer.is_eof() {
                        tokenizer.advance(1); // Skip an escaped ')' or '\'
                    }
                },
                _ => { tokenizer.advance(1) },
            }
        }
        BadUrl
    }
}

fn consume_unicode_range<'i>(tokenizer: &mut Tokenizer<'i>) -> Token<'i> {
    tokenizer.advance(2); // Skip U+
    let (hex_value, hex_digits) = consume_hex_digits(tokenizer);
    let max_question_marks = 6 - hex_digits;
    let mut question_marks = 0;
    while question_marks < max_question_marks && tokenizer.next_byte() == b'?' {
        question_marks += 1;
        tokenizer.advance(1)
    }

    let start;
    let end;
    if question_marks > 0 {
        start = hex_value << (question_marks * 4);
        end = ((hex_value + 1) << (question_marks * 4)) - 1;
    } else {
        start = hex_value;
        if tokenizer.next_byte() == b'-' && byte_to_hex_digit(tokenizer.byte_at(1)).is_some() {
            tokenizer.advance(1);
            end = consume_hex_digits(tokenizer).0;
        } else {
            end = start;
        }
    }
    UnicodeRange(start, end)
}

// (value, number of digits up to 6)
fn consume_hex_digits(tokenizer: &mut Tokenizer) -> (u32, u32) {
    let mut value = 0;
    let mut digits = 0;
    while digits < 6 {
        match byte_to_hex_digit(tokenizer.next_byte()) {
            Some(digit) => {
                value = value * 16 + digit;
                digits += 1;
                tokenizer.advance(1);
            }
            None => break,
        }
    }
    (value, digits)
}

// Assumes that the U+005C REVERSE SOLIDUS (\) has already been consumed
// and that the next input character has already been verified
// to not be a newline.
fn consume_escape(tokenizer: &mut Tokenizer) -> char {
    if tokenizer.is_eof() {
        return '\u{FFFD}'; // Escaped EOF
    }
    match_byte! { tokenizer.next_byte(),
        b'0'..=b'9' | b'A'..=b'F' | b'a'..=b'f' => {
            let (c, _) = consume_hex_digits(tokenizer);
            if !tokenizer.is_eof() {
                match_byte! { tokenizer.next_byte(),
                    b' ' | b'\t' => {
                        tokenizer.advance(1)
                    },
                    b'\n' | b'\x0C' | b'\r' => {
                        tokenizer.consume_newline();
                    },
                    _ => {},
                }
            }
            static REPLACEMENT_CHAR: char = '\u{FFFD}';
            if c != 0 {
                let c = char::from_u32(c);
                c.unwrap_or(REPLACEMENT_CHAR)
            } else {
                REPLACEMENT_CHAR
            }
        },
        b'\0' => {
            tokenizer.advance(1);
            '\u{FFFD}'
        },
        _ => { tokenizer.consume_char() },
    }
}
