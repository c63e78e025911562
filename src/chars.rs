/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

// Name characters as defined by the XML 1.0 `Name` production (Appendix B),
// which is what namespace prefixes are validated against.

use std::cmp::Ordering;

use unicode_general_category::{get_general_category, GeneralCategory};

/// Whether `c` may start a name.
pub fn is_valid_name_start(c: char) -> bool {
    if c == ':' || c == '_' {
        return true;
    }

    // Modifier letters that XML treats as name start characters.
    if matches!(c, '\u{02BB}'..='\u{02C1}' | '\u{0559}' | '\u{06E5}' | '\u{06E6}') {
        return true;
    }

    match get_general_category(c) {
        GeneralCategory::LowercaseLetter
        | GeneralCategory::UppercaseLetter
        | GeneralCategory::OtherLetter
        | GeneralCategory::TitlecaseLetter
        | GeneralCategory::LetterNumber => {}
        _ => return false,
    }

    !is_excluded_compatibility_character(c)
}

/// Whether `c` may appear after the first character of a name.
pub fn is_valid_name_part(c: char) -> bool {
    if is_valid_name_start(c) {
        return true;
    }

    // Extenders
    if c == '\u{00B7}' || c == '\u{0387}' {
        return true;
    }

    if c == '-' || c == '.' {
        return true;
    }

    match get_general_category(c) {
        GeneralCategory::NonspacingMark
        | GeneralCategory::EnclosingMark
        | GeneralCategory::SpacingMark
        | GeneralCategory::ModifierLetter
        | GeneralCategory::DecimalNumber => {}
        _ => return false,
    }

    !is_excluded_compatibility_character(c)
}

/// Whether `name` is non-empty, starts with a name start character
/// and continues with name characters.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_valid_name_start(first) => chars.all(is_valid_name_part),
        _ => false,
    }
}

/// The compatibility area and characters with a `<font>` or `<compat>`
/// decomposition are never name characters. Other formatting decompositions
/// (`<super>`, `<sub>`, `<vertical>`, ...) and canonical ones do not exclude.
fn is_excluded_compatibility_character(c: char) -> bool {
    if ('\u{F900}'..'\u{FFFE}').contains(&c) {
        return true;
    }
    has_font_or_compat_decomposition(c)
}

fn has_font_or_compat_decomposition(c: char) -> bool {
    FONT_OR_COMPAT_DECOMPOSITIONS
        .binary_search_by(|&(first, last)| {
            if last < c {
                Ordering::Less
            } else if first > c {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        })
        .is_ok()
}

/// Letters, marks and digits outside U+F900..U+FFFE whose decomposition
/// type is `<font>` or `<compat>`. Sorted, inclusive.
pub(crate) static FONT_OR_COMPAT_DECOMPOSITIONS: &[(char, char)] = &[
    ('\u{0132}', '\u{0133}'),
    ('\u{013F}', '\u{0140}'),
    ('\u{0149}', '\u{0149}'),
    ('\u{017F}', '\u{017F}'),
    ('\u{01C4}', '\u{01CC}'),
    ('\u{01F1}', '\u{01F3}'),
    ('\u{037A}', '\u{037A}'),
    ('\u{03D0}', '\u{03D2}'),
    ('\u{03D5}', '\u{03D6}'),
    ('\u{03F0}', '\u{03F2}'),
    ('\u{03F4}', '\u{03F5}'),
    ('\u{03F9}', '\u{03F9}'),
    ('\u{0587}', '\u{0587}'),
    ('\u{0675}', '\u{0678}'),
    ('\u{0E33}', '\u{0E33}'),
    ('\u{0EB3}', '\u{0EB3}'),
    ('\u{0EDC}', '\u{0EDD}'),
    ('\u{0F77}', '\u{0F77}'),
    ('\u{0F79}', '\u{0F79}'),
    ('\u{1E9A}', '\u{1E9A}'),
    // Letterlike symbols
    ('\u{2102}', '\u{2102}'),
    ('\u{2107}', '\u{2107}'),
    ('\u{210A}', '\u{2113}'),
    ('\u{2115}', '\u{2115}'),
    ('\u{2119}', '\u{211D}'),
    ('\u{2124}', '\u{2124}'),
    ('\u{2128}', '\u{2128}'),
    ('\u{212C}', '\u{212D}'),
    ('\u{212F}', '\u{2131}'),
    ('\u{2133}', '\u{2139}'),
    ('\u{213C}', '\u{2140}'),
    ('\u{2145}', '\u{2149}'),
    // Roman numerals
    ('\u{2160}', '\u{217F}'),
    ('\u{3038}', '\u{303A}'),
    // Hangul compatibility jamo
    ('\u{3131}', '\u{318E}'),
    // Mathematical alphanumeric symbols
    ('\u{1D400}', '\u{1D7FF}'),
    ('\u{1EE00}', '\u{1EEFF}'),
    // Segmented digits
    ('\u{1FBF0}', '\u{1FBF9}'),
];
