/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::borrow::Cow;
use std::char::{decode_utf16, REPLACEMENT_CHARACTER};
use std::fmt;
use std::slice;
use std::str;

/// The text of an identifier, string or URL token.
///
/// Borrowed from the `SourceBuffer` when the token contained no escape,
/// owned (escape-decoded) otherwise.
/// A narrow string holds Latin-1 bytes and a wide one UTF-16 code units.
/// An escape-decoded string is narrow only when the source is narrow
/// and no escape produced a code point above U+00FF.
#[derive(Clone)]
pub enum ParserString<'i> {
    /// One byte per code point.
    Narrow(Cow<'i, [u8]>),
    /// UTF-16 code units.
    Wide(Cow<'i, [u16]>),
}

/// Iterator over the code units of a `ParserString`, widened to `u16`.
pub struct Units<'a>(UnitsInner<'a>);

enum UnitsInner<'a> {
    Narrow(slice::Iter<'a, u8>),
    Wide(slice::Iter<'a, u16>),
}

impl<'a> Iterator for Units<'a> {
    type Item = u16;

    #[inline]
    fn next(&mut self) -> Option<u16> {
        match self.0 {
            UnitsInner::Narrow(ref mut iter) => iter.next().map(|&b| b as u16),
            UnitsInner::Wide(ref mut iter) => iter.next().copied(),
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.0 {
            UnitsInner::Narrow(ref iter) => iter.size_hint(),
            UnitsInner::Wide(ref iter) => iter.size_hint(),
        }
    }
}

#[inline]
fn ascii_lowercase_unit(unit: u16) -> u16 {
    if (b'A' as u16..=b'Z' as u16).contains(&unit) {
        unit + 0x20
    } else {
        unit
    }
}

impl<'i> ParserString<'i> {
    /// Whether the string stores one byte per code unit.
    #[inline]
    pub fn is_8bit(&self) -> bool {
        matches!(*self, ParserString::Narrow(_))
    }

    /// Number of code units.
    #[inline]
    pub fn len(&self) -> usize {
        match *self {
            ParserString::Narrow(ref bytes) => bytes.len(),
            ParserString::Wide(ref units) => units.len(),
        }
    }

    /// Whether the string has no code unit.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The code unit at `index`, or 0 past the end.
    #[inline]
    pub fn unit_at(&self, index: usize) -> u16 {
        match *self {
            ParserString::Narrow(ref bytes) => bytes.get(index).map_or(0, |&b| b as u16),
            ParserString::Wide(ref units) => units.get(index).copied().unwrap_or(0),
        }
    }

    /// The code units, widened to `u16`.
    #[inline]
    pub fn units(&self) -> Units<'_> {
        Units(match *self {
            ParserString::Narrow(ref bytes) => UnitsInner::Narrow(bytes.iter()),
            ParserString::Wide(ref units) => UnitsInner::Wide(units.iter()),
        })
    }

    /// The code points. Unpaired surrogates become U+FFFD.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        decode_utf16(self.units()).map(|c| c.unwrap_or(REPLACEMENT_CHARACTER))
    }

    /// The string as UTF-8, borrowing when it is narrow and ASCII-only.
    pub fn to_str(&self) -> Cow<'_, str> {
        if let ParserString::Narrow(ref bytes) = *self {
            if bytes.is_ascii() {
                if let Ok(s) = str::from_utf8(bytes) {
                    return Cow::Borrowed(s);
                }
            }
        }
        Cow::Owned(self.chars().collect())
    }

    /// ASCII case-insensitive comparison with a `&str`.
    pub fn eq_ignore_ascii_case(&self, other: &str) -> bool {
        let mut units = self.units();
        for expected in other.encode_utf16() {
            match units.next() {
                Some(unit) if ascii_lowercase_unit(unit) == ascii_lowercase_unit(expected) => {}
                _ => return false,
            }
        }
        units.next().is_none()
    }

    /// ASCII case-insensitive prefix test.
    pub fn starts_with_ignore_ascii_case(&self, prefix: &str) -> bool {
        let mut units = self.units();
        prefix.encode_utf16().all(|expected| {
            units.next().map_or(false, |unit| {
                ascii_lowercase_unit(unit) == ascii_lowercase_unit(expected)
            })
        })
    }

    /// Lowercase the ASCII range in place. Allocates only when a letter changes.
    pub fn lower(&mut self) {
        if !self.units().any(|unit| (b'A' as u16..=b'Z' as u16).contains(&unit)) {
            return;
        }
        match *self {
            ParserString::Narrow(ref mut bytes) => bytes.to_mut().make_ascii_lowercase(),
            ParserString::Wide(ref mut units) => {
                for unit in units.to_mut().iter_mut() {
                    *unit = ascii_lowercase_unit(*unit);
                }
            }
        }
    }

    /// The string as ASCII-lowercased UTF-8, for keyword and map lookups.
    pub fn to_ascii_key(&self) -> String {
        let mut key = self.to_str().into_owned();
        key.make_ascii_lowercase();
        key
    }

    /// Detach from the source buffer.
    pub fn into_owned(self) -> ParserString<'static> {
        match self {
            ParserString::Narrow(bytes) => ParserString::Narrow(Cow::Owned(bytes.into_owned())),
            ParserString::Wide(units) => ParserString::Wide(Cow::Owned(units.into_owned())),
        }
    }
}

impl<'a> From<&'a str> for ParserString<'static> {
    fn from(s: &'a str) -> ParserString<'static> {
        if s.chars().all(|c| c <= '\u{FF}') {
            ParserString::Narrow(Cow::Owned(s.chars().map(|c| c as u8).collect()))
        } else {
            ParserString::Wide(Cow::Owned(s.encode_utf16().collect()))
        }
    }
}

impl<'a, 'b> PartialEq<ParserString<'b>> for ParserString<'a> {
    fn eq(&self, other: &ParserString<'b>) -> bool {
        self.len() == other.len() && self.units().eq(other.units())
    }
}

impl<'a> Eq for ParserString<'a> {}

impl<'a> PartialEq<str> for ParserString<'a> {
    fn eq(&self, other: &str) -> bool {
        self.units().eq(other.encode_utf16())
    }
}

impl<'a, 'b> PartialEq<&'b str> for ParserString<'a> {
    fn eq(&self, other: &&'b str) -> bool {
        *self == **other
    }
}

impl<'a> fmt::Display for ParserString<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_str())
    }
}

impl<'a> fmt::Debug for ParserString<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&*self.to_str(), f)
    }
}

/// Output buffer for the escape-decoding pass of the tokenizer.
///
/// Starts at the width of the source and widens on the first code point
/// above U+00FF.
pub(crate) enum StringBuilder {
    Narrow(Vec<u8>),
    Wide(Vec<u16>),
}

impl StringBuilder {
    pub(crate) fn with_capacity(narrow: bool, capacity: usize) -> StringBuilder {
        if narrow {
            StringBuilder::Narrow(Vec::with_capacity(capacity))
        } else {
            StringBuilder::Wide(Vec::with_capacity(capacity))
        }
    }

    /// Start from a copy of `prefix`, the part of the token before its first escape.
    pub(crate) fn from_prefix(prefix: &ParserString, capacity: usize) -> StringBuilder {
        let mut builder = StringBuilder::with_capacity(prefix.is_8bit(), capacity.max(prefix.len()));
        for unit in prefix.units() {
            builder.push_unit(unit);
        }
        builder
    }

    #[cold]
    fn widen(&mut self) {
        if let StringBuilder::Narrow(ref bytes) = *self {
            let mut units = Vec::with_capacity(bytes.capacity().max(bytes.len() + 1));
            units.extend(bytes.iter().map(|&b| b as u16));
            *self = StringBuilder::Wide(units);
        }
    }

    /// Copy one code unit of the source.
    #[inline]
    pub(crate) fn push_unit(&mut self, unit: u16) {
        if unit > 0xFF {
            self.widen();
        }
        match *self {
            StringBuilder::Narrow(ref mut bytes) => bytes.push(unit as u8),
            StringBuilder::Wide(ref mut units) => units.push(unit),
        }
    }

    /// Append a decoded code point.
    pub(crate) fn push_char(&mut self, c: char) {
        let mut buffer = [0; 2];
        for &unit in c.encode_utf16(&mut buffer).iter() {
            self.push_unit(unit);
        }
    }

    pub(crate) fn finish(self) -> ParserString<'static> {
        match self {
            StringBuilder::Narrow(bytes) => ParserString::Narrow(Cow::Owned(bytes)),
            StringBuilder::Wide(units) => ParserString::Wide(Cow::Owned(units)),
        }
    }
}
