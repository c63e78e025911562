/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::borrow::Cow;
use std::fmt;

use crate::string::ParserString;

#[derive(Clone, PartialEq, Eq)]
enum SourceText {
    /// Latin-1: one byte per code point.
    Narrow(Box<[u8]>),
    /// UTF-16 code units.
    Wide(Box<[u16]>),
}

/// The text being parsed, in one of two widths.
///
/// A buffer is narrow when every code point of the input is at most U+00FF,
/// and wide otherwise. The width never changes after construction.
///
/// Entry points of the grammar driver surround the caller's text with a
/// synthetic prefix (selecting the production to parse) and suffix.
/// Positions count code units of the whole buffer, padding included.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceBuffer {
    text: SourceText,
    prefix_len: usize,
    suffix_len: usize,
}

impl SourceBuffer {
    /// A buffer for `text`, with no padding.
    pub fn new(text: &str) -> SourceBuffer {
        SourceBuffer::with_padding("", text, "")
    }

    /// A buffer holding `prefix`, `text` and `suffix` back to back.
    pub fn with_padding(prefix: &str, text: &str, suffix: &str) -> SourceBuffer {
        let parts = [prefix, text, suffix];
        let narrow = parts
            .iter()
            .all(|part| part.chars().all(|c| c <= '\u{FF}'));
        if narrow {
            let bytes: Vec<u8> = parts
                .iter()
                .flat_map(|part| part.chars())
                .map(|c| c as u8)
                .collect();
            SourceBuffer {
                text: SourceText::Narrow(bytes.into_boxed_slice()),
                prefix_len: prefix.chars().count(),
                suffix_len: suffix.chars().count(),
            }
        } else {
            let units: Vec<u16> = parts.iter().flat_map(|part| part.encode_utf16()).collect();
            SourceBuffer {
                text: SourceText::Wide(units.into_boxed_slice()),
                prefix_len: prefix.encode_utf16().count(),
                suffix_len: suffix.encode_utf16().count(),
            }
        }
    }

    /// A narrow buffer over Latin-1 bytes.
    pub fn from_latin1(bytes: &[u8]) -> SourceBuffer {
        SourceBuffer {
            text: SourceText::Narrow(bytes.into()),
            prefix_len: 0,
            suffix_len: 0,
        }
    }

    /// A wide buffer over UTF-16 code units. Unpaired surrogates are kept as is.
    pub fn from_utf16(units: &[u16]) -> SourceBuffer {
        SourceBuffer {
            text: SourceText::Wide(units.into()),
            prefix_len: 0,
            suffix_len: 0,
        }
    }

    /// Whether the buffer stores one byte per code unit.
    #[inline]
    pub fn is_8bit(&self) -> bool {
        matches!(self.text, SourceText::Narrow(_))
    }

    /// Number of code units, padding included.
    #[inline]
    pub fn len(&self) -> usize {
        match self.text {
            SourceText::Narrow(ref bytes) => bytes.len(),
            SourceText::Wide(ref units) => units.len(),
        }
    }

    /// Whether the buffer holds no code unit at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of the synthetic prefix.
    #[inline]
    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    /// Length of the synthetic suffix.
    #[inline]
    pub fn suffix_len(&self) -> usize {
        self.suffix_len
    }

    /// The code unit at `index`, or 0 past the end.
    ///
    /// The zero sentinel lets lookahead run past the end without bounds checks
    /// at every call site.
    #[inline]
    pub fn unit_at(&self, index: usize) -> u16 {
        match self.text {
            SourceText::Narrow(ref bytes) => bytes.get(index).map_or(0, |&b| b as u16),
            SourceText::Wide(ref units) => units.get(index).copied().unwrap_or(0),
        }
    }

    /// Borrow the code units in `start..end` as a string of the buffer's width.
    pub fn slice(&self, start: usize, end: usize) -> ParserString<'_> {
        let end = end.min(self.len());
        let start = start.min(end);
        match self.text {
            SourceText::Narrow(ref bytes) => ParserString::Narrow(Cow::Borrowed(&bytes[start..end])),
            SourceText::Wide(ref units) => ParserString::Wide(Cow::Borrowed(&units[start..end])),
        }
    }

    /// Position of the first code unit of the caller's text.
    #[inline]
    pub fn text_start(&self) -> SourcePosition {
        SourcePosition(self.prefix_len)
    }

    /// Position just after the last code unit of the caller's text.
    #[inline]
    pub fn text_end(&self) -> SourcePosition {
        SourcePosition(self.len() - self.suffix_len)
    }

    /// Map a buffer position to an offset inside the caller's text,
    /// clamped to that text.
    pub fn text_offset(&self, position: SourcePosition) -> usize {
        let text_len = self.len() - self.prefix_len - self.suffix_len;
        position.0.saturating_sub(self.prefix_len).min(text_len)
    }
}

impl fmt::Debug for SourceBuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SourceBuffer")
            .field("is_8bit", &self.is_8bit())
            .field("text", &self.slice(0, self.len()).to_string())
            .field("prefix_len", &self.prefix_len)
            .field("suffix_len", &self.suffix_len)
            .finish()
    }
}

/// A position from the start of a `SourceBuffer`, in code units.
#[derive(PartialEq, Eq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
pub struct SourcePosition(pub(crate) usize);

impl SourcePosition {
    /// Returns the current code unit index in the buffer.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// The line and column number for a given position within the input.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceLocation {
    /// The line number, starting at the line the caller said the text starts on.
    pub line: u32,

    /// The column number within a line, starting at 1 for first code unit of the line.
    pub column: u32,
}
