/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use crate::source::SourceLocation;
use thiserror::Error;

/// What went wrong with a dropped rule, declaration or query.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A selector list that does not match the selector grammar.
    #[error("invalid selector")]
    InvalidSelector,
    /// A declaration that is not `name: value [!important]`.
    #[error("invalid declaration")]
    InvalidDeclaration,
    /// A declaration whose value could not be read as a value list.
    #[error("invalid property value")]
    InvalidPropertyValue,
    /// A rule that could not be parsed.
    #[error("invalid rule")]
    InvalidRule,
    /// A media query, replaced by `not all`.
    #[error("invalid media query")]
    InvalidMediaQuery,
    /// The condition of an `@supports` rule.
    #[error("invalid supports condition")]
    InvalidSupportsCondition,
    /// A keyframe selector that is not `from`, `to` or a percentage.
    #[error("invalid keyframe selector")]
    InvalidKeyframeSelector,
    /// A token that no production accepts at this point.
    #[error("unexpected token")]
    UnexpectedToken,
    /// The input ended in the middle of a production.
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    /// An at-rule whose name is not known.
    #[error("unknown at-rule @{0}")]
    UnknownAtRule(String),
}

/// A parse error, reported through `ParserObserver::report_error`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind} at {}:{}", location.line, location.column)]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Where the dropped construct starts.
    pub location: SourceLocation,
    /// The same position as an offset into the caller's text, in code units.
    pub offset: usize,
}

/// Misuse of a `ParserValueList` index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ValueListError {
    /// `index` is not a valid position in a list of `len` values.
    #[error("index {index} is out of bounds for a value list of length {len}")]
    IndexOutOfBounds {
        /// The rejected index.
        index: usize,
        /// The length of the list.
        len: usize,
    },
}
