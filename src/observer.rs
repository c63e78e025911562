/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use crate::error::ParseError;

/// The kind of rule passed to `ParserObserver::start_rule`.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
#[allow(missing_docs)]
pub enum RuleKind {
    Style,
    Charset,
    Import,
    Namespace,
    Media,
    Supports,
    Keyframes,
    Keyframe,
    Page,
    FontFace,
    Viewport,
}

/// Notifications sent while parsing, for tools that map rules and
/// declarations back to the source text.
///
/// Offsets count code units from the start of the caller's text.
/// Every method defaults to doing nothing, and none of them can affect parsing.
pub trait ParserObserver {
    /// A rule starts at `offset`.
    fn start_rule(&mut self, kind: RuleKind, offset: usize) {
        let _ = (kind, offset);
    }

    /// The body of the current rule ends at `offset`.
    fn end_rule(&mut self, offset: usize) {
        let _ = offset;
    }

    /// The prelude of the current rule starts at `offset`.
    fn start_selector(&mut self, offset: usize) {
        let _ = offset;
    }

    /// The prelude of the current rule ends at `offset`.
    fn end_selector(&mut self, offset: usize) {
        let _ = offset;
    }

    /// A declaration starts at `offset`.
    fn start_property(&mut self, offset: usize) {
        let _ = offset;
    }

    /// The current declaration ends at `offset`.
    /// `important` and `is_parsed` describe how it ended.
    fn end_property(&mut self, important: bool, is_parsed: bool, offset: usize) {
        let _ = (important, is_parsed, offset);
    }

    /// Something was dropped.
    fn report_error(&mut self, error: &ParseError) {
        let _ = error;
    }
}
