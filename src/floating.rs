/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Intermediate objects of a production that has not been reduced yet.
//!
//! A `Floating<T>` is created through a `FloatingRegistry` and ends up either
//! sunk (its value moved into the object being built) or dropped when the
//! production is abandoned. Either way the registry count goes back down,
//! so a registry with live objects after an entry point returns is a bug.

use std::cell::Cell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use crate::media::{MediaQuery, MediaQueryExp};
use crate::parser_selector::ParserSelector;
use crate::rules::Keyframe;
use crate::selector::QualifiedName;
use crate::values::{ParserFunction, ParserValueList};

/// The kinds of intermediate objects the grammar driver tracks.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum FloatingKind {
    /// A `ParserSelector`.
    Selector,
    /// A vector of `ParserSelector`.
    SelectorVector,
    /// A `ParserValueList`.
    ValueList,
    /// A `ParserFunction`.
    Function,
    /// A `MediaQueryExp`.
    MediaQueryExp,
    /// A vector of `MediaQueryExp`.
    MediaQueryExpList,
    /// A `MediaQuery`.
    MediaQuery,
    /// A vector of `Keyframe`.
    KeyframeVector,
}

const KIND_COUNT: usize = 8;

impl FloatingKind {
    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            FloatingKind::Selector => "selector",
            FloatingKind::SelectorVector => "selector vector",
            FloatingKind::ValueList => "value list",
            FloatingKind::Function => "function",
            FloatingKind::MediaQueryExp => "media query expression",
            FloatingKind::MediaQueryExpList => "media query expression list",
            FloatingKind::MediaQuery => "media query",
            FloatingKind::KeyframeVector => "keyframe vector",
        }
    }
}

/// Counts the floating objects of one parser, per kind.
///
/// Clones share the same counters.
#[derive(Clone, Default)]
pub struct FloatingRegistry {
    live: Rc<[Cell<usize>; KIND_COUNT]>,
}

impl fmt::Debug for FloatingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FloatingRegistry")
            .field("live_count", &self.live_count())
            .finish()
    }
}

impl FloatingRegistry {
    /// A registry with nothing live.
    pub fn new() -> FloatingRegistry {
        FloatingRegistry::default()
    }

    /// Number of floating objects neither sunk nor dropped yet.
    pub fn live_count(&self) -> usize {
        self.live.iter().map(Cell::get).sum()
    }

    /// Number of live floating objects of one kind.
    pub fn live_count_of(&self, kind: FloatingKind) -> usize {
        self.live[kind.index()].get()
    }

    /// Register `value` as floating.
    pub fn create<T>(&self, kind: FloatingKind, value: T) -> Floating<T> {
        let counter = &self.live[kind.index()];
        counter.set(counter.get() + 1);
        Floating {
            value,
            guard: FloatingGuard {
                live: self.live.clone(),
                kind,
                sunk: false,
            },
        }
    }

    #[allow(missing_docs)]
    pub fn create_floating_selector(&self) -> Floating<ParserSelector> {
        self.create(FloatingKind::Selector, ParserSelector::new())
    }

    #[allow(missing_docs)]
    pub fn create_floating_selector_with_tag_name(
        &self,
        tag: QualifiedName,
    ) -> Floating<ParserSelector> {
        self.create(FloatingKind::Selector, ParserSelector::with_tag(tag, false))
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn sink_floating_selector(&self, selector: Floating<ParserSelector>) -> ParserSelector {
        selector.sink()
    }

    #[allow(missing_docs)]
    pub fn create_floating_selector_vector(&self) -> Floating<Vec<ParserSelector>> {
        self.create(FloatingKind::SelectorVector, Vec::new())
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn sink_floating_selector_vector(
        &self,
        selector_vector: Floating<Vec<ParserSelector>>,
    ) -> Vec<ParserSelector> {
        selector_vector.sink()
    }

    #[allow(missing_docs)]
    pub fn create_floating_value_list<'i>(&self) -> Floating<ParserValueList<'i>> {
        self.create(FloatingKind::ValueList, ParserValueList::new())
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn sink_floating_value_list<'i>(
        &self,
        list: Floating<ParserValueList<'i>>,
    ) -> ParserValueList<'i> {
        list.sink()
    }

    #[allow(missing_docs)]
    pub fn create_floating_function<'i>(
        &self,
        function: ParserFunction<'i>,
    ) -> Floating<ParserFunction<'i>> {
        self.create(FloatingKind::Function, function)
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn sink_floating_function<'i>(
        &self,
        function: Floating<ParserFunction<'i>>,
    ) -> ParserFunction<'i> {
        function.sink()
    }

    #[allow(missing_docs)]
    pub fn create_floating_media_query_exp(&self, exp: MediaQueryExp) -> Floating<MediaQueryExp> {
        self.create(FloatingKind::MediaQueryExp, exp)
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn sink_floating_media_query_exp(&self, exp: Floating<MediaQueryExp>) -> MediaQueryExp {
        exp.sink()
    }

    #[allow(missing_docs)]
    pub fn create_floating_media_query_exp_list(&self) -> Floating<Vec<MediaQueryExp>> {
        self.create(FloatingKind::MediaQueryExpList, Vec::new())
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn sink_floating_media_query_exp_list(
        &self,
        list: Floating<Vec<MediaQueryExp>>,
    ) -> Vec<MediaQueryExp> {
        list.sink()
    }

    #[allow(missing_docs)]
    pub fn create_floating_media_query(&self, query: MediaQuery) -> Floating<MediaQuery> {
        self.create(FloatingKind::MediaQuery, query)
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn sink_floating_media_query(&self, query: Floating<MediaQuery>) -> MediaQuery {
        query.sink()
    }

    #[allow(missing_docs)]
    pub fn create_floating_keyframe_vector(&self) -> Floating<Vec<Keyframe>> {
        self.create(FloatingKind::KeyframeVector, Vec::new())
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn sink_floating_keyframe_vector(&self, keyframes: Floating<Vec<Keyframe>>) -> Vec<Keyframe> {
        keyframes.sink()
    }
}

/// An object owned by a production that has not been reduced yet.
///
/// Dereferences to the object. `sink` hands it over; dropping the handle
/// destroys it.
pub struct Floating<T> {
    value: T,
    guard: FloatingGuard,
}

impl<T> Floating<T> {
    /// Take the object out of the registry's accounting.
    pub fn sink(self) -> T {
        let Floating { value, guard } = self;
        guard.disarm();
        value
    }

    /// What kind of object this is.
    #[inline]
    pub fn kind(&self) -> FloatingKind {
        self.guard.kind
    }
}

impl<T> Deref for Floating<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Floating<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for Floating<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Floating")
            .field("kind", &self.guard.kind)
            .field("value", &self.value)
            .finish()
    }
}

struct FloatingGuard {
    live: Rc<[Cell<usize>; KIND_COUNT]>,
    kind: FloatingKind,
    sunk: bool,
}

impl FloatingGuard {
    fn disarm(mut self) {
        self.sunk = true;
    }
}

impl Drop for FloatingGuard {
    fn drop(&mut self) {
        let counter = &self.live[self.kind.index()];
        debug_assert!(counter.get() > 0);
        counter.set(counter.get().saturating_sub(1));
        if !self.sunk {
            tracing::trace!(kind = self.kind.name(), "destroyed floating object");
        }
    }
}
