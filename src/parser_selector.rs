/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::mem;

use crate::selector::{AttributeMatchType, ComplexSelector, Match, PseudoType, QualifiedName};
use crate::selector::{Relation, Selector, SelectorList};

/// A simple selector under construction, owning the chain to its left.
///
/// The chain reads key selector first: `tag_history` is the next selector
/// to the left and `selector().relation()` how the two are related.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ParserSelector {
    selector: Selector,
    tag_history: Option<Box<ParserSelector>>,
}

impl ParserSelector {
    /// An anonymous selector, to be filled in with the setters.
    pub fn new() -> ParserSelector {
        ParserSelector::default()
    }

    /// A type selector. An `implicit` tag is not serialized.
    pub fn with_tag(tag: QualifiedName, implicit: bool) -> ParserSelector {
        ParserSelector {
            selector: Selector::with_tag(tag, implicit),
            tag_history: None,
        }
    }

    /// The simple selector at the head of this chain.
    #[inline]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Hand over the head simple selector. The rest of the chain is dropped.
    pub fn release_selector(mut self) -> Selector {
        mem::take(&mut self.selector)
    }

    /// Freeze the whole chain, key selector first.
    pub fn into_complex_selector(self) -> ComplexSelector {
        let mut components = Vec::new();
        let mut current = self;
        loop {
            components.push(mem::take(&mut current.selector));
            match current.tag_history.take() {
                Some(next) => current = *next,
                None => break,
            }
        }
        ComplexSelector::from_components(components)
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn set_value(&mut self, value: &str) {
        self.selector.set_value(value)
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn set_attribute(&mut self, name: QualifiedName, match_type: AttributeMatchType) {
        self.selector.set_attribute(name, match_type)
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn set_argument(&mut self, argument: &str) {
        self.selector.set_argument(argument)
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn set_nth(&mut self, a: i32, b: i32) {
        self.selector.set_nth(a, b)
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn set_match(&mut self, match_type: Match) {
        self.selector.set_match(match_type)
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn set_relation(&mut self, relation: Relation) {
        self.selector.set_relation(relation)
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn set_for_page(&mut self) {
        self.selector.set_for_page()
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn set_selector_list(&mut self, list: SelectorList) {
        self.selector.set_selector_list(list)
    }

    /// Freeze the builders of `selector_vector` into this selector's list argument.
    pub fn adopt_selector_vector(&mut self, selector_vector: &mut Vec<ParserSelector>) {
        self.set_selector_list(SelectorList::adopt_selector_vector(selector_vector))
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn relation_is_affected_by_pseudo_content(&self) -> bool {
        self.selector.relation_is_affected_by_pseudo_content()
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn set_relation_is_affected_by_pseudo_content(&mut self) {
        self.selector.set_relation_is_affected_by_pseudo_content()
    }

    /// See `Selector::update_pseudo_type`.
    #[inline]
    pub fn update_pseudo_type(&mut self, value: &str, has_arguments: bool) {
        self.selector.update_pseudo_type(value, has_arguments)
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn pseudo_type(&self) -> PseudoType {
        self.selector.pseudo_type()
    }

    /// `-webkit-` and `-internal-` pseudo-elements.
    pub fn is_custom_pseudo_element(&self) -> bool {
        self.selector.match_type() == Match::PseudoElement
            && matches!(
                self.pseudo_type(),
                PseudoType::WebKitCustomElement | PseudoType::BlinkInternalElement
            )
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn is_pseudo_element(&self) -> bool {
        self.selector.match_type() == Match::PseudoElement
    }

    /// Pseudo-elements that live in a shadow tree of the element they apply to.
    pub fn crosses_tree_scopes(&self) -> bool {
        self.is_custom_pseudo_element()
            || matches!(
                self.pseudo_type(),
                PseudoType::Cue | PseudoType::Shadow | PseudoType::Slotted
            )
    }

    /// `::content`
    pub fn is_content_pseudo_element(&self) -> bool {
        self.selector.match_type() == Match::PseudoElement
            && self.pseudo_type() == PseudoType::Content
    }

    /// Whether the link to the tag history goes into a shadow tree.
    #[inline]
    pub fn has_shadow_pseudo(&self) -> bool {
        self.selector.relation() == Relation::ShadowPseudo
    }

    /// Whether `:host` or `:host-context` appears anywhere in the chain.
    pub fn has_host_pseudo_selector(&self) -> bool {
        let mut current = Some(self);
        while let Some(selector) = current {
            if matches!(
                selector.pseudo_type(),
                PseudoType::Host | PseudoType::HostContext
            ) {
                return true;
            }
            current = selector.tag_history();
        }
        false
    }

    /// Whether the chain is a single simple selector,
    /// possibly qualified by a universal type selector.
    pub fn is_simple(&self) -> bool {
        let mut current = self;
        loop {
            if current.selector.selector_list().is_some() || current.is_pseudo_element() {
                return false;
            }
            match current.tag_history {
                None => return true,
                // The namespace may not be the default one, so only `*` is checked.
                Some(ref tag_history) => {
                    let is_universal = current.selector.match_type() == Match::Tag
                        && current.selector.tag().map_or(false, QualifiedName::is_universal);
                    if !is_universal {
                        return false;
                    }
                    current = &**tag_history;
                }
            }
        }
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn tag_history(&self) -> Option<&ParserSelector> {
        self.tag_history.as_deref()
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn tag_history_mut(&mut self) -> Option<&mut ParserSelector> {
        self.tag_history.as_deref_mut()
    }

    /// Replace the chain to the left.
    #[inline]
    pub fn set_tag_history(&mut self, selector: Box<ParserSelector>) {
        self.tag_history = Some(selector)
    }

    /// Drop the chain to the left.
    #[inline]
    pub fn clear_tag_history(&mut self) {
        self.tag_history = None
    }

    /// Detach and return the chain to the left.
    #[inline]
    pub fn release_tag_history(&mut self) -> Option<Box<ParserSelector>> {
        self.tag_history.take()
    }

    /// Splice `selector` directly to the left of this one:
    /// `self --before--> selector --after--> old tag history`.
    pub fn insert_tag_history(
        &mut self,
        before: Relation,
        mut selector: Box<ParserSelector>,
        after: Relation,
    ) {
        if let Some(tail) = self.tag_history.take() {
            selector.tag_history = Some(tail);
        }
        self.selector.set_relation(before);
        selector.selector.set_relation(after);
        self.tag_history = Some(selector);
    }

    /// Attach `selector` at the far left end of the chain, linked by `relation`.
    pub fn append_tag_history(&mut self, relation: Relation, selector: Box<ParserSelector>) {
        self.update_last(move |end| {
            end.selector.set_relation(relation);
            end.tag_history = Some(selector);
        })
    }

    /// Run `f` on the leftmost selector of the chain.
    pub(crate) fn update_last<R>(&mut self, f: impl FnOnce(&mut ParserSelector) -> R) -> R {
        let mut node = self;
        loop {
            match node.tag_history {
                Some(ref mut next) => node = &mut **next,
                None => return f(node),
            }
        }
    }

    /// Run `f` on the selector `depth` steps to the left,
    /// or on the leftmost one if the chain is shorter.
    pub(crate) fn update_chain_node<R>(
        &mut self,
        depth: usize,
        f: impl FnOnce(&mut ParserSelector) -> R,
    ) -> R {
        let mut node = self;
        for _ in 0..depth {
            match node.tag_history {
                Some(ref mut next) => node = &mut **next,
                None => break,
            }
        }
        f(node)
    }

    /// Move the current head and chain one step to the left,
    /// and make the head a type selector in the same compound.
    pub fn prepend_tag_selector(&mut self, tag: QualifiedName, implicit: bool) {
        let second = ParserSelector {
            selector: mem::replace(&mut self.selector, Selector::with_tag(tag, implicit)),
            tag_history: self.tag_history.take(),
        };
        self.tag_history = Some(Box::new(second));
        self.selector.set_relation(Relation::SubSelector);
    }
}

// Chains grow one node per simple selector, so they are unlinked in a loop.
impl Drop for ParserSelector {
    fn drop(&mut self) {
        let mut next = self.tag_history.take();
        while let Some(mut selector) = next {
            next = selector.tag_history.take();
        }
    }
}
