/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Finalized selectors.
//!
//! A `ComplexSelector` is a flattened chain of simple selectors,
//! key (rightmost) selector first. Each `Selector` carries the relation
//! to the one that follows it in the chain.

use std::fmt;

use crate::parser_selector::ParserSelector;
use crate::serializer::{serialize_identifier, serialize_string, write_integer};
use crate::ToCss;

/// What a simple selector matches on.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Match {
    /// Not filled in yet.
    Unknown,
    /// Element name, `div` or `*`.
    Tag,
    /// `#id`
    Id,
    /// `.class`
    Class,
    /// `:name`
    PseudoClass,
    /// `::name`, and the legacy single-colon forms.
    PseudoElement,
    /// `:first`, `:left` and `:right` in `@page`.
    PagePseudoClass,
    /// `[a=b]`
    AttributeExact,
    /// `[a]`
    AttributeSet,
    /// `[a|=b]`
    AttributeHyphen,
    /// `[a~=b]`
    AttributeList,
    /// `[a*=b]`
    AttributeContain,
    /// `[a^=b]`
    AttributeBegin,
    /// `[a$=b]`
    AttributeEnd,
}

impl Match {
    /// Whether this is one of the attribute matches.
    pub fn is_attribute(self) -> bool {
        matches!(
            self,
            Match::AttributeExact
                | Match::AttributeSet
                | Match::AttributeHyphen
                | Match::AttributeList
                | Match::AttributeContain
                | Match::AttributeBegin
                | Match::AttributeEnd
        )
    }
}

/// How a simple selector relates to the next one in its chain.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relation {
    /// "Space" combinator
    Descendant,
    /// > combinator
    Child,
    /// + combinator
    DirectAdjacent,
    /// ~ combinator
    IndirectAdjacent,
    /// Same compound selector.
    SubSelector,
    /// Special type for shadow pseudo elements.
    ShadowPseudo,
    /// /deep/ combinator
    ShadowDeep,
    /// >>> combinator
    ShadowPiercingDescendant,
    /// Special type for `::slotted()`.
    ShadowSlot,
}

/// Case sensitivity of an attribute value match.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeMatchType {
    /// The default.
    CaseSensitive,
    /// `[a=b i]`
    CaseInsensitive,
}

macro_rules! pseudo_types {
    ( $( $variant: ident, )+ ) => {
        /// Every pseudo-class and pseudo-element name the parser knows.
        #[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[allow(missing_docs)]
        pub enum PseudoType {
            $( $variant, )+
        }
    }
}

pseudo_types! {
    Unknown,
    Empty,
    FirstChild,
    FirstOfType,
    LastChild,
    LastOfType,
    OnlyChild,
    OnlyOfType,
    FirstLine,
    FirstLetter,
    NthChild,
    NthOfType,
    NthLastChild,
    NthLastOfType,
    Link,
    Visited,
    Any,
    AnyLink,
    Autofill,
    Hover,
    Drag,
    Focus,
    Active,
    Checked,
    Enabled,
    FullPageMedia,
    Default,
    Defined,
    Disabled,
    Optional,
    Placeholder,
    PlaceholderShown,
    Required,
    ReadOnly,
    ReadWrite,
    Valid,
    Invalid,
    Indeterminate,
    Target,
    Before,
    After,
    Backdrop,
    Lang,
    Not,
    Resizer,
    Root,
    Scope,
    Scrollbar,
    ScrollbarButton,
    ScrollbarCorner,
    ScrollbarThumb,
    ScrollbarTrack,
    ScrollbarTrackPiece,
    WindowInactive,
    CornerPresent,
    Decrement,
    Increment,
    Horizontal,
    Vertical,
    Start,
    End,
    DoubleButton,
    SingleButton,
    NoButton,
    Selection,
    LeftPage,
    RightPage,
    FirstPage,
    FullScreen,
    FullScreenAncestor,
    InRange,
    OutOfRange,
    WebKitCustomElement,
    BlinkInternalElement,
    Cue,
    FutureCue,
    PastCue,
    Unresolved,
    Content,
    Host,
    HostContext,
    Shadow,
    SpatialNavigationFocus,
    ListBox,
    HostHasAppearance,
    Slotted,
}

impl PseudoType {
    /// Look up a pseudo name, without its colons.
    ///
    /// Unknown names starting with `-webkit-` are custom pseudo-elements,
    /// and those starting with `-internal-` are internal ones.
    pub fn parse(name: &str, has_arguments: bool) -> PseudoType {
        let known = if has_arguments {
            pseudo_with_arguments(name)
        } else {
            pseudo_without_arguments(name)
        };
        if let Some(pseudo_type) = known {
            return pseudo_type;
        }
        if name.starts_with("-webkit-") {
            return PseudoType::WebKitCustomElement;
        }
        if name.starts_with("-internal-") {
            return PseudoType::BlinkInternalElement;
        }
        PseudoType::Unknown
    }

    /// Whether this is one of the four `:nth-*()` pseudo-classes.
    pub fn is_nth(self) -> bool {
        matches!(
            self,
            PseudoType::NthChild
                | PseudoType::NthLastChild
                | PseudoType::NthOfType
                | PseudoType::NthLastOfType
        )
    }
}

fn pseudo_without_arguments(name: &str) -> Option<PseudoType> {
    ascii_case_insensitive_phf_map! {
        without_arguments -> PseudoType = {
            "-internal-list-box" => PseudoType::ListBox,
            "-internal-media-controls-cast-button" => PseudoType::WebKitCustomElement,
            "-internal-media-controls-overlay-cast-button" => PseudoType::WebKitCustomElement,
            "-internal-media-controls-text-track-list" => PseudoType::WebKitCustomElement,
            "-internal-media-controls-text-track-list-item" => PseudoType::WebKitCustomElement,
            "-internal-media-controls-text-track-list-item-input" => PseudoType::WebKitCustomElement,
            "-internal-media-controls-text-track-list-kind-captions" => PseudoType::WebKitCustomElement,
            "-internal-media-controls-text-track-list-kind-subtitles" => PseudoType::WebKitCustomElement,
            "-internal-shadow-host-has-appearance" => PseudoType::HostHasAppearance,
            "-internal-spatial-navigation-focus" => PseudoType::SpatialNavigationFocus,
            "-webkit-any-link" => PseudoType::AnyLink,
            "-webkit-autofill" => PseudoType::Autofill,
            "-webkit-drag" => PseudoType::Drag,
            "-webkit-full-page-media" => PseudoType::FullPageMedia,
            "-webkit-full-screen" => PseudoType::FullScreen,
            "-webkit-full-screen-ancestor" => PseudoType::FullScreenAncestor,
            "-webkit-resizer" => PseudoType::Resizer,
            "-webkit-scrollbar" => PseudoType::Scrollbar,
            "-webkit-scrollbar-button" => PseudoType::ScrollbarButton,
            "-webkit-scrollbar-corner" => PseudoType::ScrollbarCorner,
            "-webkit-scrollbar-thumb" => PseudoType::ScrollbarThumb,
            "-webkit-scrollbar-track" => PseudoType::ScrollbarTrack,
            "-webkit-scrollbar-track-piece" => PseudoType::ScrollbarTrackPiece,
            "active" => PseudoType::Active,
            "after" => PseudoType::After,
            "backdrop" => PseudoType::Backdrop,
            "before" => PseudoType::Before,
            "checked" => PseudoType::Checked,
            "content" => PseudoType::Content,
            "corner-present" => PseudoType::CornerPresent,
            "cue" => PseudoType::WebKitCustomElement,
            "decrement" => PseudoType::Decrement,
            "default" => PseudoType::Default,
            "defined" => PseudoType::Defined,
            "disabled" => PseudoType::Disabled,
            "double-button" => PseudoType::DoubleButton,
            "empty" => PseudoType::Empty,
            "enabled" => PseudoType::Enabled,
            "end" => PseudoType::End,
            "first" => PseudoType::FirstPage,
            "first-child" => PseudoType::FirstChild,
            "first-letter" => PseudoType::FirstLetter,
            "first-line" => PseudoType::FirstLine,
            "first-of-type" => PseudoType::FirstOfType,
            "focus" => PseudoType::Focus,
            "future" => PseudoType::FutureCue,
            "horizontal" => PseudoType::Horizontal,
            "host" => PseudoType::Host,
            "hover" => PseudoType::Hover,
            "in-range" => PseudoType::InRange,
            "increment" => PseudoType::Increment,
            "indeterminate" => PseudoType::Indeterminate,
            "invalid" => PseudoType::Invalid,
            "last-child" => PseudoType::LastChild,
            "last-of-type" => PseudoType::LastOfType,
            "left" => PseudoType::LeftPage,
            "link" => PseudoType::Link,
            "no-button" => PseudoType::NoButton,
            "only-child" => PseudoType::OnlyChild,
            "only-of-type" => PseudoType::OnlyOfType,
            "optional" => PseudoType::Optional,
            "out-of-range" => PseudoType::OutOfRange,
            "past" => PseudoType::PastCue,
            "placeholder" => PseudoType::Placeholder,
            "placeholder-shown" => PseudoType::PlaceholderShown,
            "read-only" => PseudoType::ReadOnly,
            "read-write" => PseudoType::ReadWrite,
            "required" => PseudoType::Required,
            "right" => PseudoType::RightPage,
            "root" => PseudoType::Root,
            "scope" => PseudoType::Scope,
            "selection" => PseudoType::Selection,
            "shadow" => PseudoType::Shadow,
            "single-button" => PseudoType::SingleButton,
            "start" => PseudoType::Start,
            "target" => PseudoType::Target,
            "unresolved" => PseudoType::Unresolved,
            "valid" => PseudoType::Valid,
            "vertical" => PseudoType::Vertical,
            "visited" => PseudoType::Visited,
            "window-inactive" => PseudoType::WindowInactive,
        }
    }
    without_arguments::get(name).copied()
}

fn pseudo_with_arguments(name: &str) -> Option<PseudoType> {
    ascii_case_insensitive_phf_map! {
        with_arguments -> PseudoType = {
            "-webkit-any" => PseudoType::Any,
            "cue" => PseudoType::Cue,
            "host" => PseudoType::Host,
            "host-context" => PseudoType::HostContext,
            "lang" => PseudoType::Lang,
            "not" => PseudoType::Not,
            "nth-child" => PseudoType::NthChild,
            "nth-last-child" => PseudoType::NthLastChild,
            "nth-last-of-type" => PseudoType::NthLastOfType,
            "nth-of-type" => PseudoType::NthOfType,
            "slotted" => PseudoType::Slotted,
        }
    }
    with_arguments::get(name).copied()
}

/// An element or attribute name with its namespace.
#[derive(PartialEq, Eq, Debug, Clone, Hash)]
pub struct QualifiedName {
    /// The prefix as written: `None` without a `|`, `Some("")` for `|name`,
    /// `Some("*")` for `*|name`.
    pub prefix: Option<String>,
    /// The local name, `*` for any.
    pub local_name: String,
    /// The namespace URI: `None` for any namespace, `Some("")` for none.
    pub namespace: Option<String>,
}

impl QualifiedName {
    /// `*` in any namespace.
    pub fn any() -> QualifiedName {
        QualifiedName::new(None, "*", None)
    }

    /// A name from its parts.
    pub fn new(prefix: Option<&str>, local_name: &str, namespace: Option<&str>) -> QualifiedName {
        QualifiedName {
            prefix: prefix.map(str::to_owned),
            local_name: local_name.to_owned(),
            namespace: namespace.map(str::to_owned),
        }
    }

    /// Whether the local name is `*`.
    #[inline]
    pub fn is_universal(&self) -> bool {
        self.local_name == "*"
    }
}

fn serialize_identifier_or_any<W: fmt::Write>(identifier: &str, dest: &mut W) -> fmt::Result {
    if identifier == "*" {
        dest.write_str("*")
    } else {
        serialize_identifier(identifier, dest)
    }
}

fn serialize_namespace_prefix_if_needed<W: fmt::Write>(
    prefix: &Option<String>,
    dest: &mut W,
) -> fmt::Result {
    if let Some(ref prefix) = *prefix {
        serialize_identifier_or_any(prefix, dest)?;
        dest.write_str("|")?;
    }
    Ok(())
}

/// One simple selector in a chain.
#[derive(PartialEq, Debug, Clone)]
pub struct Selector {
    match_type: Match,
    relation: Relation,
    pseudo_type: PseudoType,
    tag: Option<QualifiedName>,
    tag_is_implicit: bool,
    value: Option<String>,
    attribute: Option<QualifiedName>,
    attribute_match: AttributeMatchType,
    argument: Option<String>,
    nth: (i32, i32),
    selector_list: Option<Box<SelectorList>>,
    is_for_page: bool,
    relation_is_affected_by_pseudo_content: bool,
}

impl Default for Selector {
    fn default() -> Selector {
        Selector {
            match_type: Match::Unknown,
            relation: Relation::SubSelector,
            pseudo_type: PseudoType::Unknown,
            tag: None,
            tag_is_implicit: false,
            value: None,
            attribute: None,
            attribute_match: AttributeMatchType::CaseSensitive,
            argument: None,
            nth: (0, 0),
            selector_list: None,
            is_for_page: false,
            relation_is_affected_by_pseudo_content: false,
        }
    }
}

impl Selector {
    /// A selector to be filled in.
    pub fn new() -> Selector {
        Selector::default()
    }

    /// A type selector. `implicit` tags are not serialized.
    pub fn with_tag(tag: QualifiedName, implicit: bool) -> Selector {
        Selector {
            match_type: Match::Tag,
            tag: Some(tag),
            tag_is_implicit: implicit,
            ..Selector::default()
        }
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn match_type(&self) -> Match {
        self.match_type
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn set_match(&mut self, match_type: Match) {
        self.match_type = match_type
    }

    /// The relation to the next selector in the chain.
    #[inline]
    pub fn relation(&self) -> Relation {
        self.relation
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn set_relation(&mut self, relation: Relation) {
        self.relation = relation
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn pseudo_type(&self) -> PseudoType {
        self.pseudo_type
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn set_pseudo_type(&mut self, pseudo_type: PseudoType) {
        self.pseudo_type = pseudo_type
    }

    /// The element name of a `Tag` selector.
    #[inline]
    pub fn tag(&self) -> Option<&QualifiedName> {
        self.tag.as_ref()
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn tag_is_implicit(&self) -> bool {
        self.tag_is_implicit
    }

    /// The id, class or pseudo name.
    #[inline]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn set_value(&mut self, value: &str) {
        self.value = Some(value.to_owned())
    }

    /// The attribute name of an attribute selector.
    #[inline]
    pub fn attribute(&self) -> Option<&QualifiedName> {
        self.attribute.as_ref()
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn attribute_match(&self) -> AttributeMatchType {
        self.attribute_match
    }

    #[allow(missing_docs)]
    pub fn set_attribute(&mut self, attribute: QualifiedName, match_type: AttributeMatchType) {
        self.attribute = Some(attribute);
        self.attribute_match = match_type;
    }

    /// The argument of `:lang()`.
    #[inline]
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn set_argument(&mut self, argument: &str) {
        self.argument = Some(argument.to_owned())
    }

    /// `(a, b)` of an `:nth-*()` pseudo-class.
    #[inline]
    pub fn nth(&self) -> (i32, i32) {
        self.nth
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn set_nth(&mut self, a: i32, b: i32) {
        self.nth = (a, b)
    }

    /// The argument of `:not()`, `:-webkit-any()`, `:host()` and friends.
    #[inline]
    pub fn selector_list(&self) -> Option<&SelectorList> {
        self.selector_list.as_deref()
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn set_selector_list(&mut self, list: SelectorList) {
        self.selector_list = Some(Box::new(list))
    }

    /// Whether this chain is an `@page` selector.
    #[inline]
    pub fn is_for_page(&self) -> bool {
        self.is_for_page
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn set_for_page(&mut self) {
        self.is_for_page = true
    }

    /// Whether the relation crosses a `::content` pseudo-element.
    #[inline]
    pub fn relation_is_affected_by_pseudo_content(&self) -> bool {
        self.relation_is_affected_by_pseudo_content
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn set_relation_is_affected_by_pseudo_content(&mut self) {
        self.relation_is_affected_by_pseudo_content = true
    }

    /// Set the name of a pseudo selector and derive its type.
    ///
    /// `:before`, `:after`, `:first-line` and `:first-letter` become
    /// pseudo-elements. A name used with the wrong kind of match
    /// gets the `Unknown` type.
    pub fn update_pseudo_type(&mut self, value: &str, has_arguments: bool) {
        debug_assert!(matches!(
            self.match_type,
            Match::PseudoClass | Match::PseudoElement | Match::PagePseudoClass
        ));
        self.set_value(value);
        self.pseudo_type = PseudoType::parse(value, has_arguments);

        use self::PseudoType::*;
        match self.pseudo_type {
            After | Before | FirstLetter | FirstLine | Backdrop | Cue | Placeholder | Resizer
            | Scrollbar | ScrollbarCorner | ScrollbarButton | ScrollbarThumb | ScrollbarTrack
            | ScrollbarTrackPiece | Selection | WebKitCustomElement | BlinkInternalElement
            | Content | Shadow | Slotted => {
                if matches!(self.pseudo_type, After | Before | FirstLetter | FirstLine)
                    && self.match_type == Match::PseudoClass
                {
                    self.match_type = Match::PseudoElement;
                }
                if self.match_type != Match::PseudoElement {
                    self.pseudo_type = Unknown;
                }
            }
            FirstPage | LeftPage | RightPage => {
                if self.match_type != Match::PagePseudoClass {
                    self.pseudo_type = Unknown;
                }
            }
            _ => {
                if self.match_type != Match::PseudoClass {
                    self.pseudo_type = Unknown;
                }
            }
        }
    }

    /// Whether the 1-based `count` is matched by this selector's *An+B*.
    pub fn match_nth(&self, count: i32) -> bool {
        // `count - b` and `-a` overflow i32 at the extremes of the saturated range.
        let (a, b) = (i64::from(self.nth.0), i64::from(self.nth.1));
        let count = i64::from(count);
        if a == 0 {
            return count == b;
        }
        if a > 0 {
            if count < b {
                return false;
            }
            return (count - b) % a == 0;
        }
        if count > b {
            return false;
        }
        (b - count) % (-a) == 0
    }

    fn is_valid_sub_selector(&self) -> bool {
        match self.match_type {
            Match::Tag
            | Match::Id
            | Match::Class
            | Match::AttributeExact
            | Match::AttributeSet
            | Match::AttributeList
            | Match::AttributeHyphen
            | Match::AttributeContain
            | Match::AttributeBegin
            | Match::AttributeEnd => return true,
            Match::PseudoElement | Match::Unknown => return false,
            Match::PagePseudoClass | Match::PseudoClass => {}
        }
        use self::PseudoType::*;
        matches!(
            self.pseudo_type,
            Empty
                | Link
                | Visited
                | Target
                | Enabled
                | Disabled
                | Checked
                | Indeterminate
                | NthChild
                | NthLastChild
                | NthOfType
                | NthLastOfType
                | FirstChild
                | LastChild
                | FirstOfType
                | LastOfType
                | OnlyOfType
                | Host
                | HostContext
                | Not
                | SpatialNavigationFocus
                | ListBox
                | HostHasAppearance
        )
    }

    fn specificity_for_one_selector(&self) -> u32 {
        match self.match_type {
            Match::Id => 0x010000,
            Match::PseudoClass => match self.pseudo_type {
                PseudoType::Host | PseudoType::HostContext => 0,
                PseudoType::Not => self
                    .selector_list()
                    .and_then(|list| list.first())
                    .and_then(|complex| complex.components().first())
                    .map_or(0, Selector::specificity_for_one_selector),
                _ => 0x000100,
            },
            Match::Class
            | Match::PseudoElement
            | Match::AttributeExact
            | Match::AttributeSet
            | Match::AttributeList
            | Match::AttributeHyphen
            | Match::AttributeContain
            | Match::AttributeBegin
            | Match::AttributeEnd => 0x000100,
            Match::Tag => {
                if self.tag.as_ref().map_or(true, QualifiedName::is_universal) {
                    0
                } else {
                    0x000001
                }
            }
            Match::PagePseudoClass | Match::Unknown => 0,
        }
    }

    // Everything this node contributes to its compound, tag excluded.
    fn write_specifier<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        let value = self.value.as_deref().unwrap_or("");
        match self.match_type {
            Match::Id => {
                dest.write_str("#")?;
                serialize_identifier(value, dest)?;
            }
            Match::Class => {
                dest.write_str(".")?;
                serialize_identifier(value, dest)?;
            }
            Match::PseudoClass | Match::PagePseudoClass => {
                dest.write_str(":")?;
                dest.write_str(value)?;
                if self.pseudo_type.is_nth() {
                    // https://drafts.csswg.org/css-syntax/#serializing-anb
                    dest.write_str("(")?;
                    let (a, b) = self.nth;
                    if a == 0 && b == 0 {
                        dest.write_str("0")?;
                    } else if a == 0 {
                        write_integer(b, dest)?;
                    } else {
                        write_integer(a, dest)?;
                        dest.write_str("n")?;
                        if b > 0 {
                            dest.write_str("+")?;
                        }
                        if b != 0 {
                            write_integer(b, dest)?;
                        }
                    }
                    dest.write_str(")")?;
                } else if self.pseudo_type == PseudoType::Lang {
                    dest.write_str("(")?;
                    dest.write_str(self.argument.as_deref().unwrap_or(""))?;
                    dest.write_str(")")?;
                }
            }
            Match::PseudoElement => {
                dest.write_str("::")?;
                dest.write_str(value)?;
            }
            match_type if match_type.is_attribute() => {
                dest.write_str("[")?;
                if let Some(ref attribute) = self.attribute {
                    serialize_namespace_prefix_if_needed(&attribute.prefix, dest)?;
                    serialize_identifier(&attribute.local_name, dest)?;
                }
                let operator = match match_type {
                    Match::AttributeExact => "=",
                    Match::AttributeList => "~=",
                    Match::AttributeHyphen => "|=",
                    Match::AttributeBegin => "^=",
                    Match::AttributeEnd => "$=",
                    Match::AttributeContain => "*=",
                    _ => "",
                };
                if match_type != Match::AttributeSet {
                    dest.write_str(operator)?;
                    serialize_string(value, dest)?;
                    if self.attribute_match == AttributeMatchType::CaseInsensitive {
                        dest.write_str(" i")?;
                    }
                }
                dest.write_str("]")?;
            }
            _ => {}
        }

        if let Some(ref list) = self.selector_list {
            dest.write_str("(")?;
            for (i, complex) in list.iter().enumerate() {
                if i > 0 {
                    dest.write_str(",")?;
                }
                complex.to_css(dest)?;
            }
            dest.write_str(")")?;
        }
        Ok(())
    }
}

/// A chain of simple selectors, key selector first.
#[derive(PartialEq, Debug, Clone)]
pub struct ComplexSelector {
    components: Vec<Selector>,
}

impl ComplexSelector {
    /// Wrap a chain, key selector first. The last relation is ignored.
    pub fn from_components(components: Vec<Selector>) -> ComplexSelector {
        ComplexSelector { components }
    }

    /// The chain, key selector first.
    #[inline]
    pub fn components(&self) -> &[Selector] {
        &self.components
    }

    /// Number of simple selectors in the chain.
    #[inline]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the chain is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterate over the chain, key selector first.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Selector> {
        self.components.iter()
    }

    /// Whether the chain is a single compound selector
    /// made only of specifiers allowed in `:not()` and `:host()`.
    pub fn is_compound(&self) -> bool {
        let mut previous: Option<&Selector> = None;
        for selector in &self.components {
            if let Some(previous) = previous {
                if previous.relation != Relation::SubSelector {
                    return false;
                }
            }
            if !selector.is_valid_sub_selector() {
                return false;
            }
            previous = Some(selector);
        }
        !self.components.is_empty()
    }

    /// Whether the key compound has a pseudo-element.
    pub fn matches_pseudo_element(&self) -> bool {
        for selector in &self.components {
            if selector.match_type == Match::PseudoElement {
                return true;
            }
            if selector.relation != Relation::SubSelector {
                return false;
            }
        }
        false
    }

    fn any_in_tree(&self, predicate: &dyn Fn(&Selector) -> bool) -> bool {
        self.components.iter().any(|selector| {
            predicate(selector)
                || selector
                    .selector_list()
                    .map_or(false, |list| list.iter().any(|c| c.any_in_tree(predicate)))
        })
    }

    /// Whether some relation, nested lists included, crosses `::content`.
    pub fn has_content_pseudo(&self) -> bool {
        self.any_in_tree(&|selector| selector.relation_is_affected_by_pseudo_content)
    }

    /// Whether `::slotted()` appears, nested lists included.
    pub fn has_slotted_pseudo(&self) -> bool {
        self.any_in_tree(&|selector| selector.pseudo_type == PseudoType::Slotted)
    }

    /// Whether `/deep/`, `>>>` or `::shadow` appears, nested lists included.
    pub fn has_deep_combinator_or_shadow_pseudo(&self) -> bool {
        self.any_in_tree(&|selector| {
            matches!(
                selector.relation,
                Relation::ShadowDeep | Relation::ShadowPiercingDescendant
            ) || selector.pseudo_type == PseudoType::Shadow
        })
    }

    /// Specificity packed as `0xIICCEE` (ids, classes, elements),
    /// each component saturating at 255.
    pub fn specificity(&self) -> u32 {
        const ID_MASK: u32 = 0xff0000;
        const CLASS_MASK: u32 = 0x00ff00;
        const ELEMENT_MASK: u32 = 0x0000ff;

        if self.components.first().map_or(false, Selector::is_for_page) {
            return self.specificity_for_page();
        }

        let mut total: u32 = 0;
        for selector in &self.components {
            let temp = total + selector.specificity_for_one_selector();
            // Clamp each component to its max in the case of overflow.
            if (temp & ID_MASK) < (total & ID_MASK) {
                total |= ID_MASK;
            } else if (temp & CLASS_MASK) < (total & CLASS_MASK) {
                total |= CLASS_MASK;
            } else if (temp & ELEMENT_MASK) < (total & ELEMENT_MASK) {
                total |= ELEMENT_MASK;
            } else {
                total = temp;
            }
        }
        total
    }

    // https://drafts.csswg.org/css-page-3/#cascading-and-page-context
    fn specificity_for_page(&self) -> u32 {
        self.components
            .iter()
            .map(|selector| match selector.match_type {
                Match::Tag => {
                    if selector.tag.as_ref().map_or(true, QualifiedName::is_universal) {
                        0
                    } else {
                        4
                    }
                }
                Match::PagePseudoClass => match selector.pseudo_type {
                    PseudoType::FirstPage => 2,
                    PseudoType::LeftPage | PseudoType::RightPage => 1,
                    _ => 0,
                },
                _ => 0,
            })
            .sum()
    }

    /// The selector serialized as CSS.
    pub fn selector_text(&self) -> String {
        self.to_css_string()
    }
}

impl ToCss for ComplexSelector {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        // Compounds are found key first but written leftmost first.
        let mut compounds: Vec<(String, Option<&'static str>)> = Vec::new();
        let mut index = 0;
        while index < self.components.len() {
            let mut text = String::new();
            let head = &self.components[index];
            if head.match_type == Match::Tag && !head.tag_is_implicit {
                if let Some(ref tag) = head.tag {
                    serialize_namespace_prefix_if_needed(&tag.prefix, &mut text)?;
                    serialize_identifier_or_any(&tag.local_name, &mut text)?;
                }
            }
            loop {
                let selector = &self.components[index];
                selector.write_specifier(&mut text)?;
                if selector.relation != Relation::SubSelector
                    || index + 1 == self.components.len()
                {
                    break;
                }
                index += 1;
            }
            let last = &self.components[index];
            index += 1;
            let separator = if index < self.components.len() {
                Some(match last.relation {
                    Relation::Descendant => " ",
                    Relation::Child => " > ",
                    Relation::ShadowDeep => " /deep/ ",
                    Relation::ShadowPiercingDescendant => " >>> ",
                    Relation::DirectAdjacent => " + ",
                    Relation::IndirectAdjacent => " ~ ",
                    Relation::SubSelector | Relation::ShadowPseudo | Relation::ShadowSlot => "",
                })
            } else {
                None
            };
            compounds.push((text, separator));
        }

        // A separator links its compound to the one on its left.
        for (text, separator) in compounds.iter().rev() {
            if let Some(separator) = *separator {
                dest.write_str(separator)?;
            }
            dest.write_str(text)?;
        }
        Ok(())
    }
}

/// A comma-separated list of complex selectors.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// An empty list.
    pub fn new() -> SelectorList {
        SelectorList::default()
    }

    /// Freeze every builder of `selector_vector`, in order, into a list.
    /// The vector is left empty.
    pub fn adopt_selector_vector(selector_vector: &mut Vec<ParserSelector>) -> SelectorList {
        SelectorList {
            selectors: selector_vector
                .drain(..)
                .map(ParserSelector::into_complex_selector)
                .collect(),
        }
    }

    /// A list of already frozen selectors.
    pub fn from_selectors(selectors: Vec<ComplexSelector>) -> SelectorList {
        SelectorList { selectors }
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn first(&self) -> Option<&ComplexSelector> {
        self.selectors.first()
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, ComplexSelector> {
        self.selectors.iter()
    }

    /// The selectors serialized as CSS, separated by `, `.
    pub fn selectors_text(&self) -> String {
        self.to_css_string()
    }
}

impl ToCss for SelectorList {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        for (i, complex) in self.selectors.iter().enumerate() {
            if i > 0 {
                dest.write_str(", ")?;
            }
            complex.to_css(dest)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a SelectorList {
    type Item = &'a ComplexSelector;
    type IntoIter = std::slice::Iter<'a, ComplexSelector>;

    fn into_iter(self) -> Self::IntoIter {
        self.selectors.iter()
    }
}
