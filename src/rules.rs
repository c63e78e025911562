/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::fmt;

use crate::media::{MediaQuerySet, SupportsCondition};
use crate::selector::SelectorList;
use crate::serializer::{serialize_identifier, serialize_string};
use crate::values::ParserValueList;
use crate::ToCss;

/// `name: value [!important]`
#[derive(PartialEq, Debug, Clone)]
pub struct Declaration {
    /// ASCII-lowercased, except for custom properties (`--*`).
    pub name: String,
    #[allow(missing_docs)]
    pub value: ParserValueList<'static>,
    #[allow(missing_docs)]
    pub important: bool,
}

impl ToCss for Declaration {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        serialize_identifier(&self.name, dest)?;
        dest.write_str(": ")?;
        self.value.to_css(dest)?;
        if self.important {
            dest.write_str(" !important")?;
        }
        Ok(())
    }
}

fn write_declaration_block<W: fmt::Write>(declarations: &[Declaration], dest: &mut W) -> fmt::Result {
    dest.write_str("{")?;
    for declaration in declarations {
        dest.write_str(" ")?;
        declaration.to_css(dest)?;
        dest.write_str(";")?;
    }
    dest.write_str(" }")
}

fn write_rule_block<W: fmt::Write>(rules: &[CssRule], dest: &mut W) -> fmt::Result {
    dest.write_str("{")?;
    for rule in rules {
        dest.write_str(" ")?;
        rule.to_css(dest)?;
    }
    dest.write_str(" }")
}

/// `selectors { declarations }`
#[derive(PartialEq, Debug, Clone)]
#[allow(missing_docs)]
pub struct StyleRule {
    pub selectors: SelectorList,
    pub declarations: Vec<Declaration>,
}

/// `@import url [media];`
#[derive(PartialEq, Debug, Clone)]
#[allow(missing_docs)]
pub struct ImportRule {
    pub href: String,
    pub media: MediaQuerySet,
}

/// `@namespace [prefix] url;`
#[derive(PartialEq, Debug, Clone)]
#[allow(missing_docs)]
pub struct NamespaceRule {
    pub prefix: Option<String>,
    pub uri: String,
}

/// `@media queries { rules }`
#[derive(PartialEq, Debug, Clone)]
#[allow(missing_docs)]
pub struct MediaRule {
    pub media: MediaQuerySet,
    pub rules: Vec<CssRule>,
}

/// `@supports condition { rules }`
#[derive(PartialEq, Debug, Clone)]
#[allow(missing_docs)]
pub struct SupportsRule {
    pub condition: SupportsCondition,
    pub rules: Vec<CssRule>,
}

/// One block of a `@keyframes` rule.
#[derive(PartialEq, Debug, Clone)]
pub struct Keyframe {
    /// Offsets between 0 and 1: `from` is 0, `to` is 1, `50%` is 0.5.
    pub keys: Vec<f32>,
    #[allow(missing_docs)]
    pub declarations: Vec<Declaration>,
}

impl ToCss for Keyframe {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                dest.write_str(", ")?;
            }
            dtoa_short::write(dest, key * 100.)?;
            dest.write_str("%")?;
        }
        dest.write_str(" ")?;
        write_declaration_block(&self.declarations, dest)
    }
}

/// `@keyframes name { keyframes }`
#[derive(PartialEq, Debug, Clone)]
pub struct KeyframesRule {
    #[allow(missing_docs)]
    pub name: String,
    /// Written as `@-webkit-keyframes`.
    pub vendor_prefixed: bool,
    #[allow(missing_docs)]
    pub keyframes: Vec<Keyframe>,
}

/// `@page [name][:pseudo] { declarations }`
#[derive(PartialEq, Debug, Clone)]
pub struct PageRule {
    /// A single page selector, flagged with `Selector::is_for_page`.
    pub selectors: SelectorList,
    #[allow(missing_docs)]
    pub declarations: Vec<Declaration>,
}

/// `@font-face { declarations }`
#[derive(PartialEq, Debug, Clone)]
#[allow(missing_docs)]
pub struct FontFaceRule {
    pub declarations: Vec<Declaration>,
}

/// `@viewport { declarations }`
#[derive(PartialEq, Debug, Clone)]
#[allow(missing_docs)]
pub struct ViewportRule {
    pub declarations: Vec<Declaration>,
}

/// A top-level or nested rule.
#[derive(PartialEq, Debug, Clone)]
#[allow(missing_docs)]
pub enum CssRule {
    Style(StyleRule),
    /// The encoding name.
    Charset(String),
    Import(ImportRule),
    Namespace(NamespaceRule),
    Media(MediaRule),
    Supports(SupportsRule),
    Keyframes(KeyframesRule),
    Page(PageRule),
    FontFace(FontFaceRule),
    Viewport(ViewportRule),
}

impl ToCss for CssRule {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {
            CssRule::Style(ref rule) => {
                rule.selectors.to_css(dest)?;
                dest.write_str(" ")?;
                write_declaration_block(&rule.declarations, dest)
            }
            CssRule::Charset(ref encoding) => {
                dest.write_str("@charset ")?;
                serialize_string(encoding, dest)?;
                dest.write_str(";")
            }
            CssRule::Import(ref rule) => {
                dest.write_str("@import url(")?;
                serialize_string(&rule.href, dest)?;
                dest.write_str(")")?;
                if !rule.media.queries.is_empty() {
                    dest.write_str(" ")?;
                    rule.media.to_css(dest)?;
                }
                dest.write_str(";")
            }
            CssRule::Namespace(ref rule) => {
                dest.write_str("@namespace ")?;
                if let Some(ref prefix) = rule.prefix {
                    serialize_identifier(prefix, dest)?;
                    dest.write_str(" ")?;
                }
                dest.write_str("url(")?;
                serialize_string(&rule.uri, dest)?;
                dest.write_str(");")
            }
            CssRule::Media(ref rule) => {
                dest.write_str("@media ")?;
                rule.media.to_css(dest)?;
                dest.write_str(" ")?;
                write_rule_block(&rule.rules, dest)
            }
            CssRule::Supports(ref rule) => {
                dest.write_str("@supports ")?;
                rule.condition.to_css(dest)?;
                dest.write_str(" ")?;
                write_rule_block(&rule.rules, dest)
            }
            CssRule::Keyframes(ref rule) => {
                if rule.vendor_prefixed {
                    dest.write_str("@-webkit-keyframes ")?;
                } else {
                    dest.write_str("@keyframes ")?;
                }
                serialize_identifier(&rule.name, dest)?;
                dest.write_str(" {")?;
                for keyframe in &rule.keyframes {
                    dest.write_str(" ")?;
                    keyframe.to_css(dest)?;
                }
                dest.write_str(" }")
            }
            CssRule::Page(ref rule) => {
                dest.write_str("@page ")?;
                let selectors = rule.selectors.to_css_string();
                if !selectors.is_empty() {
                    dest.write_str(&selectors)?;
                    dest.write_str(" ")?;
                }
                write_declaration_block(&rule.declarations, dest)
            }
            CssRule::FontFace(ref rule) => {
                dest.write_str("@font-face ")?;
                write_declaration_block(&rule.declarations, dest)
            }
            CssRule::Viewport(ref rule) => {
                dest.write_str("@viewport ")?;
                write_declaration_block(&rule.declarations, dest)
            }
        }
    }
}

/// The rules of a parsed style sheet, in source order.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct StyleSheet {
    #[allow(missing_docs)]
    pub rules: Vec<CssRule>,
}

impl ToCss for StyleSheet {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                dest.write_str("\n")?;
            }
            rule.to_css(dest)?;
        }
        Ok(())
    }
}
