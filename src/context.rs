/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::collections::HashMap;

use crate::selector::QualifiedName;

/// The kind of style sheet being parsed.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ParserMode {
    /// An author style sheet in a standards mode document.
    HtmlStandard,
    /// An author style sheet in a quirks mode document.
    HtmlQuirks,
    /// The user agent style sheet.
    UserAgentSheet,
}

/// Settings that gate what the grammar driver accepts.
///
/// They never change how text is tokenized.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct ParserContext {
    /// The kind of style sheet.
    pub mode: ParserMode,
    /// Element names are ASCII-lowercased in HTML documents.
    pub is_html_document: bool,
    /// Whether `@viewport` is accepted outside of the user agent sheet.
    pub viewport_rules_enabled: bool,
}

impl Default for ParserContext {
    fn default() -> ParserContext {
        ParserContext::new(ParserMode::HtmlStandard)
    }
}

impl ParserContext {
    /// A context for an HTML document in `mode`.
    pub fn new(mode: ParserMode) -> ParserContext {
        ParserContext {
            mode,
            is_html_document: true,
            viewport_rules_enabled: false,
        }
    }

    /// Quirks mode lowercases id and class selectors.
    #[inline]
    pub fn in_quirks_mode(&self) -> bool {
        self.mode == ParserMode::HtmlQuirks
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn is_ua_sheet(&self) -> bool {
        self.mode == ParserMode::UserAgentSheet
    }

    /// Whether `-internal-` pseudo names may be used.
    #[inline]
    pub fn internal_allowed(&self) -> bool {
        self.is_ua_sheet()
    }

    /// Whether `@viewport` rules are parsed.
    #[inline]
    pub fn viewport_allowed(&self) -> bool {
        self.viewport_rules_enabled || self.is_ua_sheet()
    }
}

/// Namespace declarations in effect, extended by `@namespace` rules.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct Namespaces {
    default_namespace: Option<String>,
    prefixes: HashMap<String, String>,
}

impl Namespaces {
    /// No declarations: unprefixed names match in any namespace.
    pub fn new() -> Namespaces {
        Namespaces::default()
    }

    /// Declare `prefix` for `uri`, or the default namespace when `prefix` is `None`.
    pub fn add(&mut self, prefix: Option<&str>, uri: &str) {
        match prefix {
            Some(prefix) => {
                self.prefixes.insert(prefix.to_owned(), uri.to_owned());
            }
            None => self.default_namespace = Some(uri.to_owned()),
        }
    }

    /// The default namespace, `None` when any namespace matches.
    #[inline]
    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// The URI declared for `prefix`.
    #[inline]
    pub fn namespace_for_prefix(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// Resolve a possibly prefixed element name.
    ///
    /// No prefix means the default namespace, `*` any namespace and an empty
    /// prefix no namespace. Returns `None` for an undeclared prefix.
    pub fn determine_name_in_namespace(
        &self,
        prefix: Option<&str>,
        local_name: &str,
    ) -> Option<QualifiedName> {
        let namespace = match prefix {
            None => self.default_namespace(),
            Some("*") => None,
            Some("") => Some(""),
            Some(prefix) => Some(self.namespace_for_prefix(prefix)?),
        };
        Some(QualifiedName::new(prefix, local_name, namespace))
    }
}
