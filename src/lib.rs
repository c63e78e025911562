/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

#![crate_name = "cssgrammar"]
#![crate_type = "rlib"]
#![warn(missing_docs)]

/*!

Tokenizer, value lists and selector builders for a grammar-driven CSS parser.

# Input

Everything starts from a `SourceBuffer`, which holds the text either as
Latin-1 bytes or as UTF-16 code units (never both).
A `Tokenizer` borrows the buffer and hands out one `Token` at a time
in the `LexMode` the caller asks for.
Identifiers and strings borrow from the buffer when they contain no escapes,
and own an escape-decoded copy otherwise.

# Building blocks

* `ParserValueList` is the ordered, cursor-navigable run of values
  that makes up a property value or the arguments of a function.
* `ParserSelector` is a mutable selector node linked to its left-hand context
  through its tag history. Once complete it is frozen into a `ComplexSelector`.
* `FloatingRegistry` tracks intermediate objects created half-way through a
  production. A `Floating<T>` handle is either sunk into its owner
  or dropped, so nothing outlives the parse call that created it.

# Entry points

`CssParser` drives the tokenizer and the builders:

```{rust,ignore}
let mut parser = CssParser::new(ParserContext::default());
let sheet = parser.parse_sheet("div > p { color: red }", 1);
let list = parser.parse_selector("a:hover, ::before").unwrap();
```

Entry points never fail as a whole: invalid rules and declarations are dropped,
reported to the `ParserObserver` if there is one, and parsing resumes.

*/

pub use crate::chars::{is_valid_name, is_valid_name_part, is_valid_name_start};
pub use crate::context::{Namespaces, ParserContext, ParserMode};
pub use crate::error::{ParseError, ParseErrorKind, ValueListError};
pub use crate::floating::{Floating, FloatingKind, FloatingRegistry};
#[doc(hidden)]
pub use crate::macros::_cssgrammar_internal_to_lowercase;
pub use crate::media::{MediaQuery, MediaQueryExp, MediaQuerySet, MediaRestrictor};
pub use crate::media::SupportsCondition;
pub use crate::nth::{parse_nth, parse_nth_string};
pub use crate::observer::{ParserObserver, RuleKind};
pub use crate::parser::{CssParser, MAX_NESTING_DEPTH};
pub use crate::parser_selector::ParserSelector;
pub use crate::rules::{CssRule, Declaration, FontFaceRule, ImportRule, Keyframe, KeyframesRule};
pub use crate::rules::{MediaRule, NamespaceRule, PageRule, StyleRule, StyleSheet, SupportsRule};
pub use crate::rules::ViewportRule;
pub use crate::selector::{AttributeMatchType, ComplexSelector, Match, PseudoType};
pub use crate::selector::{QualifiedName, Relation, Selector, SelectorList};
pub use crate::serializer::{serialize_identifier, serialize_string, ToCss};
pub use crate::source::{SourceBuffer, SourceLocation, SourcePosition};
pub use crate::string::ParserString;
pub use crate::tokenizer::{LexMode, Numeric, Token, Tokenizer, TokenizerState, Unit};
pub use crate::values::{ParserFunction, ParserValue, ParserValueList};
pub use cssgrammar_macros::*;
#[doc(hidden)]
pub use phf as _cssgrammar_internal_phf;

#[macro_use]
mod macros;

mod chars;
mod context;
mod error;
mod floating;
mod media;
mod nth;
mod observer;
mod parser;
mod parser_selector;
mod rules;
mod selector;
mod serializer;
mod source;
mod string;
mod tokenizer;
mod values;

#[cfg(test)]
mod tests;
