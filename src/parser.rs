/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::ops::BitOr;

use smallvec::SmallVec;

use crate::context::{Namespaces, ParserContext};
use crate::error::{ParseError, ParseErrorKind};
use crate::floating::{Floating, FloatingRegistry};
use crate::media::{MediaQuery, MediaQueryExp, MediaQuerySet, MediaRestrictor, SupportsCondition};
use crate::nth::parse_nth;
use crate::observer::{ParserObserver, RuleKind};
use crate::parser_selector::ParserSelector;
use crate::rules::{CssRule, Declaration, FontFaceRule, ImportRule, Keyframe, KeyframesRule};
use crate::rules::{MediaRule, NamespaceRule, PageRule, StyleRule, StyleSheet, SupportsRule};
use crate::rules::ViewportRule;
use crate::selector::{AttributeMatchType, Match, PseudoType, QualifiedName, Relation};
use crate::selector::SelectorList;
use crate::source::{SourceBuffer, SourcePosition};
use crate::string::ParserString;
use crate::tokenizer::{LexMode, Token, Tokenizer, TokenizerState};
use crate::values::{ParserFunction, ParserValue, ParserValueList};
use crate::chars::is_valid_name;

/// How deep grouping rules, value functions and blocks, functional
/// pseudo-classes and `@supports` groups may nest. A production nested
/// deeper is rejected.
pub const MAX_NESTING_DEPTH: usize = 128;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum BlockType {
    Parenthesis,
    SquareBracket,
    CurlyBracket,
}

impl BlockType {
    fn opening(token: &Token) -> Option<BlockType> {
        match *token {
            Token::Function(_) | Token::ParenthesisBlock => Some(BlockType::Parenthesis),
            Token::SquareBracketBlock => Some(BlockType::SquareBracket),
            Token::CurlyBracketBlock => Some(BlockType::CurlyBracket),
            _ => None,
        }
    }

    fn closing(token: &Token) -> Option<BlockType> {
        match *token {
            Token::CloseParenthesis => Some(BlockType::Parenthesis),
            Token::CloseSquareBracket => Some(BlockType::SquareBracket),
            Token::CloseCurlyBracket => Some(BlockType::CurlyBracket),
            _ => None,
        }
    }
}

/// A set of characters, to be used with the `Input::consume_until_*` methods.
///
/// The union of two sets can be obtained with the `|` operator.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
struct Delimiters {
    bits: u8,
}

/// `Delimiters` constants.
#[allow(non_upper_case_globals, non_snake_case)]
mod Delimiter {
    use super::Delimiters;

    /// The empty delimiter set
    pub const None: Delimiters = Delimiters { bits: 0 };
    /// The delimiter set with only the `{` opening curly bracket
    pub const CurlyBracketBlock: Delimiters = Delimiters { bits: 1 << 1 };
    /// The delimiter set with only the `;` semicolon
    pub const Semicolon: Delimiters = Delimiters { bits: 1 << 2 };
    /// The delimiter set with only the `,` comma
    pub const Comma: Delimiters = Delimiters { bits: 1 << 3 };
}

impl BitOr<Delimiters> for Delimiters {
    type Output = Delimiters;

    #[inline]
    fn bitor(self, other: Delimiters) -> Delimiters {
        Delimiters {
            bits: self.bits | other.bits,
        }
    }
}

impl Delimiters {
    #[inline]
    fn contains(self, other: Delimiters) -> bool {
        (self.bits & other.bits) != 0
    }

    fn from_token(token: &Token) -> Delimiters {
        match *token {
            Token::CurlyBracketBlock => Delimiter::CurlyBracketBlock,
            Token::Semicolon => Delimiter::Semicolon,
            Token::Comma => Delimiter::Comma,
            _ => Delimiter::None,
        }
    }
}

/// The tokenizer, plus the lexing mode productions switch between.
struct Input<'i> {
    tokenizer: Tokenizer<'i>,
    mode: LexMode,
}

impl<'i> Input<'i> {
    fn new(source: &'i SourceBuffer, first_line: u32) -> Input<'i> {
        Input {
            tokenizer: Tokenizer::with_first_line(source, first_line),
            mode: LexMode::Normal,
        }
    }

    #[inline]
    fn source(&self) -> &'i SourceBuffer {
        self.tokenizer.source()
    }

    #[inline]
    fn mode(&self) -> LexMode {
        self.mode
    }

    fn set_mode(&mut self, mode: LexMode) {
        if self.mode != mode {
            tracing::trace!(from = ?self.mode, to = ?mode, "lexing mode change");
            self.mode = mode;
        }
    }

    #[inline]
    fn state(&self) -> TokenizerState {
        self.tokenizer.state()
    }

    #[inline]
    fn reset(&mut self, state: &TokenizerState) {
        self.tokenizer.reset(state)
    }

    #[inline]
    fn position(&self) -> SourcePosition {
        self.tokenizer.position()
    }

    #[inline]
    fn token_start(&self) -> SourcePosition {
        self.tokenizer.token_start()
    }

    /// The offset of `position` into the caller's text.
    #[inline]
    fn offset(&self, position: SourcePosition) -> usize {
        self.source().text_offset(position)
    }

    #[inline]
    fn next_including_whitespace(&mut self) -> Result<Token<'i>, ()> {
        self.tokenizer.next(self.mode)
    }

    fn next(&mut self) -> Result<Token<'i>, ()> {
        loop {
            match self.next_including_whitespace()? {
                Token::WhiteSpace => continue,
                token => return Ok(token),
            }
        }
    }

    fn skip_whitespace(&mut self) {
        loop {
            let state = self.state();
            if self.next_including_whitespace() != Ok(Token::WhiteSpace) {
                self.reset(&state);
                return;
            }
        }
    }

    /// Whether only whitespace is left.
    fn is_exhausted(&mut self) -> bool {
        let state = self.state();
        let exhausted = self.next().is_err();
        self.reset(&state);
        exhausted
    }

    /// Skip to just before a token in `stop`, the end of the enclosing block,
    /// or the end of the input. Nested blocks are skipped whole.
    fn consume_until_before(&mut self, stop: Delimiters) {
        loop {
            let state = self.state();
            let token = match self.next_including_whitespace() {
                Ok(token) => token,
                Err(()) => return,
            };
            if stop.contains(Delimiters::from_token(&token)) || BlockType::closing(&token).is_some()
            {
                self.reset(&state);
                return;
            }
            if let Some(block_type) = BlockType::opening(&token) {
                if consume_until_end_of_block(block_type, &mut self.tokenizer, self.mode) {
                    return;
                }
            }
        }
    }

    /// Like `consume_until_before`, but also consume the stop token,
    /// and the whole block if it opens one.
    fn consume_until_after(&mut self, stop: Delimiters) {
        loop {
            let state = self.state();
            let token = match self.next_including_whitespace() {
                Ok(token) => token,
                Err(()) => return,
            };
            if BlockType::closing(&token).is_some() {
                self.reset(&state);
                return;
            }
            let is_stop = stop.contains(Delimiters::from_token(&token));
            if let Some(block_type) = BlockType::opening(&token) {
                if consume_until_end_of_block(block_type, &mut self.tokenizer, self.mode) {
                    return;
                }
            }
            if is_stop {
                return;
            }
        }
    }
}

/// Return true if the end of the input was reached.
fn consume_until_end_of_block(
    block_type: BlockType,
    tokenizer: &mut Tokenizer,
    mode: LexMode,
) -> bool {
    let mut stack = SmallVec::<[BlockType; 16]>::new();
    stack.push(block_type);

    while let Ok(ref token) = tokenizer.next(mode) {
        if let Some(b) = BlockType::closing(token) {
            if stack.last() == Some(&b) {
                stack.pop();
                if stack.is_empty() {
                    return false;
                }
            }
        }
        if let Some(block_type) = BlockType::opening(token) {
            stack.push(block_type);
        }
    }
    true
}

/// Whether `token` can be the first token of a compound selector.
fn starts_compound_selector(token: &Token) -> bool {
    matches!(
        *token,
        Token::Ident(_)
            | Token::IdHash(_)
            | Token::Hash(_)
            | Token::Colon
            | Token::SquareBracketBlock
            | Token::Delim('*')
            | Token::Delim('|')
            | Token::Delim('.')
    )
}

/// Where a rule list sits, and which ordering-sensitive rules it still accepts.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
enum SheetState {
    Start,
    Imports,
    Namespaces,
    Body,
    /// Inside `@media` or `@supports`.
    Nested,
}

impl SheetState {
    fn advance(&mut self, to: SheetState) {
        if *self < to {
            *self = to;
        }
    }
}

/// The grammar driver.
///
/// Each entry point parses a complete piece of text, drops whatever is invalid
/// and keeps going. `@namespace` rules seen by `parse_sheet` stay in effect
/// for later calls on the same parser.
pub struct CssParser<'o> {
    context: ParserContext,
    namespaces: Namespaces,
    floating: FloatingRegistry,
    observer: Option<&'o mut dyn ParserObserver>,
    nesting: usize,
}

impl<'o> CssParser<'o> {
    /// A parser without an observer.
    pub fn new(context: ParserContext) -> CssParser<'o> {
        CssParser {
            context,
            namespaces: Namespaces::new(),
            floating: FloatingRegistry::new(),
            observer: None,
            nesting: 0,
        }
    }

    /// A parser that notifies `observer` of rule boundaries and errors.
    pub fn with_observer(
        context: ParserContext,
        observer: &'o mut dyn ParserObserver,
    ) -> CssParser<'o> {
        CssParser {
            observer: Some(observer),
            ..CssParser::new(context)
        }
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn context(&self) -> &ParserContext {
        &self.context
    }

    /// The namespaces declared so far.
    #[inline]
    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    /// Declare namespaces before parsing selectors on their own.
    #[inline]
    pub fn namespaces_mut(&mut self) -> &mut Namespaces {
        &mut self.namespaces
    }

    /// The registry of intermediate objects. Empty between entry points.
    #[inline]
    pub fn floating(&self) -> &FloatingRegistry {
        &self.floating
    }

    /// Parse a whole style sheet. Line numbers in reported errors start at `start_line`.
    pub fn parse_sheet(&mut self, text: &str, start_line: u32) -> StyleSheet {
        let source = SourceBuffer::new(text);
        let mut input = Input::new(&source, start_line);
        let mut state = SheetState::Start;
        let rules = self.parse_rule_list(&mut input, &mut state);
        self.check_floating();
        StyleSheet { rules }
    }

    /// Parse a single rule of any kind.
    pub fn parse_rule(&mut self, text: &str) -> Option<CssRule> {
        self.run("@-internal-rule ", text, |parser, input| {
            parser.expect_internal(input, "-internal-rule")?;
            let mut state = SheetState::Start;
            let before = input.state();
            let rule = match input.next() {
                Ok(Token::AtKeyword(name)) => {
                    let start = input.token_start();
                    parser.parse_at_rule(input, name, start, &mut state)
                }
                Ok(_) => {
                    input.reset(&before);
                    parser.parse_style_rule(input)
                }
                Err(()) => None,
            };
            let rule = rule.ok_or(())?;
            if !input.is_exhausted() {
                let position = input.position();
                parser.report(input, ParseErrorKind::InvalidRule, position);
                return Err(());
            }
            Ok(rule)
        })
    }

    /// Parse a property value, without `!important`.
    pub fn parse_value(&mut self, text: &str) -> Option<ParserValueList<'static>> {
        self.run("@-internal-value ", text, |parser, input| {
            parser.expect_internal(input, "-internal-value")?;
            let start = input.source().text_start();
            let value = parser.parse_value_list(input, false);
            match value {
                Ok(value) if !value.is_empty() && input.is_exhausted() => Ok(value.into_owned()),
                _ => {
                    parser.report(input, ParseErrorKind::InvalidPropertyValue, start);
                    Err(())
                }
            }
        })
    }

    /// Parse the inside of a declaration block, without the braces.
    pub fn parse_declaration_list(&mut self, text: &str) -> Vec<Declaration> {
        self.run("@-internal-decls ", text, |parser, input| {
            parser.expect_internal(input, "-internal-decls")?;
            Ok(parser.parse_declarations(input, false))
        })
        .unwrap_or_default()
    }

    /// Parse a selector list on its own.
    pub fn parse_selector(&mut self, text: &str) -> Option<SelectorList> {
        self.run("@-internal-selector ", text, |parser, input| {
            parser.expect_internal(input, "-internal-selector")?;
            input.skip_whitespace();
            let start = input.position();
            match parser.parse_selector_list(input) {
                Ok(list) if input.is_exhausted() => Ok(list),
                _ => {
                    parser.report(input, ParseErrorKind::InvalidSelector, start);
                    Err(())
                }
            }
        })
    }

    /// Parse a media query list. Invalid queries become `not all`.
    pub fn parse_media_query_list(&mut self, text: &str) -> MediaQuerySet {
        self.run("@-internal-media-list ", text, |parser, input| {
            parser.expect_internal(input, "-internal-media-list")?;
            Ok(parser.parse_media_queries(input))
        })
        .unwrap_or_default()
    }

    /// Parse the condition of an `@supports` rule.
    pub fn parse_supports_condition(&mut self, text: &str) -> Option<SupportsCondition> {
        self.run("@-internal-supports-condition ", text, |parser, input| {
            parser.expect_internal(input, "-internal-supports-condition")?;
            input.skip_whitespace();
            let start = input.position();
            match parser.parse_supports(input) {
                Ok(condition) if input.is_exhausted() => Ok(condition),
                _ => {
                    parser.report(input, ParseErrorKind::InvalidSupportsCondition, start);
                    Err(())
                }
            }
        })
    }

    /// Parse one keyframe: a key list and a declaration block.
    pub fn parse_keyframe_rule(&mut self, text: &str) -> Option<Keyframe> {
        self.run("@-internal-keyframe-rule ", text, |parser, input| {
            parser.expect_internal(input, "-internal-keyframe-rule")?;
            input.skip_whitespace();
            let start = input.position();
            match parser.parse_keyframe(input) {
                Ok(keyframe) if input.is_exhausted() => Ok(keyframe),
                Ok(_) => {
                    parser.report(input, ParseErrorKind::InvalidRule, start);
                    Err(())
                }
                Err(kind) => {
                    parser.report(input, kind, start);
                    Err(())
                }
            }
        })
    }

    /// Parse a keyframe key list such as `from, 50%`, as offsets between 0 and 1.
    pub fn parse_keyframe_key_list(&mut self, text: &str) -> Option<Vec<f32>> {
        self.run("@-internal-keyframe-key-list ", text, |parser, input| {
            parser.expect_internal(input, "-internal-keyframe-key-list")?;
            input.skip_whitespace();
            let start = input.position();
            match parse_keyframe_keys(input) {
                Ok(keys) if input.is_exhausted() => Ok(keys),
                _ => {
                    parser.report(input, ParseErrorKind::InvalidKeyframeSelector, start);
                    Err(())
                }
            }
        })
    }

    fn run<T, F>(&mut self, prefix: &str, text: &str, parse: F) -> Option<T>
    where
        F: for<'i> FnOnce(&mut CssParser<'o>, &mut Input<'i>) -> Result<T, ()>,
    {
        let source = SourceBuffer::with_padding(prefix, text, "");
        let mut input = Input::new(&source, 1);
        let result = parse(self, &mut input).ok();
        self.check_floating();
        result
    }

    /// Run a production that can nest inside itself one level deeper.
    /// Past `MAX_NESTING_DEPTH` the production fails.
    fn nested<I, T>(
        &mut self,
        input: &mut I,
        parse: impl FnOnce(&mut Self, &mut I) -> Result<T, ()>,
    ) -> Result<T, ()> {
        if self.nesting >= MAX_NESTING_DEPTH {
            tracing::debug!(limit = MAX_NESTING_DEPTH, "nesting too deep");
            return Err(());
        }
        self.nesting += 1;
        let result = parse(self, input);
        self.nesting -= 1;
        result
    }

    fn check_floating(&self) {
        debug_assert_eq!(
            self.floating.live_count(),
            0,
            "intermediate objects outlived the parse call"
        );
    }

    /// Internal at-keywords only count when they come from the padding.
    fn expect_internal(&mut self, input: &mut Input, name: &str) -> Result<(), ()> {
        let token = input.next()?;
        let start = input.token_start();
        match token {
            Token::AtKeyword(ref keyword)
                if keyword.eq_ignore_ascii_case(name)
                    && start.index() < input.source().prefix_len() =>
            {
                Ok(())
            }
            _ => Err(()),
        }
    }

    fn report(&mut self, input: &Input, kind: ParseErrorKind, position: SourcePosition) {
        let location = input.tokenizer.source_location(position);
        tracing::debug!(
            line = location.line,
            column = location.column,
            "dropped: {}",
            kind
        );
        let error = ParseError {
            kind,
            location,
            offset: input.offset(position),
        };
        if let Some(observer) = self.observer.as_deref_mut() {
            observer.report_error(&error);
        }
    }

    fn observer(&mut self) -> Option<&mut (dyn ParserObserver + 'o)> {
        self.observer.as_deref_mut()
    }

    fn start_rule(&mut self, kind: RuleKind, offset: usize) {
        if let Some(observer) = self.observer() {
            observer.start_rule(kind, offset)
        }
    }

    fn end_rule(&mut self, offset: usize) {
        if let Some(observer) = self.observer() {
            observer.end_rule(offset)
        }
    }

    fn start_selector(&mut self, offset: usize) {
        if let Some(observer) = self.observer() {
            observer.start_selector(offset)
        }
    }

    fn end_selector(&mut self, offset: usize) {
        if let Some(observer) = self.observer() {
            observer.end_selector(offset)
        }
    }

    fn start_property(&mut self, offset: usize) {
        if let Some(observer) = self.observer() {
            observer.start_property(offset)
        }
    }

    fn end_property(&mut self, important: bool, is_parsed: bool, offset: usize) {
        if let Some(observer) = self.observer() {
            observer.end_property(important, is_parsed, offset)
        }
    }

    // Rules

    /// Rules until the end of the input, or until `}` when nested.
    fn parse_rule_list<'i>(&mut self, input: &mut Input<'i>, state: &mut SheetState) -> Vec<CssRule> {
        let nested = *state == SheetState::Nested;
        let mut rules = Vec::new();
        loop {
            let before = input.state();
            let token = match input.next() {
                Ok(token) => token,
                Err(()) => break,
            };
            match token {
                Token::CDO | Token::CDC if !nested => continue,
                Token::CloseCurlyBracket if nested => break,
                Token::CloseCurlyBracket | Token::CloseParenthesis | Token::CloseSquareBracket => {
                    let position = input.token_start();
                    self.report(input, ParseErrorKind::UnexpectedToken, position);
                }
                Token::AtKeyword(name) => {
                    let start = input.token_start();
                    if let Some(rule) = self.parse_at_rule(input, name, start, state) {
                        rules.push(rule);
                    }
                }
                _ => {
                    input.reset(&before);
                    if let Some(rule) = self.parse_style_rule(input) {
                        state.advance(SheetState::Body);
                        rules.push(rule);
                    }
                }
            }
        }
        rules
    }

    fn parse_style_rule(&mut self, input: &mut Input) -> Option<CssRule> {
        input.skip_whitespace();
        let start = input.state();
        let position = start.position();
        self.start_rule(RuleKind::Style, input.offset(position));
        self.start_selector(input.offset(position));
        let selectors = self.parse_selector_list(input);
        let prelude_end = input.position();
        self.end_selector(input.offset(prelude_end));
        let selectors = match selectors {
            Ok(list) if input.next() == Ok(Token::CurlyBracketBlock) => list,
            _ => {
                self.report(input, ParseErrorKind::InvalidSelector, position);
                input.reset(&start);
                input.consume_until_after(Delimiter::CurlyBracketBlock);
                self.end_rule(input.offset(input.position()));
                return None;
            }
        };
        let declarations = self.parse_declarations(input, true);
        self.end_rule(input.offset(input.position()));
        Some(CssRule::Style(StyleRule {
            selectors,
            declarations,
        }))
    }

    fn parse_at_rule<'i>(
        &mut self,
        input: &mut Input<'i>,
        name: ParserString<'i>,
        start: SourcePosition,
        state: &mut SheetState,
    ) -> Option<CssRule> {
        let key = name.to_ascii_key();
        let kind = match_ignore_ascii_case! { &key,
            "charset" => Some(RuleKind::Charset),
            "import" => Some(RuleKind::Import),
            "namespace" => Some(RuleKind::Namespace),
            "media" => Some(RuleKind::Media),
            "supports" => Some(RuleKind::Supports),
            "keyframes" | "-webkit-keyframes" => Some(RuleKind::Keyframes),
            "page" => Some(RuleKind::Page),
            "font-face" => Some(RuleKind::FontFace),
            "viewport" if self.context.viewport_allowed() => Some(RuleKind::Viewport),
            _ => None,
        };
        let kind = match kind {
            Some(kind) => kind,
            None => {
                self.report(input, ParseErrorKind::UnknownAtRule(key), start);
                input.consume_until_after(Delimiter::Semicolon | Delimiter::CurlyBracketBlock);
                return None;
            }
        };
        let (allowed, next_state) = match kind {
            RuleKind::Charset => (*state == SheetState::Start, SheetState::Imports),
            RuleKind::Import => (*state <= SheetState::Imports, SheetState::Imports),
            RuleKind::Namespace => (*state <= SheetState::Namespaces, SheetState::Namespaces),
            _ => (true, SheetState::Body),
        };
        if !allowed {
            self.report(input, ParseErrorKind::InvalidRule, start);
            input.consume_until_after(Delimiter::Semicolon | Delimiter::CurlyBracketBlock);
            return None;
        }

        self.start_rule(kind, input.offset(start));
        let after_keyword = input.state();
        let result = match kind {
            RuleKind::Charset => self.parse_charset_rule(input),
            RuleKind::Import => self.parse_import_rule(input),
            RuleKind::Namespace => self.parse_namespace_rule(input),
            RuleKind::Media => self.parse_media_rule(input),
            RuleKind::Supports => self.parse_supports_rule(input),
            RuleKind::Keyframes => self.parse_keyframes_rule(input, key.starts_with("-webkit-")),
            RuleKind::Page => self.parse_page_rule(input),
            RuleKind::FontFace => self
                .parse_declaration_block(input)
                .map(|declarations| CssRule::FontFace(FontFaceRule { declarations })),
            RuleKind::Viewport => self
                .parse_declaration_block(input)
                .map(|declarations| CssRule::Viewport(ViewportRule { declarations })),
            RuleKind::Style | RuleKind::Keyframe => Err(ParseErrorKind::InvalidRule),
        };
        match result {
            Ok(rule) => {
                state.advance(next_state);
                self.end_rule(input.offset(input.position()));
                Some(rule)
            }
            Err(kind) => {
                self.report(input, kind, start);
                input.reset(&after_keyword);
                input.consume_until_after(Delimiter::Semicolon | Delimiter::CurlyBracketBlock);
                self.end_rule(input.offset(input.position()));
                None
            }
        }
    }

    /// `;` or the end of the input.
    fn expect_rule_end(&mut self, input: &mut Input) -> Result<(), ParseErrorKind> {
        match input.next() {
            Ok(Token::Semicolon) | Err(()) => Ok(()),
            Ok(_) => Err(ParseErrorKind::InvalidRule),
        }
    }

    fn parse_charset_rule(&mut self, input: &mut Input) -> Result<CssRule, ParseErrorKind> {
        let encoding = match input.next() {
            Ok(Token::QuotedString(encoding)) => encoding.to_string(),
            _ => return Err(ParseErrorKind::InvalidRule),
        };
        self.expect_rule_end(input)?;
        Ok(CssRule::Charset(encoding))
    }

    fn parse_import_rule(&mut self, input: &mut Input) -> Result<CssRule, ParseErrorKind> {
        let token = input.next().map_err(|()| ParseErrorKind::UnexpectedEndOfInput)?;
        let href = parse_url_or_string(input, token)?;
        let media = self.parse_media_queries(input);
        self.expect_rule_end(input)?;
        Ok(CssRule::Import(ImportRule { href, media }))
    }

    fn parse_namespace_rule(&mut self, input: &mut Input) -> Result<CssRule, ParseErrorKind> {
        let mut prefix = None;
        let mut token = input.next().map_err(|()| ParseErrorKind::UnexpectedEndOfInput)?;
        if let Token::Ident(ref name) = token {
            let name = name.to_string();
            if !is_valid_name(&name) {
                return Err(ParseErrorKind::InvalidRule);
            }
            prefix = Some(name);
            token = input.next().map_err(|()| ParseErrorKind::UnexpectedEndOfInput)?;
        }
        let uri = parse_url_or_string(input, token)?;
        self.expect_rule_end(input)?;
        self.namespaces.add(prefix.as_deref(), &uri);
        Ok(CssRule::Namespace(NamespaceRule { prefix, uri }))
    }

    /// `{ rules }`, after the prelude.
    fn parse_rule_block(&mut self, input: &mut Input) -> Result<Vec<CssRule>, ParseErrorKind> {
        if input.next() != Ok(Token::CurlyBracketBlock) {
            return Err(ParseErrorKind::InvalidRule);
        }
        self.nested(input, |parser, input| {
            Ok(parser.parse_rule_list(input, &mut SheetState::Nested))
        })
        .map_err(|()| ParseErrorKind::InvalidRule)
    }

    /// `{ declarations }`, after the prelude.
    fn parse_declaration_block(
        &mut self,
        input: &mut Input,
    ) -> Result<Vec<Declaration>, ParseErrorKind> {
        if input.next() != Ok(Token::CurlyBracketBlock) {
            return Err(ParseErrorKind::InvalidRule);
        }
        Ok(self.parse_declarations(input, true))
    }

    fn parse_media_rule(&mut self, input: &mut Input) -> Result<CssRule, ParseErrorKind> {
        self.start_selector(input.offset(input.position()));
        let media = self.parse_media_queries(input);
        self.end_selector(input.offset(input.position()));
        let rules = self.parse_rule_block(input)?;
        Ok(CssRule::Media(MediaRule { media, rules }))
    }

    fn parse_supports_rule(&mut self, input: &mut Input) -> Result<CssRule, ParseErrorKind> {
        input.skip_whitespace();
        self.start_selector(input.offset(input.position()));
        let condition = self
            .parse_supports(input)
            .map_err(|()| ParseErrorKind::InvalidSupportsCondition)?;
        self.end_selector(input.offset(input.position()));
        let rules = self.parse_rule_block(input)?;
        Ok(CssRule::Supports(SupportsRule { condition, rules }))
    }

    fn parse_keyframes_rule(
        &mut self,
        input: &mut Input,
        vendor_prefixed: bool,
    ) -> Result<CssRule, ParseErrorKind> {
        let name = match input.next() {
            Ok(Token::Ident(name)) | Ok(Token::QuotedString(name)) => name.to_string(),
            _ => return Err(ParseErrorKind::InvalidRule),
        };
        if input.next() != Ok(Token::CurlyBracketBlock) {
            return Err(ParseErrorKind::InvalidRule);
        }
        let mut keyframes = self.floating.create_floating_keyframe_vector();
        loop {
            let before = input.state();
            match input.next() {
                Err(()) | Ok(Token::CloseCurlyBracket) => break,
                Ok(ref token) if BlockType::closing(token).is_some() => {
                    let position = input.token_start();
                    self.report(input, ParseErrorKind::UnexpectedToken, position);
                    continue;
                }
                Ok(_) => input.reset(&before),
            }
            input.skip_whitespace();
            let start = input.state();
            self.start_rule(RuleKind::Keyframe, input.offset(start.position()));
            match self.parse_keyframe(input) {
                Ok(keyframe) => keyframes.push(keyframe),
                Err(kind) => {
                    self.report(input, kind, start.position());
                    input.reset(&start);
                    input.consume_until_after(Delimiter::CurlyBracketBlock);
                }
            }
            self.end_rule(input.offset(input.position()));
        }
        Ok(CssRule::Keyframes(KeyframesRule {
            name,
            vendor_prefixed,
            keyframes: self.floating.sink_floating_keyframe_vector(keyframes),
        }))
    }

    fn parse_keyframe(&mut self, input: &mut Input) -> Result<Keyframe, ParseErrorKind> {
        let keys =
            parse_keyframe_keys(input).map_err(|()| ParseErrorKind::InvalidKeyframeSelector)?;
        let declarations = self.parse_declaration_block(input)?;
        Ok(Keyframe { keys, declarations })
    }

    fn parse_page_rule(&mut self, input: &mut Input) -> Result<CssRule, ParseErrorKind> {
        input.skip_whitespace();
        self.start_selector(input.offset(input.position()));
        let before = input.state();
        let mut selector = match input.next() {
            Ok(Token::Ident(name)) => {
                let tag = QualifiedName::new(
                    None,
                    &name.to_string(),
                    self.namespaces.default_namespace(),
                );
                let after_name = input.state();
                if input.next_including_whitespace() == Ok(Token::Colon) {
                    let mut pseudo = self.parse_page_pseudo(input)?;
                    pseudo.prepend_tag_selector(tag, false);
                    pseudo
                } else {
                    input.reset(&after_name);
                    self.floating.create_floating_selector_with_tag_name(tag)
                }
            }
            Ok(Token::Colon) => self.parse_page_pseudo(input)?,
            _ => {
                input.reset(&before);
                self.floating.create_floating_selector()
            }
        };
        selector.set_for_page();
        self.end_selector(input.offset(input.position()));
        let mut selector_vector = self.floating.create_floating_selector_vector();
        selector_vector.push(self.floating.sink_floating_selector(selector));
        let mut selector_vector = self.floating.sink_floating_selector_vector(selector_vector);
        let selectors = SelectorList::adopt_selector_vector(&mut selector_vector);
        let declarations = self.parse_declaration_block(input)?;
        Ok(CssRule::Page(PageRule {
            selectors,
            declarations,
        }))
    }

    /// `:first`, `:left` or `:right`, after the colon.
    fn parse_page_pseudo(
        &mut self,
        input: &mut Input,
    ) -> Result<Floating<ParserSelector>, ParseErrorKind> {
        let name = match input.next_including_whitespace() {
            Ok(Token::Ident(name)) => name.to_ascii_key(),
            _ => return Err(ParseErrorKind::InvalidSelector),
        };
        let mut selector = self.floating.create_floating_selector();
        selector.set_match(Match::PagePseudoClass);
        selector.update_pseudo_type(&name, false);
        if selector.pseudo_type() == PseudoType::Unknown {
            return Err(ParseErrorKind::InvalidSelector);
        }
        Ok(selector)
    }

    // Declarations and values

    /// Declarations until the end of the input, or until `}` when `nested`.
    fn parse_declarations(&mut self, input: &mut Input, nested: bool) -> Vec<Declaration> {
        let mut declarations = Vec::new();
        loop {
            let before = input.state();
            let token = match input.next() {
                Ok(token) => token,
                Err(()) => break,
            };
            let position = input.token_start();
            match token {
                Token::CloseCurlyBracket if nested => break,
                Token::Semicolon => continue,
                Token::Ident(name) => match self.parse_declaration(input, name, position) {
                    Ok(declaration) => declarations.push(declaration),
                    Err(kind) => {
                        self.report(input, kind, position);
                        input.reset(&before);
                        input.consume_until_after(Delimiter::Semicolon);
                        self.end_property(false, false, input.offset(input.position()));
                    }
                },
                ref token if BlockType::closing(token).is_some() => {
                    self.report(input, ParseErrorKind::UnexpectedToken, position);
                }
                _ => {
                    self.report(input, ParseErrorKind::InvalidDeclaration, position);
                    input.reset(&before);
                    input.consume_until_after(Delimiter::Semicolon);
                }
            }
        }
        declarations
    }

    fn parse_declaration<'i>(
        &mut self,
        input: &mut Input<'i>,
        name: ParserString<'i>,
        position: SourcePosition,
    ) -> Result<Declaration, ParseErrorKind> {
        self.start_property(input.offset(position));
        if input.next() != Ok(Token::Colon) {
            return Err(ParseErrorKind::InvalidDeclaration);
        }
        let (value, important) = self
            .parse_declaration_value(input)
            .map_err(|()| ParseErrorKind::InvalidPropertyValue)?;
        let end = input.state();
        match input.next() {
            Ok(Token::Semicolon) | Err(()) => {}
            Ok(Token::CloseCurlyBracket) => input.reset(&end),
            Ok(_) => return Err(ParseErrorKind::InvalidPropertyValue),
        }
        self.end_property(important, true, input.offset(end.position()));
        Ok(Declaration {
            name: property_name(&name),
            value: value.into_owned(),
            important,
        })
    }

    /// A non-empty value list, and whether `!important` follows it.
    fn parse_declaration_value<'i>(
        &mut self,
        input: &mut Input<'i>,
    ) -> Result<(ParserValueList<'i>, bool), ()> {
        let value = self.parse_value_list(input, false)?;
        if value.is_empty() {
            return Err(());
        }
        let before = input.state();
        let important = match input.next() {
            Ok(Token::Important) => true,
            _ => {
                input.reset(&before);
                false
            }
        };
        Ok((value, important))
    }

    /// Values up to, not including, the end of the enclosing construct:
    /// `;`, `!important`, a closing bracket or the end of the input.
    fn parse_value_list<'i>(
        &mut self,
        input: &mut Input<'i>,
        in_function: bool,
    ) -> Result<ParserValueList<'i>, ()> {
        let mut list = self.floating.create_floating_value_list();
        loop {
            let before = input.state();
            let token = match input.next() {
                Ok(token) => token,
                Err(()) => break,
            };
            let value = match token {
                Token::Semicolon
                | Token::Important
                | Token::CloseCurlyBracket
                | Token::CloseParenthesis
                | Token::CloseSquareBracket => {
                    input.reset(&before);
                    break;
                }
                Token::Function(name) => {
                    let args =
                        self.nested(input, |parser, input| parser.parse_value_list(input, true))?;
                    if input.next() != Ok(Token::CloseParenthesis) {
                        return Err(());
                    }
                    let function = self
                        .floating
                        .create_floating_function(ParserFunction { name, args });
                    ParserValue::Function(Box::new(self.floating.sink_floating_function(function)))
                }
                Token::ParenthesisBlock => {
                    let mut group = self.nested(input, |parser, input| {
                        parser.parse_value_list(input, in_function)
                    })?;
                    if input.next() != Ok(Token::CloseParenthesis) {
                        return Err(());
                    }
                    list.add_value(ParserValue::Operator('('));
                    list.steal_values(&mut group);
                    ParserValue::Operator(')')
                }
                Token::SquareBracketBlock => {
                    let group =
                        self.nested(input, |parser, input| parser.parse_value_list(input, false))?;
                    if input.next() != Ok(Token::CloseSquareBracket) {
                        return Err(());
                    }
                    ParserValue::ValueList(Box::new(group))
                }
                Token::Comma => ParserValue::Operator(','),
                Token::Delim('/') => ParserValue::Operator('/'),
                Token::Delim(c) if in_function && matches!(c, '+' | '-' | '*') => {
                    ParserValue::Operator(c)
                }
                Token::Delim(_) => return Err(()),
                token => ParserValue::from_token(token).ok_or(())?,
            };
            list.add_value(value);
        }
        Ok(self.floating.sink_floating_value_list(list))
    }

    // Media queries

    /// A comma-separated list, up to `{`, `;` or the end of the input.
    fn parse_media_queries(&mut self, input: &mut Input) -> MediaQuerySet {
        let previous = input.mode();
        input.set_mode(LexMode::MediaQuery);
        let mut set = MediaQuerySet::new();
        input.skip_whitespace();
        let before = input.state();
        let empty = matches!(
            input.next(),
            Err(()) | Ok(Token::CurlyBracketBlock) | Ok(Token::Semicolon) | Ok(Token::CloseCurlyBracket)
        );
        input.reset(&before);
        if !empty {
            loop {
                input.skip_whitespace();
                let start = input.state();
                match self.parse_media_query(input) {
                    Ok(query) => set.add_media_query(query),
                    Err(()) => {
                        self.report(input, ParseErrorKind::InvalidMediaQuery, start.position());
                        input.reset(&start);
                        input.consume_until_before(
                            Delimiter::Comma | Delimiter::CurlyBracketBlock | Delimiter::Semicolon,
                        );
                        set.add_media_query(MediaQuery::not_all());
                    }
                }
                let before = input.state();
                if input.next() != Ok(Token::Comma) {
                    input.reset(&before);
                    break;
                }
            }
        }
        input.set_mode(previous);
        set
    }

    fn parse_media_query(&mut self, input: &mut Input) -> Result<MediaQuery, ()> {
        let mut expressions = self.floating.create_floating_media_query_exp_list();
        let before = input.state();
        let restrictor = match input.next()? {
            Token::MediaOnly => MediaRestrictor::Only,
            Token::MediaNot => MediaRestrictor::Not,
            _ => {
                input.reset(&before);
                MediaRestrictor::None
            }
        };
        let media_type = match input.next()? {
            Token::Ident(name) => name.to_ascii_key(),
            Token::ParenthesisBlock if restrictor == MediaRestrictor::None => {
                let exp = self.parse_media_query_exp(input)?;
                expressions.push(self.floating.sink_floating_media_query_exp(exp));
                "all".to_owned()
            }
            _ => return Err(()),
        };
        loop {
            let before = input.state();
            if input.next() != Ok(Token::MediaAnd) {
                input.reset(&before);
                break;
            }
            if input.next() != Ok(Token::ParenthesisBlock) {
                return Err(());
            }
            let exp = self.parse_media_query_exp(input)?;
            expressions.push(self.floating.sink_floating_media_query_exp(exp));
        }
        let before = input.state();
        match input.next() {
            Ok(Token::Comma)
            | Ok(Token::CurlyBracketBlock)
            | Ok(Token::Semicolon)
            | Ok(Token::CloseCurlyBracket)
            | Err(()) => input.reset(&before),
            Ok(_) => return Err(()),
        }
        let expressions = self.floating.sink_floating_media_query_exp_list(expressions);
        let query = self
            .floating
            .create_floating_media_query(MediaQuery::new(restrictor, &media_type, expressions));
        Ok(self.floating.sink_floating_media_query(query))
    }

    /// `feature)` or `feature: value)`, after the `(`.
    fn parse_media_query_exp(&mut self, input: &mut Input) -> Result<Floating<MediaQueryExp>, ()> {
        let media_feature = match input.next()? {
            Token::Ident(name) => name.to_ascii_key(),
            _ => return Err(()),
        };
        let value = match input.next()? {
            Token::CloseParenthesis => None,
            Token::Colon => {
                let previous = input.mode();
                input.set_mode(LexMode::Normal);
                let value = self.parse_value_list(input, false);
                input.set_mode(previous);
                let value = value?;
                if value.is_empty() || input.next() != Ok(Token::CloseParenthesis) {
                    return Err(());
                }
                Some(value.into_owned())
            }
            _ => return Err(()),
        };
        Ok(self.floating.create_floating_media_query_exp(MediaQueryExp {
            media_feature,
            value,
        }))
    }

    // @supports

    fn parse_supports(&mut self, input: &mut Input) -> Result<SupportsCondition, ()> {
        let previous = input.mode();
        input.set_mode(LexMode::Supports);
        let condition = self.parse_supports_condition_inner(input);
        input.set_mode(previous);
        condition
    }

    fn parse_supports_condition_inner(&mut self, input: &mut Input) -> Result<SupportsCondition, ()> {
        match input.next()? {
            Token::SupportsNot => {
                if input.next() != Ok(Token::ParenthesisBlock) {
                    return Err(());
                }
                let condition = self.parse_supports_in_parens(input)?;
                Ok(SupportsCondition::Not(Box::new(condition)))
            }
            Token::ParenthesisBlock => {
                let mut conditions = vec![self.parse_supports_in_parens(input)?];
                let mut conjunction = None;
                loop {
                    let before = input.state();
                    let is_and = match input.next() {
                        Ok(Token::SupportsAnd) => true,
                        Ok(Token::SupportsOr) => false,
                        _ => {
                            input.reset(&before);
                            break;
                        }
                    };
                    // `and` and `or` cannot be mixed without parentheses.
                    if conjunction.map_or(false, |previous| previous != is_and) {
                        return Err(());
                    }
                    conjunction = Some(is_and);
                    if input.next() != Ok(Token::ParenthesisBlock) {
                        return Err(());
                    }
                    conditions.push(self.parse_supports_in_parens(input)?);
                }
                match conjunction {
                    None => conditions.pop().ok_or(()),
                    Some(true) => Ok(SupportsCondition::And(conditions)),
                    Some(false) => Ok(SupportsCondition::Or(conditions)),
                }
            }
            _ => Err(()),
        }
    }

    /// A declaration or a nested condition, after the `(`.
    fn parse_supports_in_parens(&mut self, input: &mut Input) -> Result<SupportsCondition, ()> {
        input.skip_whitespace();
        let before = input.state();
        if let Ok(Token::Ident(name)) = input.next() {
            if input.next() == Ok(Token::Colon) {
                input.set_mode(LexMode::Normal);
                let value = self.parse_declaration_value(input);
                input.set_mode(LexMode::Supports);
                let (value, important) = value?;
                if input.next() != Ok(Token::CloseParenthesis) {
                    return Err(());
                }
                return Ok(SupportsCondition::Declaration(Declaration {
                    name: property_name(&name),
                    value: value.into_owned(),
                    important,
                }));
            }
        }
        input.reset(&before);
        let condition =
            self.nested(input, |parser, input| parser.parse_supports_condition_inner(input))?;
        if input.next() != Ok(Token::CloseParenthesis) {
            return Err(());
        }
        Ok(condition)
    }

    // Selectors

    fn parse_selector_list(&mut self, input: &mut Input) -> Result<SelectorList, ()> {
        let mut selector_vector = self.floating.create_floating_selector_vector();
        loop {
            input.skip_whitespace();
            let selector = self.parse_complex_selector(input)?;
            selector_vector.push(self.floating.sink_floating_selector(selector));
            let before = input.state();
            if input.next() != Ok(Token::Comma) {
                input.reset(&before);
                break;
            }
        }
        let mut selector_vector = self.floating.sink_floating_selector_vector(selector_vector);
        Ok(SelectorList::adopt_selector_vector(&mut selector_vector))
    }

    fn parse_complex_selector(&mut self, input: &mut Input) -> Result<Floating<ParserSelector>, ()> {
        let mut selector = self.parse_compound_selector(input)?;
        while let Some(relation) = parse_combinator(input)? {
            input.skip_whitespace();
            let mut right = self.parse_compound_selector(input)?;
            let left = self.floating.sink_floating_selector(selector);
            let left_is_content = left.is_content_pseudo_element();
            right.update_last(move |end| {
                end.set_relation(relation);
                if left_is_content {
                    end.set_relation_is_affected_by_pseudo_content();
                }
                end.set_tag_history(Box::new(left));
            });
            selector = right;
        }
        Ok(selector)
    }

    fn parse_compound_selector(&mut self, input: &mut Input) -> Result<Floating<ParserSelector>, ()> {
        let type_selector = self.parse_type_selector(input)?;
        let specifiers = self.parse_specifier_list(input)?;
        match (type_selector, specifiers) {
            (None, None) => Err(()),
            (Some((prefix, element_name)), None) => {
                let tag = self
                    .namespaces
                    .determine_name_in_namespace(prefix.as_deref(), &element_name)
                    .ok_or(())?;
                Ok(self.floating.create_floating_selector_with_tag_name(tag))
            }
            (Some((prefix, element_name)), Some(specifiers)) => {
                self.rewrite_specifiers_with_element_name(
                    prefix.as_deref(),
                    &element_name,
                    specifiers,
                    false,
                )
            }
            (None, Some(specifiers)) => self.rewrite_specifiers_with_namespace_if_needed(specifiers),
        }
    }

    /// `name`, `*`, `ns|name`, `*|name` or `|name`, as (prefix, element name).
    fn parse_type_selector(
        &mut self,
        input: &mut Input,
    ) -> Result<Option<(Option<String>, String)>, ()> {
        let before = input.state();
        let first = match input.next_including_whitespace() {
            Ok(Token::Ident(name)) => name.to_string(),
            Ok(Token::Delim('*')) => "*".to_owned(),
            Ok(Token::Delim('|')) => {
                let element_name = self.parse_element_name(input)?;
                return Ok(Some((Some(String::new()), element_name)));
            }
            _ => {
                input.reset(&before);
                return Ok(None);
            }
        };
        let after_first = input.state();
        if input.next_including_whitespace() == Ok(Token::Delim('|')) {
            let element_name = self.parse_element_name(input)?;
            return Ok(Some((Some(first), element_name)));
        }
        input.reset(&after_first);
        Ok(Some((None, self.element_name(first))))
    }

    fn parse_element_name(&mut self, input: &mut Input) -> Result<String, ()> {
        match input.next_including_whitespace()? {
            Token::Ident(name) => Ok(self.element_name(name.to_string())),
            Token::Delim('*') => Ok("*".to_owned()),
            _ => Err(()),
        }
    }

    fn element_name(&self, mut name: String) -> String {
        if self.context.is_html_document {
            name.make_ascii_lowercase();
        }
        name
    }

    fn parse_specifier_list(
        &mut self,
        input: &mut Input,
    ) -> Result<Option<Floating<ParserSelector>>, ()> {
        let mut specifiers: Option<Floating<ParserSelector>> = None;
        while let Some(specifier) = self.parse_specifier(input)? {
            specifiers = Some(match specifiers {
                None => specifier,
                Some(specifiers) => self.rewrite_specifiers(specifiers, specifier),
            });
        }
        Ok(specifiers)
    }

    fn parse_specifier(&mut self, input: &mut Input) -> Result<Option<Floating<ParserSelector>>, ()> {
        let before = input.state();
        let token = match input.next_including_whitespace() {
            Ok(token) => token,
            Err(()) => return Ok(None),
        };
        let specifier = match token {
            Token::IdHash(value) => self.id_or_class(Match::Id, value),
            // Not a valid identifier, so not a valid id.
            Token::Hash(_) => return Err(()),
            Token::Delim('.') => match input.next_including_whitespace()? {
                Token::Ident(value) => self.id_or_class(Match::Class, value),
                _ => return Err(()),
            },
            Token::SquareBracketBlock => self.parse_attribute(input)?,
            Token::Colon => self.parse_pseudo(input)?,
            _ => {
                input.reset(&before);
                return Ok(None);
            }
        };
        Ok(Some(specifier))
    }

    fn id_or_class(&mut self, match_type: Match, value: ParserString) -> Floating<ParserSelector> {
        let mut value = value.to_string();
        if self.context.in_quirks_mode() {
            value.make_ascii_lowercase();
        }
        let mut selector = self.floating.create_floating_selector();
        selector.set_match(match_type);
        selector.set_value(&value);
        selector
    }

    /// After the `[`.
    fn parse_attribute(&mut self, input: &mut Input) -> Result<Floating<ParserSelector>, ()> {
        input.skip_whitespace();
        let (prefix, local_name) = match input.next_including_whitespace()? {
            Token::Ident(name) => {
                let after_name = input.state();
                if input.next_including_whitespace() == Ok(Token::Delim('|')) {
                    (Some(name.to_string()), parse_attribute_name(input)?)
                } else {
                    input.reset(&after_name);
                    (None, name.to_string())
                }
            }
            Token::Delim('*') => {
                if input.next_including_whitespace() != Ok(Token::Delim('|')) {
                    return Err(());
                }
                (Some("*".to_owned()), parse_attribute_name(input)?)
            }
            Token::Delim('|') => (Some(String::new()), parse_attribute_name(input)?),
            _ => return Err(()),
        };
        let local_name = self.element_name(local_name);
        let attribute = match prefix {
            // Unprefixed attributes are in no namespace.
            None => QualifiedName::new(None, &local_name, Some("")),
            Some(ref prefix) => self
                .namespaces
                .determine_name_in_namespace(Some(prefix), &local_name)
                .ok_or(())?,
        };

        let mut selector = self.floating.create_floating_selector();
        input.skip_whitespace();
        let match_type = match input.next_including_whitespace()? {
            Token::CloseSquareBracket => {
                selector.set_attribute(attribute, AttributeMatchType::CaseSensitive);
                selector.set_match(Match::AttributeSet);
                return Ok(selector);
            }
            Token::Delim('=') => Match::AttributeExact,
            Token::IncludeMatch => Match::AttributeList,
            Token::DashMatch => Match::AttributeHyphen,
            Token::PrefixMatch => Match::AttributeBegin,
            Token::SuffixMatch => Match::AttributeEnd,
            Token::SubstringMatch => Match::AttributeContain,
            _ => return Err(()),
        };
        input.skip_whitespace();
        let value = match input.next_including_whitespace()? {
            Token::Ident(value) | Token::QuotedString(value) => value.to_string(),
            _ => return Err(()),
        };
        input.skip_whitespace();
        let case = match input.next_including_whitespace()? {
            Token::CloseSquareBracket => AttributeMatchType::CaseSensitive,
            Token::Ident(ref flag) if flag.eq_ignore_ascii_case("i") => {
                input.skip_whitespace();
                if input.next_including_whitespace() != Ok(Token::CloseSquareBracket) {
                    return Err(());
                }
                AttributeMatchType::CaseInsensitive
            }
            _ => return Err(()),
        };
        selector.set_attribute(attribute, case);
        selector.set_match(match_type);
        selector.set_value(&value);
        Ok(selector)
    }

    /// After the first `:`.
    fn parse_pseudo(&mut self, input: &mut Input) -> Result<Floating<ParserSelector>, ()> {
        let mut token = input.next_including_whitespace()?;
        let match_type = if token == Token::Colon {
            token = input.next_including_whitespace()?;
            Match::PseudoElement
        } else {
            Match::PseudoClass
        };
        let (name, has_arguments) = match token {
            Token::Ident(name) => (name.to_ascii_key(), false),
            Token::Function(name) => (name.to_ascii_key(), true),
            _ => return Err(()),
        };
        let mut selector = self.floating.create_floating_selector();
        selector.set_match(match_type);
        selector.update_pseudo_type(&name, has_arguments);
        if selector.pseudo_type() == PseudoType::Unknown {
            return Err(());
        }
        if name.starts_with("-internal-") && !self.context.internal_allowed() {
            return Err(());
        }
        if !has_arguments {
            return Ok(selector);
        }
        self.nested(input, |parser, input| {
            parser.parse_pseudo_arguments(input, selector)
        })
    }

    fn parse_pseudo_arguments(
        &mut self,
        input: &mut Input,
        mut selector: Floating<ParserSelector>,
    ) -> Result<Floating<ParserSelector>, ()> {
        match selector.pseudo_type() {
            PseudoType::Not => {
                input.skip_whitespace();
                let argument = self.parse_compound_selector(input)?;
                if !argument.is_simple() {
                    return Err(());
                }
                let mut selector_vector = self.floating.create_floating_selector_vector();
                selector_vector.push(self.floating.sink_floating_selector(argument));
                let mut selector_vector =
                    self.floating.sink_floating_selector_vector(selector_vector);
                selector.adopt_selector_vector(&mut selector_vector);
            }
            PseudoType::Any => {
                let mut selector_vector = self.floating.create_floating_selector_vector();
                loop {
                    input.skip_whitespace();
                    let argument = self.parse_compound_selector(input)?;
                    selector_vector.push(self.floating.sink_floating_selector(argument));
                    let before = input.state();
                    if input.next() != Ok(Token::Comma) {
                        input.reset(&before);
                        break;
                    }
                }
                let mut selector_vector =
                    self.floating.sink_floating_selector_vector(selector_vector);
                selector.adopt_selector_vector(&mut selector_vector);
            }
            PseudoType::Host | PseudoType::HostContext | PseudoType::Slotted => {
                input.skip_whitespace();
                let argument = self.parse_compound_selector(input)?;
                let mut selector_vector = self.floating.create_floating_selector_vector();
                selector_vector.push(self.floating.sink_floating_selector(argument));
                let mut selector_vector =
                    self.floating.sink_floating_selector_vector(selector_vector);
                selector.adopt_selector_vector(&mut selector_vector);
            }
            PseudoType::Cue => {
                let list = self.parse_selector_list(input)?;
                selector.set_selector_list(list);
            }
            PseudoType::Lang => match input.next()? {
                Token::Ident(language) => selector.set_argument(&language.to_string()),
                _ => return Err(()),
            },
            pseudo_type if pseudo_type.is_nth() => {
                let previous = input.mode();
                input.set_mode(LexMode::NthChild);
                let token = input.next();
                input.set_mode(previous);
                let (a, b) = parse_nth(&token?)?;
                selector.set_nth(a, b);
            }
            _ => return Err(()),
        }
        if input.next() != Ok(Token::CloseParenthesis) {
            return Err(());
        }
        Ok(selector)
    }

    // Selector rewriting. A compound is built key first from its specifiers,
    // then qualified with its type selector.

    fn rewrite_specifiers(
        &mut self,
        mut specifiers: Floating<ParserSelector>,
        mut new_specifier: Floating<ParserSelector>,
    ) -> Floating<ParserSelector> {
        if new_specifier.crosses_tree_scopes() {
            // Unknown pseudo element always goes at the top of selector chain.
            let relation = shadow_relation(&new_specifier);
            let specifiers = self.floating.sink_floating_selector(specifiers);
            new_specifier.append_tag_history(relation, Box::new(specifiers));
            return new_specifier;
        }
        if new_specifier.is_content_pseudo_element() {
            let specifiers = self.floating.sink_floating_selector(specifiers);
            new_specifier.append_tag_history(Relation::SubSelector, Box::new(specifiers));
            return new_specifier;
        }
        let new_specifier = Box::new(self.floating.sink_floating_selector(new_specifier));
        if specifiers.crosses_tree_scopes() {
            // Specifiers for unknown pseudo element go right behind it in the chain.
            let relation = shadow_relation(&specifiers);
            specifiers.insert_tag_history(Relation::SubSelector, new_specifier, relation);
        } else if specifiers.is_content_pseudo_element() {
            specifiers.insert_tag_history(
                Relation::SubSelector,
                new_specifier,
                Relation::SubSelector,
            );
        } else {
            specifiers.append_tag_history(Relation::SubSelector, new_specifier);
        }
        specifiers
    }

    fn rewrite_specifiers_with_element_name(
        &mut self,
        prefix: Option<&str>,
        element_name: &str,
        mut specifiers: Floating<ParserSelector>,
        tag_is_implicit: bool,
    ) -> Result<Floating<ParserSelector>, ()> {
        let tag = self
            .namespaces
            .determine_name_in_namespace(prefix, element_name)
            .ok_or(())?;
        if specifiers.crosses_tree_scopes() {
            return Ok(rewrite_with_element_name_behind(
                tag,
                specifiers,
                tag_is_implicit,
                |selector| selector.crosses_tree_scopes() || selector.has_shadow_pseudo(),
                shadow_relation,
            ));
        }
        if specifiers.is_content_pseudo_element() {
            return Ok(rewrite_with_element_name_behind(
                tag,
                specifiers,
                tag_is_implicit,
                |selector| {
                    selector.is_content_pseudo_element()
                        || selector.relation_is_affected_by_pseudo_content()
                },
                |_| Relation::SubSelector,
            ));
        }
        // `*:host` never matches, so the `*` is kept to tell it from `:host`.
        if tag == QualifiedName::any() && !specifiers.has_host_pseudo_selector() {
            return Ok(specifiers);
        }
        if specifiers.pseudo_type() != PseudoType::Cue {
            specifiers.prepend_tag_selector(tag, tag_is_implicit);
        }
        Ok(specifiers)
    }

    fn rewrite_specifiers_with_namespace_if_needed(
        &mut self,
        specifiers: Floating<ParserSelector>,
    ) -> Result<Floating<ParserSelector>, ()> {
        if self.namespaces.default_namespace().is_some()
            || specifiers.crosses_tree_scopes()
            || specifiers.is_content_pseudo_element()
        {
            return self.rewrite_specifiers_with_element_name(None, "*", specifiers, true);
        }
        Ok(specifiers)
    }
}

/// Qualify the part of a compound that sits behind its last shadow-crossing
/// (or `::content`) selector with `tag`, creating that part if needed.
fn rewrite_with_element_name_behind(
    tag: QualifiedName,
    mut specifiers: Floating<ParserSelector>,
    tag_is_implicit: bool,
    is_boundary: impl Fn(&ParserSelector) -> bool,
    relation_for: impl Fn(&ParserSelector) -> Relation,
) -> Floating<ParserSelector> {
    let mut last = 0;
    let mut depth = 0;
    let mut history = specifiers.tag_history();
    while let Some(selector) = history {
        depth += 1;
        if is_boundary(selector) {
            last = depth;
        }
        history = selector.tag_history();
    }

    let is_any = tag == QualifiedName::any();
    specifiers.update_chain_node(last, move |boundary| {
        if let Some(tag_history) = boundary.tag_history_mut() {
            if !is_any {
                tag_history.prepend_tag_selector(tag, tag_is_implicit);
            }
            return;
        }
        // Matching goes through the boundary relation, so the type selector
        // is created even for `*`.
        let relation = relation_for(boundary);
        boundary.set_tag_history(Box::new(ParserSelector::with_tag(tag, tag_is_implicit)));
        boundary.set_relation(relation);
    });
    specifiers
}

/// `::slotted()` links to its host with its own relation.
fn shadow_relation(selector: &ParserSelector) -> Relation {
    if selector.pseudo_type() == PseudoType::Slotted {
        Relation::ShadowSlot
    } else {
        Relation::ShadowPseudo
    }
}

/// The combinator after a compound selector, or `None` at the end of a complex selector.
fn parse_combinator(input: &mut Input) -> Result<Option<Relation>, ()> {
    let start = input.state();
    let mut saw_whitespace = false;
    loop {
        let before = input.state();
        match input.next_including_whitespace() {
            Ok(Token::WhiteSpace) => saw_whitespace = true,
            Ok(Token::Delim('>')) => {
                let after = input.state();
                if input.next_including_whitespace() == Ok(Token::Delim('>'))
                    && input.next_including_whitespace() == Ok(Token::Delim('>'))
                {
                    return Ok(Some(Relation::ShadowPiercingDescendant));
                }
                input.reset(&after);
                return Ok(Some(Relation::Child));
            }
            Ok(Token::Delim('+')) => return Ok(Some(Relation::DirectAdjacent)),
            Ok(Token::Delim('~')) => return Ok(Some(Relation::IndirectAdjacent)),
            Ok(Token::Delim('/')) => {
                match input.next_including_whitespace() {
                    Ok(Token::Ident(ref name)) if name.eq_ignore_ascii_case("deep") => {}
                    _ => return Err(()),
                }
                if input.next_including_whitespace() != Ok(Token::Delim('/')) {
                    return Err(());
                }
                return Ok(Some(Relation::ShadowDeep));
            }
            Ok(ref token) if saw_whitespace && starts_compound_selector(token) => {
                input.reset(&before);
                return Ok(Some(Relation::Descendant));
            }
            _ => {
                input.reset(&start);
                return Ok(None);
            }
        }
    }
}

/// `url(...)`, `url("...")` or `"..."`, starting with the already consumed `token`.
fn parse_url_or_string(input: &mut Input, token: Token) -> Result<String, ParseErrorKind> {
    match token {
        Token::Url(url) | Token::QuotedString(url) => Ok(url.to_string()),
        Token::Function(ref name) if name.eq_ignore_ascii_case("url") => {
            let url = match input.next() {
                Ok(Token::QuotedString(url)) => url.to_string(),
                _ => return Err(ParseErrorKind::InvalidRule),
            };
            if input.next() != Ok(Token::CloseParenthesis) {
                return Err(ParseErrorKind::InvalidRule);
            }
            Ok(url)
        }
        _ => Err(ParseErrorKind::InvalidRule),
    }
}

fn parse_attribute_name(input: &mut Input) -> Result<String, ()> {
    match input.next_including_whitespace()? {
        Token::Ident(name) => Ok(name.to_string()),
        _ => Err(()),
    }
}

/// `from`, `to` and percentages between 0% and 100%, comma-separated.
fn parse_keyframe_keys(input: &mut Input) -> Result<Vec<f32>, ()> {
    let mut keys = Vec::new();
    loop {
        let key = match input.next()? {
            Token::Ident(ref name) => {
                match_ignore_ascii_case! { &name.to_str(),
                    "from" => 0.,
                    "to" => 1.,
                    _ => return Err(()),
                }
            }
            Token::Percentage(numeric) => {
                if !(0. ..=100.).contains(&numeric.value) {
                    return Err(());
                }
                (numeric.value / 100.) as f32
            }
            _ => return Err(()),
        };
        keys.push(key);
        let before = input.state();
        if input.next() != Ok(Token::Comma) {
            input.reset(&before);
            break;
        }
    }
    Ok(keys)
}

/// Property names are ASCII case-insensitive, custom properties excepted.
fn property_name(name: &ParserString) -> String {
    let name = name.to_string();
    if name.starts_with("--") {
        name
    } else {
        name.to_ascii_lowercase()
    }
}
