/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::borrow::Cow;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use super::{
    is_valid_name, is_valid_name_part, is_valid_name_start, parse_nth, parse_nth_string,
    serialize_identifier, serialize_string, CssParser, CssRule, FloatingKind, FloatingRegistry,
    LexMode, Match, Numeric, ParseError, ParserContext, ParserMode, ParserObserver,
    ParserSelector, ParserString, ParserValue, ParserValueList, PseudoType, QualifiedName,
    Relation, RuleKind, SourceBuffer, ToCss, Token, Tokenizer, ValueListError,
    MAX_NESTING_DEPTH,
};

macro_rules! JArray {
    ($($e: expr,)*) => { JArray![ $( $e ),* ] };
    ($($e: expr),*) => { Value::Array(vec!( $( json!($e) ),* )) }
}

fn almost_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (&Value::Number(ref a), &Value::Number(ref b)) => {
            let a = a.as_f64().unwrap();
            let b = b.as_f64().unwrap();
            (a - b).abs() <= a.abs() * 1e-6
        }

        (&Value::Bool(a), &Value::Bool(b)) => a == b,
        (&Value::String(ref a), &Value::String(ref b)) => a == b,
        (&Value::Array(ref a), &Value::Array(ref b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|(ref a, ref b)| almost_equals(*a, *b))
        }
        (&Value::Object(_), &Value::Object(_)) => panic!("Not implemented"),
        (&Value::Null, &Value::Null) => true,
        _ => false,
    }
}

fn print_json_diff(results: &Value, expected: &Value) {
    let results = serde_json::to_string_pretty(results).unwrap();
    let expected = serde_json::to_string_pretty(expected).unwrap();
    println!("{}", difference::Changeset::new(&results, &expected, "\n"));
}

fn assert_json_eq(results: Value, expected: Value, message: &str) {
    if !almost_equals(&results, &expected) {
        print_json_diff(&results, &expected);
        panic!("{}", message)
    }
}

fn run_raw_json_tests<F: Fn(Value, Value)>(json_data: &str, run: F) {
    let items = match serde_json::from_str(json_data) {
        Ok(Value::Array(items)) => items,
        other => panic!("Invalid JSON: {:?}", other),
    };
    assert!(items.len() % 2 == 0);
    let mut input = None;
    for item in items.into_iter() {
        match (&input, item) {
            (&None, json_obj) => input = Some(json_obj),
            (&Some(_), expected) => {
                let input = input.take().unwrap();
                run(input, expected)
            }
        };
    }
}

fn run_json_tests<F: Fn(&str) -> Value>(json_data: &str, parse: F) {
    run_raw_json_tests(json_data, |input, expected| match input {
        Value::String(input) => {
            let result = parse(&input);
            assert_json_eq(result, expected, &input);
        }
        _ => panic!("Unexpected JSON"),
    });
}

fn numeric_type(numeric: &Numeric) -> &'static str {
    if numeric.int_value.is_some() {
        "integer"
    } else {
        "number"
    }
}

fn token_to_json(token: &Token) -> Value {
    match *token {
        Token::Ident(ref value) => JArray!["ident", value.to_string()],
        Token::AtKeyword(ref value) => JArray!["at-keyword", value.to_string()],
        Token::Hash(ref value) => JArray!["hash", value.to_string(), "unrestricted"],
        Token::IdHash(ref value) => JArray!["hash", value.to_string(), "id"],
        Token::QuotedString(ref value) => JArray!["string", value.to_string()],
        Token::Url(ref value) => JArray!["url", value.to_string()],
        Token::Function(ref name) => JArray!["function", name.to_string()],
        Token::Delim('\\') => "\\".into(),
        Token::Delim(value) => value.to_string().into(),

        Token::Number(ref n) => JArray!["number", n.value, numeric_type(n)],
        Token::Percentage(ref n) => JArray!["percentage", n.value, numeric_type(n)],
        Token::Dimension(ref n, unit) => {
            JArray!["dimension", n.value, numeric_type(n), unit.as_str()]
        }
        Token::UnknownDimension(ref n, ref unit) => {
            JArray!["unknown-dimension", n.value, numeric_type(n), unit.to_string()]
        }
        Token::UnicodeRange(start, end) => JArray!["unicode-range", start, end],
        Token::Nth(ref value) => JArray!["nth", value.to_string()],

        Token::WhiteSpace => " ".into(),
        Token::Colon => ":".into(),
        Token::Semicolon => ";".into(),
        Token::Comma => ",".into(),
        Token::IncludeMatch => "~=".into(),
        Token::DashMatch => "|=".into(),
        Token::PrefixMatch => "^=".into(),
        Token::SuffixMatch => "$=".into(),
        Token::SubstringMatch => "*=".into(),
        Token::CDO => "<!--".into(),
        Token::CDC => "-->".into(),
        Token::Important => "!important".into(),

        Token::ParenthesisBlock => "(".into(),
        Token::SquareBracketBlock => "[".into(),
        Token::CurlyBracketBlock => "{".into(),
        Token::CloseParenthesis => ")".into(),
        Token::CloseSquareBracket => "]".into(),
        Token::CloseCurlyBracket => "}".into(),

        Token::BadUrl => JArray!["error", "bad-url"],
        Token::BadString => JArray!["error", "bad-string"],

        Token::MediaAnd => JArray!["media", "and"],
        Token::MediaNot => JArray!["media", "not"],
        Token::MediaOnly => JArray!["media", "only"],
        Token::MediaOr => JArray!["media", "or"],
        Token::SupportsAnd => JArray!["supports", "and"],
        Token::SupportsNot => JArray!["supports", "not"],
        Token::SupportsOr => JArray!["supports", "or"],
    }
}

fn tokens_to_json(source: &SourceBuffer, mode: LexMode) -> Value {
    let mut tokenizer = Tokenizer::new(source);
    let mut tokens = Vec::new();
    while let Ok(token) = tokenizer.next(mode) {
        tokens.push(token_to_json(&token));
    }
    Value::Array(tokens)
}

fn css_or_null<T: ToCss>(value: Option<T>) -> Value {
    match value {
        Some(value) => value.to_css_string().into(),
        None => Value::Null,
    }
}

#[test]
fn tokens() {
    run_json_tests(include_str!("css-parsing-tests/tokens.json"), |input| {
        tokens_to_json(&SourceBuffer::new(input), LexMode::Normal)
    });
}

#[test]
fn tokens_in_media_query_mode() {
    let source = SourceBuffer::new("only screen and (color), not print or tv");
    assert_json_eq(
        tokens_to_json(&source, LexMode::MediaQuery),
        json!([
            ["media", "only"], " ", ["ident", "screen"], " ", ["media", "and"], " ",
            "(", ["ident", "color"], ")", ",", " ",
            ["media", "not"], " ", ["ident", "print"], " ", ["media", "or"], " ", ["ident", "tv"]
        ]),
        "media query mode",
    );
    assert_json_eq(
        tokens_to_json(&source, LexMode::Normal),
        json!([
            ["ident", "only"], " ", ["ident", "screen"], " ", ["ident", "and"], " ",
            "(", ["ident", "color"], ")", ",", " ",
            ["ident", "not"], " ", ["ident", "print"], " ", ["ident", "or"], " ", ["ident", "tv"]
        ]),
        "keywords are identifiers in normal mode",
    );
}

#[test]
fn tokens_in_supports_mode() {
    let source = SourceBuffer::new("not (a) OR (b) and (c)");
    assert_json_eq(
        tokens_to_json(&source, LexMode::Supports),
        json!([
            ["supports", "not"], " ", "(", ["ident", "a"], ")", " ",
            ["supports", "or"], " ", "(", ["ident", "b"], ")", " ",
            ["supports", "and"], " ", "(", ["ident", "c"], ")"
        ]),
        "supports mode",
    );
}

#[test]
fn tokens_in_nth_child_mode() {
    let expectations = [
        ("2n + 1", json!([["nth", "2n + 1"]])),
        ("-n+3)", json!([["nth", "-n+3"], ")"])),
        ("2n+", json!([["nth", "2n"], "+"])),
        ("odd", json!([["ident", "odd"]])),
        ("none", json!([["ident", "none"]])),
        ("5", json!([["number", 5, "integer"]])),
    ];
    for &(input, ref expected) in expectations.iter() {
        let source = SourceBuffer::new(input);
        assert_json_eq(
            tokens_to_json(&source, LexMode::NthChild),
            expected.clone(),
            input,
        );
    }
}

#[test]
fn nth() {
    run_json_tests(include_str!("css-parsing-tests/nth.json"), |input| {
        let source = SourceBuffer::new(input);
        let mut tokenizer = Tokenizer::new(&source);
        let mut next = || loop {
            match tokenizer.next(LexMode::NthChild) {
                Ok(Token::WhiteSpace) => continue,
                result => return result,
            }
        };
        let result = match next() {
            Ok(token) => parse_nth(&token).ok(),
            Err(()) => None,
        };
        match result {
            Some((a, b)) if next().is_err() => json!([a, b]),
            _ => Value::Null,
        }
    });
}

#[test]
fn nth_string() {
    assert_eq!(parse_nth_string("  2n+1  "), Ok((2, 1)));
    assert_eq!(parse_nth_string("-n - 2"), Ok((-1, -2)));
    assert_eq!(parse_nth_string("99999999999n"), Ok((i32::MAX, 0)));
    assert_eq!(parse_nth_string("2n 1"), Err(()));
    assert_eq!(parse_nth_string("n-"), Err(()));
    assert_eq!(parse_nth_string("2"), Err(()));
}

#[test]
fn identifiers_borrow_unless_escaped() {
    let source = SourceBuffer::new("plain a\\62 c");
    let mut tokenizer = Tokenizer::new(&source);
    match tokenizer.next(LexMode::Normal) {
        Ok(Token::Ident(ParserString::Narrow(Cow::Borrowed(value)))) => {
            assert_eq!(value, &b"plain"[..])
        }
        other => panic!("expected a borrowed identifier, got {:?}", other),
    }
    assert_eq!(tokenizer.next(LexMode::Normal), Ok(Token::WhiteSpace));
    match tokenizer.next(LexMode::Normal) {
        Ok(Token::Ident(ParserString::Narrow(Cow::Owned(value)))) => {
            assert_eq!(value, b"abc".to_vec())
        }
        other => panic!("expected an owned identifier, got {:?}", other),
    }
}

#[test]
fn escapes_widen_narrow_strings() {
    let source = SourceBuffer::new("a\\2603 b \\e9");
    assert!(source.is_8bit());
    let mut tokenizer = Tokenizer::new(&source);
    let snowman = match tokenizer.next(LexMode::Normal) {
        Ok(Token::Ident(value)) => value,
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(snowman, "a\u{2603}b");
    assert!(!snowman.is_8bit());

    assert_eq!(tokenizer.next(LexMode::Normal), Ok(Token::WhiteSpace));
    let accented = match tokenizer.next(LexMode::Normal) {
        Ok(Token::Ident(value)) => value,
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(accented, "\u{e9}");
    assert!(accented.is_8bit());
}

#[test]
fn source_buffer_width() {
    assert!(SourceBuffer::new("caf\u{e9}").is_8bit());
    assert!(!SourceBuffer::new("\u{2603}").is_8bit());
    assert!(!SourceBuffer::with_padding("@x ", "a", "\u{2603}").is_8bit());
    assert_eq!(SourceBuffer::with_padding("ab", "cd", "e").len(), 5);
    assert_eq!(SourceBuffer::new("\u{1F600}").len(), 2);
}

#[test]
fn wide_source() {
    let units: Vec<u16> = "x \u{2603}y".encode_utf16().collect();
    let source = SourceBuffer::from_utf16(&units);
    assert!(!source.is_8bit());
    assert_json_eq(
        tokens_to_json(&source, LexMode::Normal),
        json!([["ident", "x"], " ", ["ident", "\u{2603}y"]]),
        "UTF-16 input",
    );

    let mut tokenizer = Tokenizer::new(&source);
    match tokenizer.next(LexMode::Normal) {
        Ok(Token::Ident(ParserString::Wide(Cow::Borrowed(_)))) => {}
        other => panic!("expected a borrowed wide identifier, got {:?}", other),
    }
}

#[test]
fn latin1_source() {
    let source = SourceBuffer::from_latin1(b"caf\xe9 10px");
    assert_json_eq(
        tokens_to_json(&source, LexMode::Normal),
        json!([["ident", "caf\u{e9}"], " ", ["dimension", 10, "integer", "px"]]),
        "Latin-1 input",
    );
}

#[test]
fn tokenizer_state_and_locations() {
    let source = SourceBuffer::new("a\n  b\r\nc");
    let mut tokenizer = Tokenizer::with_first_line(&source, 5);
    assert_eq!(tokenizer.next(LexMode::Normal), Ok(Token::Ident("a".into())));
    let state = tokenizer.state();
    assert_eq!(tokenizer.next(LexMode::Normal), Ok(Token::WhiteSpace));
    assert_eq!(tokenizer.next(LexMode::Normal), Ok(Token::Ident("b".into())));
    let location = tokenizer.source_location(tokenizer.token_start());
    assert_eq!((location.line, location.column), (6, 3));

    tokenizer.reset(&state);
    assert_eq!(tokenizer.position(), state.position());
    assert_eq!(tokenizer.next(LexMode::Normal), Ok(Token::WhiteSpace));
    assert_eq!(tokenizer.next(LexMode::Normal), Ok(Token::Ident("b".into())));
    assert_eq!(tokenizer.next(LexMode::Normal), Ok(Token::WhiteSpace));
    assert_eq!(tokenizer.next(LexMode::Normal), Ok(Token::Ident("c".into())));
    let location = tokenizer.current_source_location();
    assert_eq!((location.line, location.column), (7, 2));
    assert_eq!(tokenizer.next(LexMode::Normal), Err(()));
}

#[test]
fn locations_skip_the_padding() {
    let source = SourceBuffer::with_padding("@-internal-value ", "x y", "");
    let tokenizer = Tokenizer::new(&source);
    let location = tokenizer.source_location(source.text_start());
    assert_eq!((location.line, location.column), (1, 1));
    assert_eq!(source.text_offset(source.text_start()), 0);
    assert_eq!(source.text_offset(source.text_end()), 3);
}

#[test]
fn peek_lengths() {
    let source = SourceBuffer::new("ab\\.c-d(");
    let tokenizer = Tokenizer::new(&source);
    assert_eq!(tokenizer.peek_max_identifier_len(), 7);
    let source = SourceBuffer::new("abc\" tail");
    let tokenizer = Tokenizer::new(&source);
    assert_eq!(tokenizer.peek_max_string_len('"'), 3);
    let source = SourceBuffer::new("a.png) b");
    let tokenizer = Tokenizer::new(&source);
    assert_eq!(tokenizer.peek_max_uri_len(), 5);
}

fn ident(name: &str) -> ParserValue<'static> {
    ParserValue::Ident(name.into())
}

#[test]
fn value_list_cursor() {
    let mut list = ParserValueList::new();
    assert_eq!(list.current(), None);
    assert_eq!(list.previous(), None);
    list.add_value(ident("a"));
    list.add_value(ident("b"));
    list.add_value(ident("c"));

    assert_eq!(list.current_index(), 0);
    assert_eq!(list.current(), Some(&ident("a")));
    assert_eq!(list.next(), Some(&ident("b")));
    assert_eq!(list.next(), Some(&ident("c")));
    assert_eq!(list.next(), None);
    assert_eq!(list.current_index(), 3);
    assert_eq!(list.next(), None);
    assert_eq!(list.current_index(), 3);
    assert_eq!(list.previous(), Some(&ident("c")));

    assert_eq!(
        list.set_current_index(3),
        Err(ValueListError::IndexOutOfBounds { index: 3, len: 3 })
    );
    assert_eq!(list.set_current_index(1), Ok(()));
    assert_eq!(list.current(), Some(&ident("b")));
}

#[test]
fn value_list_edits_keep_the_cursor() {
    let mut list = ParserValueList::new();
    list.add_value(ident("a"));
    list.add_value(ident("b"));
    list.add_value(ident("c"));
    list.set_current_index(1).unwrap();

    list.insert_value_at(0, ident("x")).unwrap();
    assert_eq!(list.current_index(), 2);
    assert_eq!(list.current(), Some(&ident("b")));

    list.insert_value_at(4, ident("z")).unwrap();
    assert_eq!(list.current(), Some(&ident("b")));
    assert_eq!(
        list.insert_value_at(9, ident("y")),
        Err(ValueListError::IndexOutOfBounds { index: 9, len: 5 })
    );

    assert_eq!(list.delete_value_at(2), Ok(ident("b")));
    assert_eq!(list.current(), Some(&ident("c")));
    assert_eq!(list.delete_value_at(0), Ok(ident("x")));
    assert_eq!(list.current_index(), 1);
    assert_eq!(list.current(), Some(&ident("c")));
    assert_eq!(
        list.delete_value_at(3),
        Err(ValueListError::IndexOutOfBounds { index: 3, len: 3 })
    );
    assert_eq!(list.to_css_string(), "a c z");
}

#[test]
fn value_list_ownership_transfers() {
    let mut list = ParserValueList::new();
    list.add_value(ident("a"));
    let mut other = ParserValueList::new();
    other.add_value(ParserValue::Operator(','));
    other.add_value(ident("b"));
    other.next();

    list.steal_values(&mut other);
    assert!(other.is_empty());
    assert_eq!(other.current_index(), 0);
    assert_eq!(list.len(), 3);
    assert_eq!(list.to_css_string(), "a, b");

    let values = list.release_values();
    assert_eq!(values.len(), 3);
    assert!(list.is_empty());
    assert_eq!(list.current_index(), 0);

    list.add_value(ident("d"));
    list.destroy_and_clear();
    assert!(list.is_empty());
}

#[test]
fn value_serialization() {
    run_json_tests(include_str!("css-parsing-tests/values.json"), |input| {
        let mut parser = CssParser::new(ParserContext::default());
        let result = css_or_null(parser.parse_value(input));
        assert_eq!(parser.floating().live_count(), 0);
        result
    });
}

#[test]
fn value_structure() {
    let mut parser = CssParser::new(ParserContext::default());
    let list = parser.parse_value("rgb(1, 2 3) (a) [b]").unwrap();
    let values: Vec<&ParserValue> = list.iter().collect();
    assert_eq!(values.len(), 5);
    match *values[0] {
        ParserValue::Function(ref function) => {
            assert_eq!(function.name, "rgb");
            assert_eq!(function.args.len(), 4);
            assert!(function.args.value_at(1).unwrap().is_operator(','));
        }
        ref other => panic!("unexpected {:?}", other),
    }
    assert!(values[1].is_operator('('));
    assert_eq!(*values[2], ident("a"));
    assert!(values[3].is_operator(')'));
    match *values[4] {
        ParserValue::ValueList(ref nested) => assert_eq!(nested.to_css_string(), "b"),
        ref other => panic!("unexpected {:?}", other),
    }

    let list = parser.parse_value("10weird 2em 3").unwrap();
    match *list.value_at(0).unwrap() {
        ParserValue::DimensionList(ref numeric, ref unit) => {
            assert_eq!(numeric.int_value, Some(10));
            assert_eq!(*unit, "weird");
        }
        ref other => panic!("unexpected {:?}", other),
    }
    assert_eq!(list.value_at(1).unwrap().numeric().map(|n| n.value), Some(2.));
    assert_eq!(list.value_at(2).unwrap().numeric().map(|n| n.int_value), Some(Some(3)));
    assert_eq!(list.value_at(3), None);
}

#[test]
fn non_finite_numbers_are_stored_as_zero() {
    let infinite = Numeric {
        value: f64::INFINITY,
        int_value: None,
        has_sign: false,
    };
    assert_eq!(ParserValue::number(infinite).numeric().unwrap().value, 0.);
    let huge = SourceBuffer::new("1e500");
    let mut tokenizer = Tokenizer::new(&huge);
    match tokenizer.next(LexMode::Normal) {
        Ok(Token::Number(numeric)) => assert_eq!(numeric.value, f32::MAX as f64),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn declaration_list() {
    let mut parser = CssParser::new(ParserContext::default());
    let declarations = parser
        .parse_declaration_list("color: red; width: 10px !important; bogus; --Custom: 1; ;");
    let serialized: Vec<String> = declarations.iter().map(ToCss::to_css_string).collect();
    assert_eq!(
        serialized,
        vec!["color: red", "width: 10px !important", "--Custom: 1"]
    );
    assert!(declarations[1].important);
    assert_eq!(declarations[2].name, "--Custom");
}

fn class(name: &str) -> ParserSelector {
    let mut selector = ParserSelector::new();
    selector.set_match(Match::Class);
    selector.set_value(name);
    selector
}

#[test]
fn insert_tag_history_splices() {
    let mut y = class("y");
    y.set_tag_history(Box::new(class("z")));
    y.insert_tag_history(Relation::Child, Box::new(class("w")), Relation::Descendant);

    assert_eq!(y.selector().relation(), Relation::Child);
    let w = y.tag_history().unwrap();
    assert_eq!(w.selector().value(), Some("w"));
    assert_eq!(w.selector().relation(), Relation::Descendant);
    let z = w.tag_history().unwrap();
    assert_eq!(z.selector().value(), Some("z"));
    assert!(z.tag_history().is_none());

    // Without a tag history the inserted selector ends the chain.
    let mut a = class("a");
    a.insert_tag_history(Relation::SubSelector, Box::new(class("b")), Relation::Child);
    let b = a.tag_history().unwrap();
    assert_eq!(b.selector().relation(), Relation::Child);
    assert!(b.tag_history().is_none());
}

#[test]
fn append_and_prepend() {
    let mut y = class("y");
    y.set_tag_history(Box::new(class("z")));
    y.append_tag_history(Relation::IndirectAdjacent, Box::new(class("w")));
    let z = y.tag_history().unwrap();
    assert_eq!(z.selector().relation(), Relation::IndirectAdjacent);
    assert_eq!(z.tag_history().unwrap().selector().value(), Some("w"));

    let mut compound = class("a");
    compound.set_relation(Relation::Child);
    compound.prepend_tag_selector(QualifiedName::new(None, "div", None), false);
    assert_eq!(compound.selector().match_type(), Match::Tag);
    assert_eq!(compound.selector().relation(), Relation::SubSelector);
    let moved = compound.tag_history().unwrap();
    assert_eq!(moved.selector().value(), Some("a"));
    assert_eq!(moved.selector().relation(), Relation::Child);
    assert_eq!(compound.into_complex_selector().selector_text(), "div.a");

    let mut released = class("p");
    released.set_tag_history(Box::new(class("q")));
    assert_eq!(released.release_tag_history().unwrap().selector().value(), Some("q"));
    assert!(released.tag_history().is_none());
    assert_eq!(released.release_selector().value(), Some("p"));
}

#[test]
fn parser_selector_queries() {
    assert!(class("a").is_simple());

    let mut qualified = ParserSelector::with_tag(QualifiedName::new(None, "div", None), false);
    qualified.set_tag_history(Box::new(class("a")));
    assert!(!qualified.is_simple());

    let mut universal = ParserSelector::with_tag(QualifiedName::any(), true);
    universal.set_tag_history(Box::new(class("a")));
    assert!(universal.is_simple());

    let mut custom = ParserSelector::new();
    custom.set_match(Match::PseudoElement);
    custom.update_pseudo_type("-webkit-progress-bar", false);
    assert_eq!(custom.pseudo_type(), PseudoType::WebKitCustomElement);
    assert!(custom.is_custom_pseudo_element());
    assert!(custom.crosses_tree_scopes());
    assert!(!custom.is_simple());

    let mut content = ParserSelector::new();
    content.set_match(Match::PseudoElement);
    content.update_pseudo_type("content", false);
    assert!(content.is_content_pseudo_element());
    assert!(!content.crosses_tree_scopes());

    let mut host = ParserSelector::new();
    host.set_match(Match::PseudoClass);
    host.update_pseudo_type("host", false);
    let mut chain = class("a");
    chain.set_tag_history(Box::new(host));
    assert!(chain.has_host_pseudo_selector());
    assert!(!class("a").has_host_pseudo_selector());

    // A pseudo-element name used as a pseudo-class is unknown.
    let mut misused = ParserSelector::new();
    misused.set_match(Match::PseudoClass);
    misused.update_pseudo_type("selection", false);
    assert_eq!(misused.pseudo_type(), PseudoType::Unknown);

    // The CSS 2 pseudo-elements accept a single colon.
    let mut legacy = ParserSelector::new();
    legacy.set_match(Match::PseudoClass);
    legacy.update_pseudo_type("first-line", false);
    assert_eq!(legacy.selector().match_type(), Match::PseudoElement);
    assert_eq!(legacy.pseudo_type(), PseudoType::FirstLine);
}

#[test]
fn selectors() {
    run_json_tests(include_str!("css-parsing-tests/selectors.json"), |input| {
        let mut parser = CssParser::new(ParserContext::default());
        let result = match parser.parse_selector(input) {
            Some(list) => {
                let specificities: Vec<u32> = list.iter().map(|c| c.specificity()).collect();
                json!([list.selectors_text(), specificities])
            }
            None => Value::Null,
        };
        assert_eq!(parser.floating().live_count(), 0);
        result
    });
}

#[test]
fn complex_selector_structure() {
    let mut parser = CssParser::new(ParserContext::default());
    let list = parser.parse_selector("div > p").unwrap();
    let complex = list.first().unwrap();
    let components = complex.components();
    assert_eq!(components.len(), 2);
    assert_eq!(components[0].tag().unwrap().local_name, "p");
    assert_eq!(components[0].relation(), Relation::Child);
    assert_eq!(components[1].tag().unwrap().local_name, "div");
    assert!(!complex.is_compound());

    let list = parser.parse_selector("a::-webkit-foo").unwrap();
    let components = list.first().unwrap().components();
    assert_eq!(components[0].pseudo_type(), PseudoType::WebKitCustomElement);
    assert_eq!(components[0].relation(), Relation::ShadowPseudo);
    assert_eq!(components[1].tag().unwrap().local_name, "a");
    assert!(list.first().unwrap().matches_pseudo_element());

    let list = parser.parse_selector("::slotted(span)").unwrap();
    let complex = list.first().unwrap();
    assert_eq!(complex.components()[0].relation(), Relation::ShadowSlot);
    assert!(complex.components()[1].tag_is_implicit());
    assert!(complex.has_slotted_pseudo());

    let list = parser.parse_selector("a /deep/ b").unwrap();
    assert!(list.first().unwrap().has_deep_combinator_or_shadow_pseudo());

    let list = parser.parse_selector(":-webkit-any(a, .b)").unwrap();
    let any = &list.first().unwrap().components()[0];
    assert_eq!(any.pseudo_type(), PseudoType::Any);
    assert_eq!(any.selector_list().unwrap().len(), 2);

    let list = parser.parse_selector("p:lang(fr)").unwrap();
    assert_eq!(list.first().unwrap().components()[1].argument(), Some("fr"));
    assert_eq!(list.selectors_text(), "p:lang(fr)");
}

#[test]
fn content_pseudo_element() {
    let mut parser = CssParser::new(ParserContext::default());
    let list = parser.parse_selector("div::content p").unwrap();
    let complex = list.first().unwrap();
    assert!(complex.has_content_pseudo());
    let components = complex.components();
    assert_eq!(components[0].tag().unwrap().local_name, "p");
    assert!(components[0].relation_is_affected_by_pseudo_content());
    assert_eq!(components[1].pseudo_type(), PseudoType::Content);
}

#[test]
fn match_nth() {
    let mut parser = CssParser::new(ParserContext::default());
    let list = parser.parse_selector(":nth-child(-n+3)").unwrap();
    let selector = &list.first().unwrap().components()[0];
    assert_eq!(selector.nth(), (-1, 3));
    assert!(selector.match_nth(1));
    assert!(selector.match_nth(3));
    assert!(!selector.match_nth(4));

    let list = parser.parse_selector(":nth-of-type(2n+1)").unwrap();
    let selector = &list.first().unwrap().components()[0];
    assert!(selector.match_nth(1));
    assert!(!selector.match_nth(2));
    assert!(selector.match_nth(5));

    // Offsets saturate to the i32 range. Matching at the extremes must not overflow.
    let list = parser.parse_selector(":nth-child(2n-99999999999)").unwrap();
    let selector = &list.first().unwrap().components()[0];
    assert_eq!(selector.nth(), (2, -i32::MAX));
    assert!(selector.match_nth(1));
    assert!(!selector.match_nth(2));
    assert!(selector.match_nth(i32::MAX));
    assert!(!selector.match_nth(-i32::MAX - 1));

    let list = parser.parse_selector(":nth-last-child(-n+99999999999)").unwrap();
    let selector = &list.first().unwrap().components()[0];
    assert_eq!(selector.nth(), (-1, i32::MAX));
    assert!(selector.match_nth(1));
    assert!(selector.match_nth(i32::MAX));
    assert!(selector.match_nth(-1));

    let list = parser.parse_selector(":nth-of-type(-99999999999n+5)").unwrap();
    let selector = &list.first().unwrap().components()[0];
    assert_eq!(selector.nth(), (-i32::MAX, 5));
    assert!(selector.match_nth(5));
    assert!(!selector.match_nth(4));
    assert!(!selector.match_nth(i32::MIN));
}

#[test]
fn selector_modes() {
    let mut quirks = CssParser::new(ParserContext::new(ParserMode::HtmlQuirks));
    assert_eq!(
        quirks.parse_selector("#Foo.BAR").unwrap().selectors_text(),
        "#foo.bar"
    );
    let mut standard = CssParser::new(ParserContext::default());
    assert_eq!(
        standard.parse_selector("#Foo.BAR").unwrap().selectors_text(),
        "#Foo.BAR"
    );

    assert!(standard.parse_selector("::-internal-foo").is_none());
    let mut ua = CssParser::new(ParserContext::new(ParserMode::UserAgentSheet));
    assert!(ua.parse_selector("::-internal-foo").is_some());

    let mut xml = CssParser::new(ParserContext {
        is_html_document: false,
        ..ParserContext::default()
    });
    assert_eq!(xml.parse_selector("Svg").unwrap().selectors_text(), "Svg");
}

#[test]
fn namespaces() {
    let mut parser = CssParser::new(ParserContext::default());
    assert!(parser.parse_selector("svg|rect").is_none());

    let sheet = parser.parse_sheet(
        "@namespace url(http://www.w3.org/1999/xhtml);\n\
         @namespace svg url(http://www.w3.org/2000/svg);",
        1,
    );
    assert_eq!(sheet.rules.len(), 2);
    assert_eq!(
        parser.namespaces().namespace_for_prefix("svg"),
        Some("http://www.w3.org/2000/svg")
    );

    let list = parser.parse_selector("svg|rect").unwrap();
    let tag = list.first().unwrap().components()[0].tag().unwrap().clone();
    assert_eq!(
        tag,
        QualifiedName::new(Some("svg"), "rect", Some("http://www.w3.org/2000/svg"))
    );

    // The default namespace qualifies selectors without a type selector.
    let list = parser.parse_selector(".a").unwrap();
    let components = list.first().unwrap().components();
    assert_eq!(components.len(), 2);
    assert!(components[0].tag_is_implicit());
    assert_eq!(
        components[0].tag().unwrap().namespace.as_deref(),
        Some("http://www.w3.org/1999/xhtml")
    );
    assert_eq!(list.selectors_text(), ".a");

    // Attributes without a prefix are in no namespace.
    let list = parser.parse_selector("[href]").unwrap();
    let attribute = list.first().unwrap().components()[1].attribute().unwrap();
    assert_eq!(attribute.namespace.as_deref(), Some(""));

    parser.namespaces_mut().add(Some("x"), "urn:x");
    assert!(parser.parse_selector("x|a").is_some());
}

#[test]
fn media_queries() {
    run_json_tests(include_str!("css-parsing-tests/media_queries.json"), |input| {
        let mut parser = CssParser::new(ParserContext::default());
        let result = parser.parse_media_query_list(input).to_css_string();
        assert_eq!(parser.floating().live_count(), 0);
        result.into()
    });
}

#[test]
fn supports_conditions() {
    let expectations = [
        ("(display: flex)", json!("(display: flex)")),
        (
            "(display: flex) and (not (display: grid))",
            json!("(display: flex) and (not (display: grid))"),
        ),
        ("(a: b) OR (c: d)", json!("(a: b) or (c: d)")),
        ("not (a: b)", json!("not (a: b)")),
        ("((a: b))", json!("(a: b)")),
        ("(a: b !important)", json!("(a: b !important)")),
        ("(a: b) and (c: d) or (e: f)", Value::Null),
        ("a: b", Value::Null),
        ("(a: b) and", Value::Null),
        ("(a)", Value::Null),
    ];
    for &(input, ref expected) in expectations.iter() {
        let mut parser = CssParser::new(ParserContext::default());
        let result = css_or_null(parser.parse_supports_condition(input));
        assert_json_eq(result, expected.clone(), input);
    }
}

#[test]
fn stylesheets() {
    run_json_tests(include_str!("css-parsing-tests/stylesheets.json"), |input| {
        let mut parser = CssParser::new(ParserContext::default());
        let sheet = parser.parse_sheet(input, 1);
        assert_eq!(parser.floating().live_count(), 0);
        Value::Array(
            sheet
                .rules
                .iter()
                .map(|rule| rule.to_css_string().into())
                .collect(),
        )
    });
}

#[test]
fn viewport_rules_when_enabled() {
    let mut parser = CssParser::new(ParserContext {
        viewport_rules_enabled: true,
        ..ParserContext::default()
    });
    let sheet = parser.parse_sheet("@viewport { width: 100px }", 1);
    assert_eq!(sheet.to_css_string(), "@viewport { width: 100px; }");
}

#[test]
fn single_rule() {
    let mut parser = CssParser::new(ParserContext::default());
    match parser.parse_rule(" a { b: c } ") {
        Some(CssRule::Style(rule)) => {
            assert_eq!(rule.selectors.selectors_text(), "a");
            assert_eq!(rule.declarations.len(), 1);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(parser.parse_rule("a {} b {}").is_none());
    assert!(parser.parse_rule("").is_none());
    assert!(matches!(
        parser.parse_rule("@media print { a { b: c } }"),
        Some(CssRule::Media(_))
    ));
    // The internal at-keywords only select a production from the padding.
    assert!(parser.parse_value("@-internal-value red").is_none());
}

#[test]
fn keyframes() {
    let mut parser = CssParser::new(ParserContext::default());
    assert_eq!(parser.parse_keyframe_key_list("from, 50%, to"), Some(vec![0., 0.5, 1.]));
    assert_eq!(parser.parse_keyframe_key_list("101%"), None);
    assert_eq!(parser.parse_keyframe_key_list("50% x"), None);
    assert_eq!(parser.parse_keyframe_key_list("from,"), None);

    let keyframe = parser.parse_keyframe_rule("0%, 100% { opacity: 1 }").unwrap();
    assert_eq!(keyframe.keys, vec![0., 1.]);
    assert_eq!(keyframe.to_css_string(), "0%, 100% { opacity: 1; }");
    assert!(parser.parse_keyframe_rule("50% { a: b } x").is_none());
    assert!(parser.parse_keyframe_rule("middle { a: b }").is_none());
}

#[test]
fn malformed_input_leaves_nothing_floating() {
    let inputs = [
        "a > { }",
        "a:not( { }",
        "a { b: calc(1px + ; c: d }",
        "@media screen and ( { a { } }",
        "@media (min-width: { }",
        "@supports (a: b) and { }",
        "@keyframes k { 10% { a: b } 200% { } from, { } }",
        "@page :nope { }",
        "[a= { }",
        ":nth-child(2n+ { }",
        "::slotted( { }",
        "a { b: [c (d }",
        ")]} a { }",
        "@import url(",
        "\"unterminated",
    ];
    let mut parser = CssParser::new(ParserContext::default());
    for input in inputs.iter() {
        parser.parse_sheet(input, 1);
        assert_eq!(parser.floating().live_count(), 0, "{}", input);
        parser.parse_value(input);
        parser.parse_selector(input);
        parser.parse_media_query_list(input);
        parser.parse_supports_condition(input);
        parser.parse_declaration_list(input);
        assert_eq!(parser.floating().live_count(), 0, "{}", input);
    }
}

#[test]
fn floating_registry() {
    let registry = FloatingRegistry::new();
    let selector = registry.create_floating_selector();
    let list = registry.create_floating_value_list();
    assert_eq!(registry.live_count(), 2);
    assert_eq!(registry.live_count_of(FloatingKind::Selector), 1);
    assert_eq!(list.kind(), FloatingKind::ValueList);

    drop(list);
    assert_eq!(registry.live_count(), 1);
    assert_eq!(registry.live_count_of(FloatingKind::ValueList), 0);

    let mut selector = registry.sink_floating_selector(selector);
    assert_eq!(registry.live_count(), 0);

    let mut vector = registry.create_floating_selector_vector();
    selector.set_match(Match::Id);
    selector.set_value("x");
    vector.push(selector);
    let shared = registry.clone();
    assert_eq!(shared.live_count(), 1);
    let mut vector = shared.sink_floating_selector_vector(vector);
    assert_eq!(registry.live_count(), 0);
    assert_eq!(vector.len(), 1);

    let list = super::SelectorList::adopt_selector_vector(&mut vector);
    assert!(vector.is_empty());
    assert_eq!(list.selectors_text(), "#x");
}

#[derive(Default)]
struct Recorder {
    events: Vec<Value>,
    errors: Vec<Value>,
}

impl ParserObserver for Recorder {
    fn start_rule(&mut self, kind: RuleKind, offset: usize) {
        self.events.push(json!(["start_rule", format!("{:?}", kind), offset]));
    }

    fn end_rule(&mut self, offset: usize) {
        self.events.push(json!(["end_rule", offset]));
    }

    fn start_selector(&mut self, offset: usize) {
        self.events.push(json!(["start_selector", offset]));
    }

    fn end_selector(&mut self, offset: usize) {
        self.events.push(json!(["end_selector", offset]));
    }

    fn start_property(&mut self, offset: usize) {
        self.events.push(json!(["start_property", offset]));
    }

    fn end_property(&mut self, important: bool, is_parsed: bool, offset: usize) {
        self.events.push(json!(["end_property", important, is_parsed, offset]));
    }

    fn report_error(&mut self, error: &ParseError) {
        self.errors.push(json!([
            error.kind.to_string(),
            error.location.line,
            error.location.column,
            error.offset
        ]));
    }
}

#[test]
fn observer_events() {
    let mut recorder = Recorder::default();
    {
        let mut parser = CssParser::with_observer(ParserContext::default(), &mut recorder);
        parser.parse_sheet("a { b: c }", 1);
    }
    assert_json_eq(
        Value::Array(recorder.events),
        json!([
            ["start_rule", "Style", 0],
            ["start_selector", 0],
            ["end_selector", 1],
            ["start_property", 4],
            ["end_property", false, true, 8],
            ["end_rule", 10]
        ]),
        "events for a style rule",
    );
    assert!(recorder.errors.is_empty());
}

#[test]
fn observer_errors() {
    let mut recorder = Recorder::default();
    let sheet = {
        let mut parser = CssParser::with_observer(ParserContext::default(), &mut recorder);
        parser.parse_sheet("p { color }\n@unknown x;\n} q { }", 1)
    };
    assert_eq!(sheet.rules.len(), 2);
    assert_json_eq(
        Value::Array(recorder.errors),
        json!([
            ["invalid declaration", 1, 5, 4],
            ["unknown at-rule @unknown", 2, 1, 12],
            ["unexpected token", 3, 1, 24]
        ]),
        "errors",
    );

    // Offsets and locations are relative to the caller's text, not the padding.
    let mut recorder = Recorder::default();
    {
        let mut parser = CssParser::with_observer(ParserContext::default(), &mut recorder);
        assert!(parser.parse_selector("div..x").is_none());
    }
    assert_json_eq(
        Value::Array(recorder.errors),
        json!([["invalid selector", 1, 1, 0]]),
        "selector error",
    );

    let mut recorder = Recorder::default();
    {
        let mut parser = CssParser::with_observer(ParserContext::default(), &mut recorder);
        parser.parse_sheet("\n\na { }\nb..c { }", 10);
    }
    assert_json_eq(
        Value::Array(recorder.errors),
        json!([["invalid selector", 13, 1, 8]]),
        "start line",
    );
}

#[test]
fn parse_error_display() {
    let mut recorder = Recorder::default();
    {
        let mut parser = CssParser::with_observer(ParserContext::default(), &mut recorder);
        parser.parse_media_query_list("screen, 4px");
    }
    assert_json_eq(
        Value::Array(recorder.errors),
        json!([["invalid media query", 1, 9, 8]]),
        "media query error",
    );
    let error = ValueListError::IndexOutOfBounds { index: 4, len: 2 };
    assert_eq!(
        error.to_string(),
        "index 4 is out of bounds for a value list of length 2"
    );
}

fn nest(open: &str, inner: &str, close: &str, depth: usize) -> String {
    format!("{}{}{}", open.repeat(depth), inner, close.repeat(depth))
}

#[test]
fn value_nesting_is_bounded() {
    let mut parser = CssParser::new(ParserContext::default());
    let deepest = nest("f(", "x", ")", MAX_NESTING_DEPTH);
    assert_eq!(parser.parse_value(&deepest).unwrap().to_css_string(), deepest);
    assert!(parser
        .parse_value(&nest("f(", "x", ")", MAX_NESTING_DEPTH + 1))
        .is_none());
    assert!(parser.parse_value(&"(".repeat(200_000)).is_none());
    assert!(parser.parse_value(&"[".repeat(200_000)).is_none());
    assert!(parser.parse_value(&"f(".repeat(200_000)).is_none());

    // Only the too deep declaration is dropped.
    let sheet = parser.parse_sheet(
        &format!("a {{ b: {}; c: d }}", nest("(", "x", ")", 5_000)),
        1,
    );
    match sheet.rules.as_slice() {
        [CssRule::Style(rule)] => {
            assert_eq!(rule.declarations.len(), 1);
            assert_eq!(rule.declarations[0].name, "c");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(parser
        .parse_declaration_list(&format!("b: {}", "calc(".repeat(50_000)))
        .is_empty());
    assert_eq!(parser.floating().live_count(), 0);
}

#[test]
fn selector_nesting_is_bounded() {
    let mut parser = CssParser::new(ParserContext::default());
    for open in [":-webkit-any(", ":not(", ":host(", "::cue("].iter() {
        let deep = nest(open, "a", ")", 5_000);
        assert!(parser.parse_selector(&deep).is_none(), "{}", open);
        let sheet = parser.parse_sheet(&format!("{} {{ }} b {{ c: d }}", deep), 1);
        assert_eq!(sheet.to_css_string(), "b { c: d; }", "{}", open);
    }
    assert_eq!(parser.floating().live_count(), 0);
}

#[test]
fn supports_nesting_is_bounded() {
    let mut parser = CssParser::new(ParserContext::default());
    let shallow = nest("(", "a: b", ")", 10);
    assert_eq!(
        parser.parse_supports_condition(&shallow).unwrap().to_css_string(),
        "(a: b)"
    );
    let deep = nest("(", "a: b", ")", 5_000);
    assert!(parser.parse_supports_condition(&deep).is_none());
    assert!(parser
        .parse_supports_condition(&"not (".repeat(5_000))
        .is_none());

    let sheet = parser.parse_sheet(&format!("@supports {} {{ x {{ }} }} p {{ q: r }}", deep), 1);
    assert_eq!(sheet.to_css_string(), "p { q: r; }");
    assert_eq!(parser.floating().live_count(), 0);
}

#[test]
fn grouping_rule_nesting_is_bounded() {
    let mut parser = CssParser::new(ParserContext::default());
    let text = nest("@media all { ", "a { b: c }", " }", MAX_NESTING_DEPTH + 50);
    let sheet = parser.parse_sheet(&text, 1);
    let mut depth = 0;
    let mut rules = &sheet.rules;
    while let [CssRule::Media(rule)] = rules.as_slice() {
        depth += 1;
        rules = &rule.rules;
    }
    assert_eq!(depth, MAX_NESTING_DEPTH);
    assert!(rules.is_empty());
    assert_eq!(parser.floating().live_count(), 0);
}

#[test]
fn long_selector_chains() {
    let mut parser = CssParser::new(ParserContext::default());
    let descendants = vec!["a"; 50_000].join(" ");
    let list = parser.parse_selector(&descendants).unwrap();
    assert_eq!(list.first().unwrap().components().len(), 50_000);

    let compound = ".a".repeat(5_000);
    let list = parser.parse_selector(&compound).unwrap();
    assert_eq!(list.first().unwrap().components().len(), 5_000);
    assert_eq!(parser.floating().live_count(), 0);

    let mut head = class("a");
    for _ in 0..100_000 {
        let mut next = class("b");
        next.set_tag_history(Box::new(head));
        head = next;
    }
    head.update_last(|end| end.set_value("end"));
    let mut last = &head;
    while let Some(next) = last.tag_history() {
        last = next;
    }
    assert_eq!(last.selector().value(), Some("end"));
    assert!(!head.is_simple());
    drop(head);
}

#[test]
fn name_characters() {
    for byte in 0u8..0x80 {
        let c = byte as char;
        let start = c.is_ascii_alphabetic() || c == '_' || c == ':';
        let part = start || c.is_ascii_digit() || c == '-' || c == '.';
        assert_eq!(is_valid_name_start(c), start, "{:?}", c);
        assert_eq!(is_valid_name_part(c), part, "{:?}", c);
    }

    // (character, name start, name part)
    let expectations = [
        ('\u{02BB}', true, true),
        ('\u{02C1}', true, true),
        ('\u{0559}', true, true),
        ('\u{06E5}', true, true),
        ('\u{06E6}', true, true),
        ('\u{00B7}', false, true),
        ('\u{0387}', false, true),
        ('\u{F900}', false, false),
        ('\u{FFFD}', false, false),
        ('\u{00E9}', true, true),
        ('\u{0661}', false, true),
        ('\u{0301}', false, true),
        // <super> and canonical decompositions.
        ('\u{00AA}', true, true),
        ('\u{1E9B}', true, true),
        ('\u{02B0}', false, true),
        // <compat> and <font> decompositions.
        ('\u{0132}', false, false),
        ('\u{03D0}', false, false),
        ('\u{2102}', false, false),
        ('\u{2160}', false, false),
        ('\u{3131}', false, false),
        ('\u{1D400}', false, false),
        ('\u{1D7CE}', false, false),
    ];
    for &(c, start, part) in expectations.iter() {
        assert_eq!(is_valid_name_start(c), start, "U+{:04X}", c as u32);
        assert_eq!(is_valid_name_part(c), part, "U+{:04X}", c as u32);
    }

    assert!(is_valid_name("svg"));
    assert!(is_valid_name("_a-1.b"));
    assert!(is_valid_name("\u{00AA}\u{02B0}"));
    assert!(!is_valid_name(""));
    assert!(!is_valid_name("1a"));
    assert!(!is_valid_name("-a"));
    assert!(!is_valid_name("a b"));
}

#[test]
fn font_and_compat_table() {
    use unicode_general_category::{get_general_category, GeneralCategory::*};
    use unicode_normalization::char::decompose_compatible;

    let table = crate::chars::FONT_OR_COMPAT_DECOMPOSITIONS;
    for pair in table.windows(2) {
        assert!(pair[0].1 < pair[1].0, "{:?}", pair);
    }
    for &(first, last) in table.iter() {
        assert!(first <= last);
        for c in first..=last {
            let is_name_category = matches!(
                get_general_category(c),
                UppercaseLetter
                    | LowercaseLetter
                    | TitlecaseLetter
                    | ModifierLetter
                    | OtherLetter
                    | LetterNumber
                    | NonspacingMark
                    | SpacingMark
                    | EnclosingMark
                    | DecimalNumber
            );
            if !is_name_category {
                continue;
            }
            let mut decomposed = String::new();
            decompose_compatible(c, |d| decomposed.push(d));
            assert_ne!(decomposed, c.to_string(), "U+{:04X}", c as u32);
        }
    }
}

#[test]
fn serialize_identifiers_and_strings() {
    fn identifier(value: &str) -> String {
        let mut dest = String::new();
        serialize_identifier(value, &mut dest).unwrap();
        dest
    }
    fn string(value: &str) -> String {
        let mut dest = String::new();
        serialize_string(value, &mut dest).unwrap();
        dest
    }

    assert_eq!(identifier(""), "");
    assert_eq!(identifier("a"), "a");
    assert_eq!(identifier("1a"), "\\31 a");
    assert_eq!(identifier("-"), "\\-");
    assert_eq!(identifier("-9"), "-\\39 ");
    assert_eq!(identifier("--x y"), "--x\\ y");
    assert_eq!(identifier("a\u{1}"), "a\\1 ");
    assert_eq!(identifier("a\0"), "a\u{FFFD}");
    assert_eq!(identifier("\u{e9}t\u{e9}"), "\u{e9}t\u{e9}");

    assert_eq!(string(""), "\"\"");
    assert_eq!(string("a\"b\\c"), "\"a\\\"b\\\\c\"");
    assert_eq!(string("\n"), "\"\\a \"");
    assert_eq!(string("\u{7f}"), "\"\\7f \"");
    assert_eq!(string("\0"), "\"\u{FFFD}\"");
    assert_eq!(string("'\u{e9}'"), "\"'\u{e9}'\"");
}
