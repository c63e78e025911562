/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

#![no_main]

use cssgrammar::*;

const DEBUG: bool = false;

fn fuzz(data: &str) {
    let mut parser = CssParser::new(ParserContext {
        viewport_rules_enabled: true,
        ..ParserContext::default()
    });
    let sheet = parser.parse_sheet(data, 1);
    if DEBUG {
        println!("IN: {:?}", data);
        println!("OUT: {}", sheet.to_css_string());
    }
    assert_eq!(parser.floating().live_count(), 0);

    parser.parse_rule(data);
    parser.parse_value(data);
    parser.parse_selector(data);
    parser.parse_media_query_list(data);
    parser.parse_supports_condition(data);
    parser.parse_declaration_list(data);
    parser.parse_keyframe_rule(data);
    parser.parse_keyframe_key_list(data);
    assert_eq!(parser.floating().live_count(), 0);

    // Any An+B the selector parser accepted is matchable at the extremes.
    if let Some(list) = parser.parse_selector(data) {
        for selector in list.iter() {
            for component in selector.components() {
                if component.pseudo_type().is_nth() {
                    for &count in &[i32::MIN, -1, 0, 1, i32::MAX] {
                        component.match_nth(count);
                    }
                }
            }
        }
    }
}

libfuzzer_sys::fuzz_target!(|data: &[u8]| {
    fuzz(&String::from_utf8_lossy(data));
});
