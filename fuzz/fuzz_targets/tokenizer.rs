/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

#![no_main]

use cssgrammar::*;

const MODES: [LexMode; 4] = [
    LexMode::Normal,
    LexMode::MediaQuery,
    LexMode::Supports,
    LexMode::NthChild,
];

fn tokenize_all(source: &SourceBuffer, mode: LexMode) {
    let mut tokenizer = Tokenizer::new(source);
    let mut last = tokenizer.position();
    while tokenizer.next(mode).is_ok() {
        // Every token consumes at least one code unit.
        assert!(tokenizer.position() > last);
        last = tokenizer.position();
    }
}

libfuzzer_sys::fuzz_target!(|data: &[u8]| {
    let latin1 = SourceBuffer::from_latin1(data);
    let text = String::from_utf8_lossy(data);
    let units: Vec<u16> = text.encode_utf16().collect();
    let wide = SourceBuffer::from_utf16(&units);
    for &mode in MODES.iter() {
        tokenize_all(&latin1, mode);
        tokenize_all(&wide, mode);
    }
});
