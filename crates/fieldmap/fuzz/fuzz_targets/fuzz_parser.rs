//! Fuzz target for the data parser.
//!
//! The delimited-text parser must never panic on malformed input, whatever
//! delimiter the detector settles on.

#![no_main]

use libfuzzer_sys::fuzz_target;
use fieldmap::Parser;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let parser = Parser::new();
    for delimiter in [b',', b'\t', b';', b'|'] {
        let _ = parser.parse_bytes(data, delimiter);
    }
});
