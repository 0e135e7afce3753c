//! Fuzz target for the rules loader.
//!
//! Any parsed table must either load into a catalog or fail with an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use fieldmap::{Parser, RuleSetLoader};

fuzz_target!(|data: &[u8]| {
    if data.len() > 50_000 {
        return;
    }

    if let Ok(table) = Parser::new().parse_bytes(data, b',') {
        let _ = RuleSetLoader::load_table(&table);
    }
});
