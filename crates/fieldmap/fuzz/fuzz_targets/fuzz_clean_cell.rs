//! Fuzz target for per-cell cleaning.
//!
//! Date and number coercion must never panic, and a value that cleaned
//! successfully must clean to itself a second time.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use fieldmap::{clean_cell, FieldRule, FieldType};

#[derive(Debug, Arbitrary)]
struct Input {
    raw: String,
    kind: u8,
    required: bool,
    references: Vec<String>,
}

fuzz_target!(|input: Input| {
    if input.raw.len() > 1_000 || input.references.len() > 32 {
        return;
    }

    let field_type = match input.kind % 4 {
        0 => FieldType::Text,
        1 => FieldType::Number,
        2 => FieldType::Date,
        _ => FieldType::Other("Currency".to_string()),
    };
    let rule = FieldRule::new("Field", field_type.clone())
        .with_required(input.required)
        .with_reference_values(input.references);

    let outcome = clean_cell(&input.raw, &rule);

    if matches!(field_type, FieldType::Number | FieldType::Date) && outcome.problems.is_empty() {
        let plain = FieldRule::new("Field", field_type);
        let again = clean_cell(&outcome.value.to_string(), &plain);
        assert_eq!(again.value, outcome.value);
    }
});
