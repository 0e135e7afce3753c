//! Prompt templates for LLM interactions.

use serde::Deserialize;

use crate::error::{FieldmapError, Result};
use crate::mapping::ColumnContext;
use crate::rules::FieldRule;

/// System prompt shared by all providers.
pub fn system_prompt() -> &'static str {
    r#"You help migrate maintenance records (assets, work orders, labor, costs) into a computerized maintenance management system.

Given a column from a customer's spreadsheet and the list of target fields, you decide which single target field the column holds.

Guidelines:
- Only answer with a field name copied exactly from the candidate list
- Use sample values as evidence, but the column name usually matters most
- Answer null when no candidate is a reasonable fit; a wrong mapping is worse than none
- Always respond with valid JSON when asked"#
}

/// Build a prompt asking for the best target field for one column.
pub fn field_suggestion_prompt(column: &ColumnContext, candidates: &[&FieldRule]) -> String {
    let sample_str = if column.samples.is_empty() {
        "No samples available".to_string()
    } else {
        column
            .samples
            .iter()
            .take(10)
            .map(|s| format!("  - \"{}\"", s))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let candidate_str = candidates
        .iter()
        .map(|rule| {
            let mut line = format!("  - {} ({})", rule.name, rule.field_type);
            if rule.has_reference_values() {
                let allowed: Vec<&str> = rule.reference_values.iter().map(String::as_str).collect();
                line.push_str(&format!(", allowed: {}", allowed.join(" | ")));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Map this spreadsheet column to one of the target fields.

## Column
- Name: {}

## Sample Values
{}

## Candidate Fields
{}

Respond with a JSON object:
{{
  "field": "Exact candidate name" or null,
  "confidence": 0.0-1.0,
  "rationale": "One sentence"
}}"#,
        column.name, sample_str, candidate_str
    )
}

/// Parse JSON from an LLM response, handling markdown code blocks.
pub fn parse_json_response<T: for<'de> Deserialize<'de>>(response: &str) -> Result<T> {
    let json_str = if response.contains("```json") {
        response
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .map(|s| s.trim())
            .unwrap_or(response)
    } else if response.contains("```") {
        response
            .split("```")
            .nth(1)
            .map(|s| s.trim())
            .unwrap_or(response)
    } else {
        response.trim()
    };

    serde_json::from_str(json_str)
        .map_err(|e| FieldmapError::Llm(format!("Failed to parse LLM JSON response: {}", e)))
}
