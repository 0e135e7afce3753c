//! Mock LLM provider for testing.

use indexmap::IndexMap;

use crate::error::Result;
use crate::mapping::ColumnContext;
use crate::rules::FieldRule;

use super::provider::{FieldSuggestion, LlmConfig, LlmProvider};

/// Mock LLM provider that returns predictable responses for testing.
///
/// Without canned answers it picks the candidate whose lower-cased name
/// shares the most whitespace-separated words with the column name. Ties go
/// to the earlier candidate; no shared word means no suggestion.
pub struct MockProvider {
    config: LlmConfig,
    answers: IndexMap<String, String>,
}

impl MockProvider {
    /// Create a new mock provider.
    pub fn new() -> Self {
        Self::with_config(LlmConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(config: LlmConfig) -> Self {
        Self {
            config,
            answers: IndexMap::new(),
        }
    }

    /// Always answer `field` for `column`, even if `field` is not a candidate.
    pub fn with_answer(mut self, column: impl Into<String>, field: impl Into<String>) -> Self {
        self.answers.insert(column.into(), field.into());
        self
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn words(s: &str) -> Vec<String> {
    s.to_lowercase().split_whitespace().map(str::to_string).collect()
}

impl LlmProvider for MockProvider {
    fn suggest_field(
        &self,
        column: &ColumnContext,
        candidates: &[&FieldRule],
    ) -> Result<FieldSuggestion> {
        if let Some(field) = self.answers.get(&column.name) {
            return Ok(FieldSuggestion {
                field: Some(field.clone()),
                confidence: 1.0,
                rationale: "Canned answer".to_string(),
            });
        }

        let column_words = words(&column.name);
        if column_words.is_empty() {
            return Ok(FieldSuggestion::none("Blank column name"));
        }

        let mut best: Option<(&FieldRule, usize)> = None;
        for rule in candidates {
            let shared = words(&rule.name)
                .iter()
                .filter(|w| column_words.contains(w))
                .count();
            if shared > 0 && best.is_none_or(|(_, n)| shared > n) {
                best = Some((rule, shared));
            }
        }

        Ok(match best {
            Some((rule, shared)) => FieldSuggestion {
                field: Some(rule.name.clone()),
                confidence: shared as f64 / column_words.len() as f64,
                rationale: format!("Shares {} word(s) with '{}'", shared, rule.name),
            },
            None => FieldSuggestion::none("No shared words"),
        })
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::FieldType;

    fn candidates() -> Vec<FieldRule> {
        vec![
            FieldRule::new("Work Order Number", FieldType::Text),
            FieldRule::new("Work Order Date", FieldType::Date),
            FieldRule::new("Labor Hours", FieldType::Number),
        ]
    }

    #[test]
    fn test_most_shared_words_wins() {
        let fields = candidates();
        let refs: Vec<&FieldRule> = fields.iter().collect();
        let provider = MockProvider::new();

        let suggestion = provider
            .suggest_field(&ColumnContext::new("order date of job"), &refs)
            .unwrap();
        assert_eq!(suggestion.field.as_deref(), Some("Work Order Date"));
        assert_eq!(suggestion.confidence, 0.5);
    }

    #[test]
    fn test_tie_goes_to_first_candidate() {
        let fields = candidates();
        let refs: Vec<&FieldRule> = fields.iter().collect();

        let suggestion = MockProvider::new()
            .suggest_field(&ColumnContext::new("work"), &refs)
            .unwrap();
        assert_eq!(suggestion.field.as_deref(), Some("Work Order Number"));
    }

    #[test]
    fn test_no_overlap_no_suggestion() {
        let fields = candidates();
        let refs: Vec<&FieldRule> = fields.iter().collect();

        let suggestion = MockProvider::new()
            .suggest_field(&ColumnContext::new("random_notes"), &refs)
            .unwrap();
        assert_eq!(suggestion.field, None);
    }

    #[test]
    fn test_canned_answer() {
        let provider = MockProvider::new().with_answer("Tech", "Technician");
        let suggestion = provider.suggest_field(&ColumnContext::new("Tech"), &[]).unwrap();
        assert_eq!(suggestion.field.as_deref(), Some("Technician"));
    }
}
