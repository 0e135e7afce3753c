//! Plugs an [`LlmProvider`] into the mapper's resolver chain.

use crate::error::Result;
use crate::mapping::{ColumnContext, ColumnResolver, MatchMethod, Resolution};
use crate::rules::{FieldRule, RuleSet};

use super::provider::LlmProvider;

/// Column resolver backed by a language model.
///
/// Every field in the catalog is offered as a candidate. Answers below the
/// provider's `min_confidence`, or naming a field the catalog does not
/// contain, are treated as no match.
pub struct LlmResolver {
    provider: Box<dyn LlmProvider>,
}

impl LlmResolver {
    pub fn new(provider: impl LlmProvider + 'static) -> Self {
        Self::boxed(Box::new(provider))
    }

    pub fn boxed(provider: Box<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }
}

impl ColumnResolver for LlmResolver {
    fn name(&self) -> &str {
        self.provider.name()
    }

    fn resolve(&self, column: &ColumnContext, rules: &RuleSet) -> Result<Option<Resolution>> {
        let candidates: Vec<&FieldRule> = rules.rules().collect();
        let suggestion = self.provider.suggest_field(column, &candidates)?;

        let Some(field) = suggestion.field else {
            return Ok(None);
        };
        if suggestion.confidence < self.provider.config().min_confidence {
            tracing::debug!(
                column = %column.name,
                field = %field,
                confidence = suggestion.confidence,
                "LLM suggestion below confidence threshold"
            );
            return Ok(None);
        }
        if !rules.contains(&field) {
            tracing::warn!(
                column = %column.name,
                field = %field,
                provider = self.provider.name(),
                "LLM suggested a field outside the catalog"
            );
            return Ok(None);
        }

        Ok(Some(Resolution {
            field,
            method: MatchMethod::Llm,
        }))
    }
}
