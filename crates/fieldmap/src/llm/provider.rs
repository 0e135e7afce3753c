//! LLM provider trait and types.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::mapping::ColumnContext;
use crate::rules::FieldRule;

/// A provider's answer for one column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSuggestion {
    /// Suggested canonical field, or `None` when no candidate fits.
    #[serde(default)]
    pub field: Option<String>,

    /// Confidence in the suggestion (0.0-1.0).
    #[serde(default)]
    pub confidence: f64,

    /// Short explanation for the choice.
    #[serde(default)]
    pub rationale: String,
}

impl FieldSuggestion {
    /// A suggestion that maps to nothing.
    pub fn none(rationale: impl Into<String>) -> Self {
        Self {
            field: None,
            confidence: 0.0,
            rationale: rationale.into(),
        }
    }
}

/// Configuration for LLM providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model to use (e.g., "claude-sonnet-4-20250514").
    pub model: String,

    /// Maximum tokens in response.
    pub max_tokens: usize,

    /// Temperature for generation (0.0-1.0).
    pub temperature: f64,

    /// Suggestions below this confidence are discarded.
    pub min_confidence: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 256,
            temperature: 0.0,
            min_confidence: 0.5,
        }
    }
}

/// Trait for LLM providers.
///
/// Implementations must be thread-safe (Send + Sync) so a provider can sit
/// inside a mapper's resolver chain.
pub trait LlmProvider: Send + Sync {
    /// Suggest which candidate field an input column holds.
    ///
    /// # Arguments
    /// * `column` - Column name and a few sample values
    /// * `candidates` - Fields still open for mapping, in catalog order
    ///
    /// # Returns
    /// The suggested field (which callers verify against the catalog) with
    /// a confidence and rationale
    fn suggest_field(
        &self,
        column: &ColumnContext,
        candidates: &[&FieldRule],
    ) -> Result<FieldSuggestion>;

    /// Get the configuration for this provider.
    fn config(&self) -> &LlmConfig;

    /// Get the name of this provider (for logging/debugging).
    fn name(&self) -> &str;
}
