//! Similarity-based column resolution.

use serde::{Deserialize, Serialize};

use super::decision::MatchMethod;
use super::resolver::{ColumnContext, ColumnResolver, Resolution};
use crate::error::{FieldmapError, Result};
use crate::rules::{normalize_name, RuleSet};

/// Settings for [`FuzzyResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyConfig {
    /// Minimum similarity (0.0-1.0) for a match.
    pub cutoff: f64,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self { cutoff: 0.6 }
    }
}

impl FuzzyConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.cutoff) {
            return Err(FieldmapError::Config(format!(
                "fuzzy cutoff must be between 0 and 1, got {}",
                self.cutoff
            )));
        }
        Ok(())
    }
}

/// Matches a column to the canonical field whose name or alias is most
/// similar, provided the similarity reaches the cutoff.
///
/// Equal scores resolve to the earlier field in catalog order.
#[derive(Debug, Clone)]
pub struct FuzzyResolver {
    config: FuzzyConfig,
}

impl FuzzyResolver {
    pub fn new() -> Self {
        Self::with_config(FuzzyConfig::default())
    }

    pub fn with_config(config: FuzzyConfig) -> Self {
        Self { config }
    }

    pub fn cutoff(&self) -> f64 {
        self.config.cutoff
    }
}

impl Default for FuzzyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnResolver for FuzzyResolver {
    fn name(&self) -> &str {
        "fuzzy"
    }

    fn resolve(&self, column: &ColumnContext, rules: &RuleSet) -> Result<Option<Resolution>> {
        let normalized = column.normalized();
        if normalized.is_empty() {
            return Ok(None);
        }

        let mut best: Option<(&str, f64)> = None;

        for rule in rules.rules() {
            let mut score = similarity(&normalized, &normalize_name(&rule.name));
            if let Some(aliases) = rules.synonyms().aliases(&rule.name) {
                for alias in aliases {
                    score = score.max(similarity(&normalized, alias));
                }
            }

            let better = match best {
                None => true,
                Some((_, best_score)) => score > best_score,
            };
            if better {
                best = Some((&rule.name, score));
            }
        }

        Ok(best
            .filter(|(_, score)| *score >= self.config.cutoff)
            .map(|(field, score)| Resolution {
                field: field.to_string(),
                method: MatchMethod::Fuzzy { score },
            }))
    }
}

/// Normalized Levenshtein similarity in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

/// Levenshtein edit distance over chars.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Two-row variant of the full matrix.
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0usize; b_chars.len() + 1];

    for (i, ca) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{FieldRule, FieldType};

    fn rules() -> RuleSet {
        RuleSet::new([
            (FieldRule::new("Work Order Date", FieldType::Date), vec!["wo date"]),
            (FieldRule::new("Asset", FieldType::Text), vec!["equipment"]),
        ])
        .unwrap()
    }

    fn resolve(column: &str) -> Option<Resolution> {
        FuzzyResolver::new()
            .resolve(&ColumnContext::new(column), &rules())
            .unwrap()
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("hello", "hello"), 0);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("asset", "asset"), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_typo_matches_alias() {
        let res = resolve("W/O Date").unwrap();
        assert_eq!(res.field, "Work Order Date");
        assert!(matches!(res.method, MatchMethod::Fuzzy { score } if score >= 0.6));
    }

    #[test]
    fn test_below_cutoff_is_unmatched() {
        assert!(resolve("random_notes").is_none());
    }

    #[test]
    fn test_tie_goes_to_catalog_order() {
        let rules = RuleSet::new([
            (FieldRule::new("abcd", FieldType::Text), Vec::<&str>::new()),
            (FieldRule::new("abce", FieldType::Text), Vec::new()),
        ])
        .unwrap();
        let res = FuzzyResolver::new()
            .resolve(&ColumnContext::new("abcx"), &rules)
            .unwrap()
            .unwrap();
        assert_eq!(res.field, "abcd");
    }

    #[test]
    fn test_invalid_cutoff() {
        assert!(FuzzyConfig { cutoff: 1.5 }.validate().is_err());
        assert!(FuzzyConfig::default().validate().is_ok());
    }
}
