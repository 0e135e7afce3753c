//! The synonym mapper: runs resolvers over every input column.

use serde::{Deserialize, Serialize};

use super::decision::{ColumnMapping, MappingDecision, MappingTarget};
use super::fuzzy::{FuzzyConfig, FuzzyResolver};
use super::resolver::{ColumnContext, ColumnResolver, SynonymResolver};
use crate::input::DataTable;
use crate::rules::RuleSet;

/// Mapper configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Enable similarity matching as a fallback after exact/alias matching.
    pub fuzzy: Option<FuzzyConfig>,
    /// Non-blank sample values handed to resolvers per column.
    pub sample_size: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            fuzzy: None,
            sample_size: 5,
        }
    }
}

/// Maps input column names to canonical field names.
///
/// Resolvers run in order for each column and the first match wins. The
/// exact/alias resolver always runs first. A failing fallback resolver is
/// logged and treated as "no match", so every column always gets a decision.
pub struct SynonymMapper {
    resolvers: Vec<Box<dyn ColumnResolver>>,
    sample_size: usize,
}

impl SynonymMapper {
    /// Exact/alias matching only.
    pub fn new() -> Self {
        Self::with_config(&MapperConfig::default())
    }

    /// Build the resolver chain from configuration.
    pub fn with_config(config: &MapperConfig) -> Self {
        let mut resolvers: Vec<Box<dyn ColumnResolver>> = vec![Box::new(SynonymResolver)];
        if let Some(fuzzy) = config.fuzzy {
            resolvers.push(Box::new(FuzzyResolver::with_config(fuzzy)));
        }
        Self {
            resolvers,
            sample_size: config.sample_size,
        }
    }

    /// Append a fallback resolver to the chain.
    pub fn with_resolver(mut self, resolver: impl ColumnResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    /// Append an already boxed fallback resolver.
    pub fn push_resolver(&mut self, resolver: Box<dyn ColumnResolver>) {
        self.resolvers.push(resolver);
    }

    /// Names of the resolvers in the chain, in order.
    pub fn resolver_names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// Map bare column names.
    pub fn map_columns<S: AsRef<str>>(&self, columns: &[S], rules: &RuleSet) -> ColumnMapping {
        let mut mapping = ColumnMapping::new();
        for column in columns {
            let context = ColumnContext::new(column.as_ref());
            mapping.insert(column.as_ref(), self.decide(&context, rules));
        }
        mapping
    }

    /// Map every header of a table, giving resolvers sample values.
    pub fn map_table(&self, table: &DataTable, rules: &RuleSet) -> ColumnMapping {
        let mut mapping = ColumnMapping::new();
        for (index, header) in table.headers.iter().enumerate() {
            let samples = table
                .column_values(index)
                .filter(|v| !DataTable::is_null_value(v))
                .take(self.sample_size)
                .map(str::to_string)
                .collect();
            let context = ColumnContext::new(header.as_str()).with_samples(samples);
            mapping.insert(header.as_str(), self.decide(&context, rules));
        }
        mapping
    }

    fn decide(&self, column: &ColumnContext, rules: &RuleSet) -> MappingDecision {
        for resolver in &self.resolvers {
            match resolver.resolve(column, rules) {
                Ok(Some(resolution)) if rules.contains(&resolution.field) => {
                    tracing::debug!(
                        column = %column.name,
                        field = %resolution.field,
                        method = resolution.method.label(),
                        resolver = resolver.name(),
                        "mapped column"
                    );
                    return MappingDecision {
                        target: MappingTarget::Field(resolution.field),
                        method: resolution.method,
                        resolver: Some(resolver.name().to_string()),
                    };
                }
                Ok(Some(resolution)) => {
                    tracing::warn!(
                        column = %column.name,
                        field = %resolution.field,
                        resolver = resolver.name(),
                        "resolver returned a field outside the catalog; ignoring"
                    );
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        column = %column.name,
                        resolver = resolver.name(),
                        error = %e,
                        "resolver failed; trying next"
                    );
                }
            }
        }

        tracing::debug!(column = %column.name, "column left unmapped");
        MappingDecision::unmapped()
    }
}

impl Default for SynonymMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FieldmapError, Result};
    use crate::mapping::{MatchMethod, Resolution};
    use crate::rules::{FieldRule, FieldType};

    fn rules() -> RuleSet {
        RuleSet::new([
            (
                FieldRule::new("Work Order Date", FieldType::Date).with_required(true),
                vec!["wo date", "order date"],
            ),
            (FieldRule::new("Asset", FieldType::Text), vec!["equipment"]),
        ])
        .unwrap()
    }

    struct Failing;

    impl ColumnResolver for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn resolve(&self, _: &ColumnContext, _: &RuleSet) -> Result<Option<Resolution>> {
            Err(FieldmapError::Llm("offline".to_string()))
        }
    }

    struct Rogue;

    impl ColumnResolver for Rogue {
        fn name(&self) -> &str {
            "rogue"
        }

        fn resolve(&self, _: &ColumnContext, _: &RuleSet) -> Result<Option<Resolution>> {
            Ok(Some(Resolution {
                field: "Not A Field".to_string(),
                method: MatchMethod::Llm,
            }))
        }
    }

    #[test]
    fn test_every_column_gets_a_decision() {
        let mapper = SynonymMapper::new();
        let mapping = mapper.map_columns(&["WO Date", "random_notes", "Equipment"], &rules());

        assert_eq!(mapping.len(), 3);
        assert_eq!(
            mapping.target("WO Date"),
            Some(&MappingTarget::Field("Work Order Date".to_string()))
        );
        assert_eq!(mapping.target("random_notes"), Some(&MappingTarget::Unmapped));
        assert_eq!(
            mapping.target("Equipment"),
            Some(&MappingTarget::Field("Asset".to_string()))
        );
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let mapper = SynonymMapper::with_config(&MapperConfig {
            fuzzy: Some(FuzzyConfig::default()),
            ..MapperConfig::default()
        });
        let columns = ["WO Dte", "Asset", "misc"];
        assert_eq!(
            mapper.map_columns(&columns, &rules()),
            mapper.map_columns(&columns, &rules())
        );
    }

    #[test]
    fn test_fuzzy_fallback_only_after_synonyms() {
        let mapper = SynonymMapper::with_config(&MapperConfig {
            fuzzy: Some(FuzzyConfig::default()),
            ..MapperConfig::default()
        });
        let mapping = mapper.map_columns(&["WO Dte", "wo date"], &rules());

        assert!(matches!(
            mapping.get("WO Dte").unwrap().method,
            MatchMethod::Fuzzy { .. }
        ));
        assert_eq!(mapping.get("wo date").unwrap().method, MatchMethod::Alias);
    }

    #[test]
    fn test_failing_resolver_leaves_column_unmapped() {
        let mapper = SynonymMapper::new().with_resolver(Failing);
        let mapping = mapper.map_columns(&["random_notes"], &rules());
        assert_eq!(mapping.target("random_notes"), Some(&MappingTarget::Unmapped));
    }

    #[test]
    fn test_out_of_catalog_answer_ignored() {
        let mapper = SynonymMapper::new().with_resolver(Rogue);
        let mapping = mapper.map_columns(&["random_notes"], &rules());
        assert_eq!(mapping.target("random_notes"), Some(&MappingTarget::Unmapped));
    }

    #[test]
    fn test_map_table_uses_headers() {
        let table = DataTable::from_rows(&["WO Date", "Notes"], &[&["2024-01-05", "x"]]);
        let mapping = SynonymMapper::new().map_table(&table, &rules());
        assert_eq!(mapping.mapped_count(), 1);
        assert_eq!(mapping.unmapped().collect::<Vec<_>>(), vec!["Notes"]);
    }

    #[test]
    fn test_resolver_names() {
        let mapper = SynonymMapper::with_config(&MapperConfig {
            fuzzy: Some(FuzzyConfig::default()),
            ..MapperConfig::default()
        });
        assert_eq!(mapper.resolver_names(), vec!["synonym", "fuzzy"]);
    }
}
