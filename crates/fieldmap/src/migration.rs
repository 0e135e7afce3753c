//! Main Migrator struct and public API.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::input::{DataTable, Parser, ParserConfig, SourceMetadata};
use crate::llm::{LlmProvider, LlmResolver};
use crate::mapping::{ColumnMapping, ColumnResolver, MapperConfig, SynonymMapper};
use crate::rules::{RuleSet, RuleSetLoader};
use crate::validation::{
    CleanedTable, FieldSummary, IssueKind, IssueLog, ValidationEngine, ValidationReport,
};

/// Configuration for a migration run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Parser configuration, used for both the rules and the data file.
    pub parser: ParserConfig,
    /// Mapper configuration.
    pub mapper: MapperConfig,
}

impl MigrationConfig {
    /// Reject settings that would silently change mapping, such as a fuzzy
    /// cutoff outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if let Some(fuzzy) = &self.mapper.fuzzy {
            fuzzy.validate()?;
        }
        Ok(())
    }
}

/// How a run turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// At least one column was mapped and no issues were found.
    Clean,
    /// At least one issue was found.
    IssuesFound,
    /// No input column mapped to a field, so nothing was validated.
    NothingMapped,
}

/// Summary of a migration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationSummary {
    /// Total number of input columns.
    pub total_columns: usize,
    /// Columns mapped to a canonical field.
    pub mapped_columns: usize,
    /// Columns left unmapped.
    pub unmapped_columns: usize,
    /// Data rows (excluding header).
    pub total_rows: usize,
    /// Total number of issues.
    pub total_issues: usize,
    /// Issues by kind.
    pub issues_by_kind: IndexMap<IssueKind, usize>,
    pub outcome: RunOutcome,
}

impl MigrationSummary {
    fn compute(table: &DataTable, mapping: &ColumnMapping, report: &ValidationReport) -> Self {
        let mapped_columns = mapping.mapped_count();
        let outcome = if mapped_columns == 0 {
            RunOutcome::NothingMapped
        } else if report.issues.is_empty() {
            RunOutcome::Clean
        } else {
            RunOutcome::IssuesFound
        };

        Self {
            total_columns: table.column_count(),
            mapped_columns,
            unmapped_columns: mapping.len() - mapped_columns,
            total_rows: table.row_count(),
            total_issues: report.issues.len(),
            issues_by_kind: report.issues.count_by_kind(),
            outcome,
        }
    }
}

/// Result of migrating one data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationResult {
    /// Metadata about the data file.
    pub source: SourceMetadata,
    /// Decision for every input column, in input order.
    pub mapping: ColumnMapping,
    /// Required fields no column maps to.
    pub missing_required_fields: Vec<String>,
    /// Fields claimed by more than one column.
    pub duplicate_targets: IndexMap<String, Vec<String>>,
    /// Cleaned values keyed by canonical field.
    pub cleaned: CleanedTable,
    /// Every problem found, in column-then-row order.
    pub issues: IssueLog,
    pub field_summaries: Vec<FieldSummary>,
    pub summary: MigrationSummary,
}

/// Runs load, map, and validate as one pipeline.
pub struct Migrator {
    parser: Parser,
    loader: RuleSetLoader,
    mapper: SynonymMapper,
    validation: ValidationEngine,
}

impl Migrator {
    /// Create a migrator with default configuration.
    pub fn new() -> Self {
        Self::with_config(MigrationConfig::default())
    }

    /// Create a migrator with custom configuration.
    pub fn with_config(config: MigrationConfig) -> Self {
        Self {
            parser: Parser::with_config(config.parser.clone()),
            loader: RuleSetLoader::with_parser_config(config.parser),
            mapper: SynonymMapper::with_config(&config.mapper),
            validation: ValidationEngine::new(),
        }
    }

    /// Append a fallback column resolver.
    pub fn with_resolver(mut self, resolver: impl ColumnResolver + 'static) -> Self {
        self.mapper.push_resolver(Box::new(resolver));
        self
    }

    /// Use an LLM provider as the last mapping fallback.
    pub fn with_llm(self, provider: impl LlmProvider + 'static) -> Self {
        self.with_resolver(LlmResolver::new(provider))
    }

    /// Use an already boxed LLM provider as the last mapping fallback.
    pub fn with_boxed_llm(mut self, provider: Box<dyn LlmProvider>) -> Self {
        self.mapper.push_resolver(Box::new(LlmResolver::boxed(provider)));
        self
    }

    pub fn mapper(&self) -> &SynonymMapper {
        &self.mapper
    }

    /// Load rules from `rules_path` and migrate `data_path`.
    pub fn run(
        &self,
        rules_path: impl AsRef<Path>,
        data_path: impl AsRef<Path>,
    ) -> Result<MigrationResult> {
        let rules = self.loader.load_file(rules_path)?;
        self.run_with_rules(&rules, data_path)
    }

    /// Migrate `data_path` against an already loaded catalog.
    pub fn run_with_rules(
        &self,
        rules: &RuleSet,
        data_path: impl AsRef<Path>,
    ) -> Result<MigrationResult> {
        let (table, source) = self.parser.parse_file(data_path)?;
        Ok(self.migrate(rules, &table, source))
    }

    /// Migrate a table already held in memory.
    pub fn run_table(&self, rules: &RuleSet, table: &DataTable) -> MigrationResult {
        self.migrate(rules, table, SourceMetadata::in_memory(table))
    }

    /// Load and validate a rules file without migrating anything.
    pub fn load_rules(&self, rules_path: impl AsRef<Path>) -> Result<RuleSet> {
        self.loader.load_file(rules_path)
    }

    /// Map the columns of `data_path` without validating.
    pub fn map_file(
        &self,
        rules: &RuleSet,
        data_path: impl AsRef<Path>,
    ) -> Result<(ColumnMapping, SourceMetadata)> {
        let (table, source) = self.parser.parse_file(data_path)?;
        Ok((self.mapper.map_table(&table, rules), source))
    }

    fn migrate(&self, rules: &RuleSet, table: &DataTable, source: SourceMetadata) -> MigrationResult {
        let mapping = self.mapper.map_table(table, rules);
        let missing_required_fields = mapping.missing_required(rules);
        let duplicate_targets = mapping.duplicate_targets();

        for field in &missing_required_fields {
            tracing::warn!(field = %field, "required field has no source column");
        }
        for (field, columns) in &duplicate_targets {
            tracing::warn!(
                field = %field,
                columns = ?columns,
                "several columns map to one field; the last one is kept"
            );
        }

        let report = self.validation.validate(table, &mapping, rules);
        let summary = MigrationSummary::compute(table, &mapping, &report);

        tracing::info!(
            file = %source.file,
            rows = summary.total_rows,
            mapped = summary.mapped_columns,
            unmapped = summary.unmapped_columns,
            issues = summary.total_issues,
            "migration finished"
        );

        let ValidationReport {
            cleaned,
            issues,
            field_summaries,
        } = report;

        MigrationResult {
            source,
            mapping,
            missing_required_fields,
            duplicate_targets,
            cleaned,
            issues,
            field_summaries,
            summary,
        }
    }
}

impl Default for Migrator {
    fn default() -> Self {
        Self::new()
    }
}
