//! fieldmap: moves legacy maintenance spreadsheets into a CMMS import layout.
//!
//! A migration has three steps:
//!
//! - **Load rules**: a rules table names every target field with its type,
//!   required flag, synonyms, and optional reference list ([`RuleSetLoader`]).
//! - **Map columns**: each input header is resolved to a canonical field by
//!   exact name, synonym, and optionally similarity or an LLM
//!   ([`SynonymMapper`]).
//! - **Validate and clean**: every mapped cell is checked and coerced, and
//!   every problem is logged with its spreadsheet row ([`ValidationEngine`]).
//!
//! The original data is never modified. Cell-level problems are collected in
//! an [`IssueLog`]; only unreadable input or malformed rules abort a run.
//!
//! # Example
//!
//! ```no_run
//! use fieldmap::Migrator;
//!
//! let result = Migrator::new().run("rules.csv", "legacy_export.xlsx").unwrap();
//!
//! println!("Mapped columns: {}", result.summary.mapped_columns);
//! println!("Issues: {}", result.issues.len());
//! ```

pub mod error;
pub mod input;
pub mod llm;
pub mod mapping;
pub mod rules;
#[cfg(feature = "template")]
pub mod template;
pub mod validation;

mod migration;

pub use crate::migration::{
    MigrationConfig, MigrationResult, MigrationSummary, Migrator, RunOutcome,
};
pub use error::{FieldmapError, Result};
pub use input::{DataTable, Parser, ParserConfig, SourceMetadata};
pub use llm::{
    AnthropicProvider, LlmConfig, LlmProvider, LlmResolver, MockProvider, OllamaProvider,
    OpenAIProvider,
};
pub use mapping::{
    ColumnMapping, ColumnResolver, FuzzyConfig, MapperConfig, MappingDecision, MappingTarget,
    MatchMethod, SynonymMapper,
};
pub use rules::{FieldRule, FieldType, RuleSet, RuleSetLoader};
#[cfg(feature = "template")]
pub use template::TemplateBuilder;
pub use validation::{
    clean_cell, CellValue, CleanedTable, FieldSummary, IssueKind, IssueLog, ValidationEngine,
    ValidationIssue, ValidationReport,
};
