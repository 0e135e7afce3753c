//! Field rule catalogs and the rules-table loader.

mod builtin;
mod catalog;
mod loader;
mod types;

pub use catalog::{normalize_name, RuleSet, SynonymCatalog};
pub use loader::{
    parse_reference_values, parse_required, parse_synonyms, RuleSetLoader, FIELD_NAME_COLUMN,
    REFERENCE_VALUES_COLUMN, REQUIRED_COLUMN, SYNONYMS_COLUMN, TYPE_COLUMN,
};
pub use types::{FieldRule, FieldType};
