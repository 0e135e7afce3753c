//! Mapping of input column names onto canonical fields.
//!
//! [`SynonymMapper`] runs a chain of [`ColumnResolver`] strategies. The
//! exact/alias [`SynonymResolver`] always runs first; [`FuzzyResolver`] and
//! the LLM-backed resolver in [`crate::llm`] are optional fallbacks.

mod decision;
mod fuzzy;
mod mapper;
mod resolver;

pub use decision::{ColumnMapping, MappingDecision, MappingTarget, MatchMethod, UNMAPPED};
pub use fuzzy::{similarity, FuzzyConfig, FuzzyResolver};
pub use mapper::{MapperConfig, SynonymMapper};
pub use resolver::{ColumnContext, ColumnResolver, Resolution, SynonymResolver};
