//! LLM provider integration for column mapping.
//!
//! A language model can act as the last resolver in a
//! [`SynonymMapper`](crate::SynonymMapper) chain, suggesting a field for
//! columns that neither the synonym catalog nor similarity matching could
//! place. The integration is optional: fieldmap works fully without it.
//!
//! # Supported Providers
//!
//! - **Anthropic** - Claude models via API (requires `ANTHROPIC_API_KEY`)
//! - **OpenAI** - GPT models via API (requires `OPENAI_API_KEY`)
//! - **Ollama** - Local models, no API key needed (requires Ollama installed)
//!
//! # Example
//!
//! ```no_run
//! use fieldmap::{Migrator, OllamaProvider};
//!
//! let migrator = Migrator::new().with_llm(OllamaProvider::new().unwrap());
//! ```

mod anthropic;
mod mock;
mod ollama;
mod openai;
mod prompts;
mod provider;
mod resolver;

pub use anthropic::AnthropicProvider;
pub use mock::MockProvider;
pub use ollama::{OllamaProvider, DEFAULT_MODEL as OLLAMA_DEFAULT_MODEL};
pub use openai::{OpenAIProvider, DEFAULT_MODEL as OPENAI_DEFAULT_MODEL};
pub use prompts::{field_suggestion_prompt, system_prompt};
pub use provider::{FieldSuggestion, LlmConfig, LlmProvider};
pub use resolver::LlmResolver;
