//! CLI command implementations.

pub mod map;
pub mod rules;
pub mod run;
#[cfg(feature = "template")]
pub mod template;

use std::path::Path;

use colored::Colorize;
use fieldmap::{
    AnthropicProvider, ColumnMapping, FuzzyConfig, LlmConfig, MatchMethod, MigrationConfig,
    Migrator, MockProvider, OllamaProvider, OpenAIProvider, RuleSet, RuleSetLoader,
};

use crate::cli::{InputArgs, LlmProviderChoice};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Build a migrator from the shared input flags.
///
/// Flags override values from the configuration file.
pub fn build_migrator(inputs: &InputArgs) -> Result<Migrator, Box<dyn std::error::Error>> {
    let mut config = match &inputs.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
            serde_json::from_str::<MigrationConfig>(&raw)?
        }
        None => MigrationConfig::default(),
    };

    if let Some(cutoff) = inputs.fuzzy {
        config.mapper.fuzzy = Some(FuzzyConfig { cutoff });
    }
    config.validate()?;

    let migrator = Migrator::with_config(config);
    let llm_config = |default_model: &str| LlmConfig {
        model: inputs
            .model
            .clone()
            .unwrap_or_else(|| default_model.to_string()),
        ..LlmConfig::default()
    };

    tracing::debug!(provider = %inputs.llm, "building migrator");
    Ok(match inputs.llm {
        LlmProviderChoice::None => migrator,
        LlmProviderChoice::Anthropic => migrator.with_llm(AnthropicProvider::from_env_with_config(
            llm_config(&LlmConfig::default().model),
        )?),
        LlmProviderChoice::OpenAI => migrator.with_llm(OpenAIProvider::from_env_with_config(
            llm_config(fieldmap::llm::OPENAI_DEFAULT_MODEL),
        )?),
        LlmProviderChoice::Ollama => migrator.with_llm(OllamaProvider::with_config(llm_config(
            fieldmap::llm::OLLAMA_DEFAULT_MODEL,
        ))?),
        LlmProviderChoice::Mock => migrator.with_llm(MockProvider::new()),
    })
}

/// Load rules from a file, or fall back to the built-in catalog.
pub fn load_rules(path: Option<&Path>) -> Result<RuleSet, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => RuleSetLoader::new().load_file(path)?,
        None => RuleSet::builtin_cmms()?,
    })
}

/// Print the mapping as an aligned table.
pub fn print_mapping(mapping: &ColumnMapping) {
    let width = mapping
        .iter()
        .map(|(column, _)| column.chars().count())
        .max()
        .unwrap_or(0)
        .max("Your Column".len());

    let header = format!("{:width$}  {:24} ", "Your Column", "Mapped To", width = width);
    println!("  {}{}", header.bold(), "Method".bold());
    for (column, decision) in mapping.iter() {
        let target = format!("{:24}", decision.target.to_string());
        let target = if decision.target.is_unmapped() {
            target.dimmed()
        } else {
            target.green()
        };
        let method = match decision.method {
            MatchMethod::Fuzzy { score } => format!("{} ({:.2})", decision.method.label(), score),
            _ => decision.method.label().to_string(),
        };
        println!("  {:width$}  {} {}", column, target, method, width = width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(config: Option<std::path::PathBuf>, fuzzy: Option<f64>) -> InputArgs {
        InputArgs {
            rules: "rules.csv".into(),
            data: "data.csv".into(),
            fuzzy,
            llm: LlmProviderChoice::None,
            model: None,
            config,
        }
    }

    #[test]
    fn test_config_file_cutoff_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"mapper": {"fuzzy": {"cutoff": 5.0}}}"#).unwrap();

        let err = build_migrator(&inputs(Some(path), None)).err().unwrap();
        assert!(err.to_string().contains("fuzzy cutoff"));
    }

    #[test]
    fn test_flag_overrides_config_cutoff() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"mapper": {"fuzzy": {"cutoff": 5.0}}}"#).unwrap();

        let migrator = build_migrator(&inputs(Some(path), Some(0.7))).unwrap();
        assert_eq!(migrator.mapper().resolver_names(), vec!["synonym", "fuzzy"]);
    }

    #[test]
    fn test_flag_cutoff_validated() {
        assert!(build_migrator(&inputs(None, Some(-1.0))).is_err());
    }
}
