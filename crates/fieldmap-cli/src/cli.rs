//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// fieldmap: move legacy maintenance spreadsheets into a CMMS import layout
#[derive(Parser)]
#[command(name = "fieldmap")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Map, validate, and clean a data file
    Run {
        #[command(flatten)]
        inputs: InputArgs,

        /// Directory for the cleaned, issues, and mapping files (default: next to the data file)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Print the full result as JSON instead of writing files
        #[arg(long)]
        json: bool,
    },

    /// Show how each column of a data file would be mapped
    Map {
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Load and print a rules catalog
    Rules {
        /// Rules file (default: the built-in CMMS catalog)
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a blank data-entry workbook for a rules catalog
    #[cfg(feature = "template")]
    Template {
        /// Rules file (default: the built-in CMMS catalog)
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Output workbook path
        #[arg(short, long, default_value = "cmms_template.xlsx")]
        output: PathBuf,
    },
}

/// Arguments shared by commands that read a data file.
#[derive(Args)]
pub struct InputArgs {
    /// Rules file (CSV or spreadsheet)
    #[arg(short, long)]
    pub rules: PathBuf,

    /// Data file to migrate (CSV or spreadsheet)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Fall back to similarity matching, with an optional cutoff (0.0-1.0)
    #[arg(long, value_name = "CUTOFF", num_args = 0..=1, default_missing_value = "0.6")]
    pub fuzzy: Option<f64>,

    /// LLM provider used as the last mapping fallback
    #[arg(long, default_value = "none")]
    pub llm: LlmProviderChoice,

    /// Model to use (provider-specific, e.g., "gpt-4o", "llama3.2")
    #[arg(long)]
    pub model: Option<String>,

    /// JSON configuration file (parser and mapper settings)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// LLM provider choice for column mapping
#[derive(Clone, Debug, Default)]
pub enum LlmProviderChoice {
    /// No LLM - synonym and similarity matching only
    #[default]
    None,
    /// Anthropic Claude API (requires ANTHROPIC_API_KEY)
    Anthropic,
    /// OpenAI GPT API (requires OPENAI_API_KEY)
    OpenAI,
    /// Ollama local models (requires Ollama running)
    Ollama,
    /// Mock provider for testing
    Mock,
}

impl std::str::FromStr for LlmProviderChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(LlmProviderChoice::None),
            "anthropic" | "claude" => Ok(LlmProviderChoice::Anthropic),
            "openai" | "gpt" => Ok(LlmProviderChoice::OpenAI),
            "ollama" | "local" => Ok(LlmProviderChoice::Ollama),
            "mock" | "test" => Ok(LlmProviderChoice::Mock),
            _ => Err(format!(
                "Unknown provider: {}. Use: none, anthropic, openai, ollama, or mock.",
                s
            )),
        }
    }
}

impl std::fmt::Display for LlmProviderChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProviderChoice::None => write!(f, "none"),
            LlmProviderChoice::Anthropic => write!(f, "anthropic"),
            LlmProviderChoice::OpenAI => write!(f, "openai"),
            LlmProviderChoice::Ollama => write!(f, "ollama"),
            LlmProviderChoice::Mock => write!(f, "mock"),
        }
    }
}
