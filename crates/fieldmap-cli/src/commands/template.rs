//! Template command - write a blank data-entry workbook.

use std::path::PathBuf;

use colored::Colorize;
use fieldmap::TemplateBuilder;

use super::{load_rules, CommandResult};

pub fn run(rules: Option<PathBuf>, output: PathBuf) -> CommandResult {
    let catalog = load_rules(rules.as_deref())?;
    TemplateBuilder::new(&catalog).save(&output)?;

    println!(
        "{} {} ({} fields)",
        "Saved template to".green().bold(),
        output.display().to_string().white(),
        catalog.len()
    );
    Ok(())
}
