//! Rules command - print a rules catalog.

use std::path::PathBuf;

use colored::Colorize;

use super::{load_rules, CommandResult};

pub fn run(rules: Option<PathBuf>, json: bool) -> CommandResult {
    let catalog = load_rules(rules.as_deref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    let source = rules
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in CMMS catalog".to_string());
    println!("{} {}", "Rules from".cyan().bold(), source.white());
    println!();

    for rule in catalog.rules() {
        let required = if rule.required {
            "required".red()
        } else {
            "optional".dimmed()
        };
        println!("  {} ({}, {})", rule.name.bold(), rule.field_type, required);

        if let Some(aliases) = catalog.synonyms().aliases(&rule.name) {
            if !aliases.is_empty() {
                let aliases: Vec<&str> = aliases.iter().map(String::as_str).collect();
                println!("    synonyms: {}", aliases.join(", "));
            }
        }
        if rule.has_reference_values() {
            let values: Vec<&str> = rule.reference_values.iter().map(String::as_str).collect();
            println!("    allowed:  {}", values.join(", "));
        }
    }

    println!();
    println!(
        "{} fields, {} required",
        catalog.len().to_string().white().bold(),
        catalog.required_fields().count()
    );
    Ok(())
}
