//! Run command - map, validate, and clean a data file.

use std::fs::File;
use std::path::{Path, PathBuf};

use colored::Colorize;
use fieldmap::{MigrationResult, RunOutcome};

use super::{build_migrator, print_mapping, CommandResult};
use crate::cli::InputArgs;

/// Output file paths for one data file.
pub struct OutputPaths {
    pub cleaned: PathBuf,
    pub issues: PathBuf,
    pub mapping: PathBuf,
}

impl OutputPaths {
    pub fn new(data: &Path, out_dir: Option<&Path>) -> Self {
        let stem = data
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "data".to_string());
        let dir = out_dir
            .map(Path::to_path_buf)
            .or_else(|| data.parent().map(Path::to_path_buf))
            .unwrap_or_default();

        Self {
            cleaned: dir.join(format!("{}_cleaned.csv", stem)),
            issues: dir.join(format!("{}_issues.csv", stem)),
            mapping: dir.join(format!("{}_mapping.csv", stem)),
        }
    }
}

pub fn run(inputs: InputArgs, out_dir: Option<PathBuf>, json: bool) -> CommandResult {
    if !inputs.data.exists() {
        return Err(format!("File not found: {}", inputs.data.display()).into());
    }

    let migrator = build_migrator(&inputs)?;
    let result = migrator.run(&inputs.rules, &inputs.data)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Migrating".cyan().bold(),
        inputs.data.display().to_string().white()
    );
    println!();
    print_mapping(&result.mapping);
    print_warnings(&result);

    if let Some(dir) = &out_dir {
        std::fs::create_dir_all(dir)
            .map_err(|e| format!("Cannot create {}: {}", dir.display(), e))?;
    }
    let paths = OutputPaths::new(&inputs.data, out_dir.as_deref());
    write_outputs(&result, &paths)?;

    println!();
    print_field_summaries(&result);
    println!();
    print_outcome(&result, &paths);
    Ok(())
}

fn write_outputs(result: &MigrationResult, paths: &OutputPaths) -> CommandResult {
    result.cleaned.write_path(&paths.cleaned)?;
    let issues = File::create(&paths.issues)
        .map_err(|e| format!("Cannot create {}: {}", paths.issues.display(), e))?;
    result.issues.write_csv(issues)?;
    let mapping = File::create(&paths.mapping)
        .map_err(|e| format!("Cannot create {}: {}", paths.mapping.display(), e))?;
    result.mapping.write_csv(mapping)?;
    Ok(())
}

fn print_warnings(result: &MigrationResult) {
    if !result.missing_required_fields.is_empty() {
        println!();
        println!("{}", "Required fields with no matching column:".yellow().bold());
        for field in &result.missing_required_fields {
            println!("  - {}", field.yellow());
        }
    }

    if !result.duplicate_targets.is_empty() {
        println!();
        println!("{}", "Fields claimed by more than one column:".yellow().bold());
        for (field, columns) in &result.duplicate_targets {
            println!(
                "  - {} <- {} (last column kept)",
                field.yellow(),
                columns.join(", ")
            );
        }
    }
}

fn print_field_summaries(result: &MigrationResult) {
    if result.field_summaries.is_empty() {
        return;
    }
    println!("{}", "Per-field results:".bold());
    for summary in &result.field_summaries {
        let issues = summary.issue_count();
        let count = if issues == 0 {
            "ok".green()
        } else {
            format!("{} issues", issues).red()
        };
        println!(
            "  {:24} {} ({} missing required, {} invalid type, {} not in reference list)",
            summary.field, count, summary.missing_required, summary.invalid_type,
            summary.reference_mismatches
        );
    }
}

fn print_outcome(result: &MigrationResult, paths: &OutputPaths) {
    match result.summary.outcome {
        RunOutcome::Clean => {
            println!("{}", "No issues found - data is ready to import!".green().bold());
        }
        RunOutcome::IssuesFound => {
            println!(
                "Found {} issues in {} rows",
                result.summary.total_issues.to_string().red().bold(),
                result.summary.total_rows
            );
        }
        RunOutcome::NothingMapped => {
            println!(
                "{}",
                "No columns matched the rules - nothing was validated.".yellow().bold()
            );
        }
    }

    println!("{} {}", "Cleaned data:".green(), paths.cleaned.display());
    println!("{} {}", "Issue log:".green(), paths.issues.display());
    println!("{} {}", "Column mapping:".green(), paths.mapping.display());
}
