//! Map command - show how each column would be mapped.

use colored::Colorize;

use super::{build_migrator, print_mapping, CommandResult};
use crate::cli::InputArgs;

pub fn run(inputs: InputArgs) -> CommandResult {
    let migrator = build_migrator(&inputs)?;
    let rules = migrator.load_rules(&inputs.rules)?;
    let (mapping, source) = migrator.map_file(&rules, &inputs.data)?;

    println!(
        "{} {} ({} columns)",
        "Mapping".cyan().bold(),
        source.file.white(),
        mapping.len()
    );
    println!();
    print_mapping(&mapping);

    let missing = mapping.missing_required(&rules);
    if !missing.is_empty() {
        println!();
        println!(
            "{} {}",
            "Required fields with no matching column:".yellow().bold(),
            missing.join(", ")
        );
    }

    println!();
    println!(
        "{} of {} columns mapped",
        mapping.mapped_count().to_string().white().bold(),
        mapping.len()
    );
    Ok(())
}
