//! fieldmap CLI - CMMS data migration tool.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            inputs,
            out_dir,
            json,
        } => commands::run::run(inputs, out_dir, json),

        Commands::Map { inputs } => commands::map::run(inputs),

        Commands::Rules { rules, json } => commands::rules::run(rules, json),

        #[cfg(feature = "template")]
        Commands::Template { rules, output } => commands::template::run(rules, output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
