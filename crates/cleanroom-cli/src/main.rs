//! Cleanroom CLI - iterative customer data cleaning.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            input,
            output,
            log,
            config,
            llm,
            model,
            max_iterations,
            timeout,
            json,
        } => commands::run::run(
            commands::run::RunArgs {
                input,
                output,
                log,
                config,
                llm,
                model,
                max_iterations,
                timeout,
            },
            json,
            cli.verbose,
        ),

        Commands::Detect { file, output, json } => {
            commands::detect::run(file, output, json, cli.verbose)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Audit events go to stderr; `RUST_LOG` overrides the level.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
