//! Example: Clean a customer file with the mock enrichment provider.
//!
//! Usage:
//!   cargo run --example clean -- <input> <output>

use std::env;

use cleanroom::{MockProvider, Pipeline, RunStatus};

fn main() -> cleanroom::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: cargo run --example clean -- <input> <output>");
        std::process::exit(1);
    }

    let pipeline = Pipeline::new().with_llm(MockProvider::new());
    let outcome = pipeline.run_file(&args[1], &args[2])?;

    println!("Status: {:?}", outcome.status);
    println!("Iterations: {}", outcome.iterations);
    println!("Detection runs: {}", outcome.detection_runs);
    println!("Enrichments applied: {}", outcome.enrichments_applied);

    if outcome.status == RunStatus::Unresolved {
        println!();
        println!("Unresolved rows:");
        for row in &outcome.unresolved {
            println!("  {}: {}", row.row, row.issues);
        }
    }

    println!();
    println!("## Audit trail");
    for entry in outcome.audit.entries() {
        println!("  {}", entry);
    }

    Ok(())
}
