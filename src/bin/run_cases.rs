//! Run every case in a CSV file and write the share tables
//!
//! Usage: run_cases [input.csv] [output.csv]
//! Defaults to data/sample_cases.csv and case_shares_output.csv

use std::collections::BTreeMap;
use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::time::Instant;

use anyhow::{Context, Result};
use faraid_engine::batch::write_results;
use faraid_engine::heirs::load_cases;
use faraid_engine::{AdjustmentOutcome, BatchRunner};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let input = args.next().unwrap_or_else(|| "data/sample_cases.csv".to_string());
    let output = args.next().unwrap_or_else(|| "case_shares_output.csv".to_string());

    let start = Instant::now();
    println!("Loading cases from {}...", input);
    let cases = load_cases(&input).with_context(|| format!("failed to load {}", input))?;
    println!("Loaded {} cases in {:?}", cases.len(), start.elapsed());

    println!("Distributing...");
    let run_start = Instant::now();
    let results = BatchRunner::new().run_batch(&cases);
    println!("Distribution complete in {:?}", run_start.elapsed());

    let file = File::create(&output).with_context(|| format!("failed to create {}", output))?;
    write_results(BufWriter::new(file), &results)?;
    println!("Output written to {}", output);

    // Outcome counts, failures listed by message
    let mut outcomes: BTreeMap<&str, usize> = BTreeMap::new();
    for result in &results {
        let label = match &result.result {
            Ok(table) => match table.outcome() {
                AdjustmentOutcome::Balanced => "balanced",
                AdjustmentOutcome::AwlApplied => "awl",
                AdjustmentOutcome::RaddApplied => "radd",
            },
            Err(_) => "failed",
        };
        *outcomes.entry(label).or_default() += 1;
    }

    println!("\nBatch Summary:");
    for (label, count) in &outcomes {
        println!("  {:<10} {}", label, count);
    }
    for result in &results {
        if let Err(err) = &result.result {
            println!("  {}: {}", result.case_id, err);
        }
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
