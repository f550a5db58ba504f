//! Fara'id CLI
//!
//! Command-line interface for distributing a single estate or a CSV batch

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use faraid_engine::batch::write_results;
use faraid_engine::heirs::load_cases;
use faraid_engine::{
    BatchRunner, DistributionEngine, EngineConfig, EstateValue, HeirRegistry, Relation, ShareTable,
};

#[derive(Parser)]
#[command(name = "faraid", version, about = "Exact Islamic inheritance share distribution")]
struct Cli {
    /// JSON file overriding the rule policies
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Distribute one estate among the given heirs
    Compute {
        /// Heir as relation=count (count defaults to 1), repeatable
        #[arg(long = "heir", value_parser = parse_heir)]
        heirs: Vec<(Relation, u32)>,

        /// Net estate value, integer, decimal or n/d
        #[arg(long)]
        estate: EstateValue,

        /// Print the share table as JSON
        #[arg(long)]
        json: bool,
    },
    /// Distribute every case of a CSV file
    Batch {
        /// Input CSV with CaseID,Estate,Relation,Count
        #[arg(long)]
        input: PathBuf,

        /// Output CSV (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn parse_heir(arg: &str) -> std::result::Result<(Relation, u32), String> {
    let (name, count) = match arg.split_once('=') {
        Some((name, count)) => {
            let count = count
                .trim()
                .parse::<u32>()
                .map_err(|e| format!("invalid count in '{}': {}", arg, e))?;
            (name, count)
        }
        None => (arg, 1),
    };
    let relation = name.parse::<Relation>().map_err(|e| e.to_string())?;
    Ok((relation, count))
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_json_path(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn print_table(table: &ShareTable) -> Result<()> {
    println!("Estate: {}", table.estate());
    println!("Outcome: {}", table.outcome().as_str());
    println!("Base: {}", table.base());
    println!();
    println!(
        "{:<24} {:>5} {:>12} {:>12} {:>22} {:>16}",
        "Relation", "Count", "Share", "Per head", "Basis", "Amount"
    );
    println!("{}", "-".repeat(96));

    let amounts = table.apportion()?;
    for (entry, amount) in table.entries().iter().zip(&amounts) {
        println!(
            "{:<24} {:>5} {:>12} {:>12} {:>22} {:>16.2}",
            entry.relation.as_str(),
            entry.count,
            entry.fraction.to_string(),
            entry.per_head()?.to_string(),
            entry.basis.as_str(),
            amount.amount.to_f64()
        );
    }

    if !table.blocked().is_empty() {
        println!();
        println!("Excluded:");
        for exclusion in table.blocked() {
            println!("  {} x{}: {:?}", exclusion.relation, exclusion.count, exclusion.reason);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Compute { heirs, estate, json } => {
            let registry = HeirRegistry::from_entries(heirs).context("invalid heirs")?;
            let table = DistributionEngine::new(config)
                .distribute(&registry, &estate)
                .context("distribution failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                print_table(&table)?;
            }
        }
        Command::Batch { input, output } => {
            let cases = load_cases(&input)
                .with_context(|| format!("failed to load cases from {}", input.display()))?;
            let results = BatchRunner::with_config(config).run_batch(&cases);
            let failed = results.iter().filter(|r| !r.is_ok()).count();

            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    write_results(BufWriter::new(file), &results)?;
                    eprintln!("Wrote {} cases to {}", results.len(), path.display());
                }
                None => write_results(io::stdout().lock(), &results)?,
            }

            if failed > 0 {
                eprintln!("{} of {} cases failed", failed, results.len());
            }
        }
    }

    Ok(())
}
