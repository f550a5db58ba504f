//! Batch runner for many estate cases
//!
//! Holds one configured engine and runs cases across threads with rayon.
//! Results come back in input order, one per case, so a failing case never
//! hides the others.

use std::io::Write;
use std::path::Path;

use log::warn;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::distribution::{DistributionEngine, ShareTable};
use crate::error::Result;
use crate::heirs::EstateCase;

/// Outcome of one case in a batch
#[derive(Debug)]
pub struct CaseResult {
    pub case_id: String,
    pub result: Result<ShareTable>,
}

impl CaseResult {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Pre-configured runner for batches of cases
///
/// # Example
/// ```ignore
/// let runner = BatchRunner::from_config_path("engine.json")?;
/// let cases = load_cases("cases.csv")?;
/// for outcome in runner.run_batch(&cases) {
///     println!("{}: {:?}", outcome.case_id, outcome.result.map(|t| t.outcome()));
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchRunner {
    engine: DistributionEngine,
}

impl BatchRunner {
    /// Runner with the default rule policies
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            engine: DistributionEngine::new(config),
        }
    }

    /// Runner configured from a JSON file
    pub fn from_config_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::with_config(EngineConfig::from_json_path(path)?))
    }

    pub fn engine(&self) -> &DistributionEngine {
        &self.engine
    }

    /// Distribute a single case
    pub fn run(&self, case: &EstateCase) -> Result<ShareTable> {
        self.engine.distribute(&case.heirs, &case.estate)
    }

    /// Distribute every case in parallel, preserving input order
    pub fn run_batch(&self, cases: &[EstateCase]) -> Vec<CaseResult> {
        cases
            .par_iter()
            .map(|case| {
                let result = self.run(case);
                if let Err(err) = &result {
                    warn!("case {}: {}", case.case_id, err);
                }
                CaseResult {
                    case_id: case.case_id.clone(),
                    result,
                }
            })
            .collect()
    }
}

/// One output row: a relation's share in a case, or the case's error
#[derive(Debug, Serialize)]
struct ShareRow<'a> {
    #[serde(rename = "CaseID")]
    case_id: &'a str,
    #[serde(rename = "Relation")]
    relation: &'a str,
    #[serde(rename = "Count")]
    count: Option<u32>,
    #[serde(rename = "Fraction")]
    fraction: String,
    #[serde(rename = "PerHead")]
    per_head: String,
    #[serde(rename = "Basis")]
    basis: &'a str,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Outcome")]
    outcome: &'a str,
    #[serde(rename = "Error")]
    error: String,
}

/// Write batch results as CSV, one row per inheriting relation.
///
/// A failed case produces a single row carrying the error message.
pub fn write_results<W: Write>(writer: W, results: &[CaseResult]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    for outcome in results {
        let table = match &outcome.result {
            Ok(table) => table,
            Err(err) => {
                csv.serialize(ShareRow {
                    case_id: &outcome.case_id,
                    relation: "",
                    count: None,
                    fraction: String::new(),
                    per_head: String::new(),
                    basis: "",
                    amount: String::new(),
                    outcome: "",
                    error: err.to_string(),
                })?;
                continue;
            }
        };

        let amounts = table.apportion()?;
        for (entry, amount) in table.entries().iter().zip(&amounts) {
            csv.serialize(ShareRow {
                case_id: &outcome.case_id,
                relation: entry.relation.as_str(),
                count: Some(entry.count),
                fraction: entry.fraction.to_string(),
                per_head: entry.per_head()?.to_string(),
                basis: entry.basis.as_str(),
                amount: amount.amount.to_string(),
                outcome: table.outcome().as_str(),
                error: String::new(),
            })?;
        }
    }

    csv.flush()?;
    Ok(())
}
