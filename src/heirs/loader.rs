//! Load inheritance cases from CSV
//!
//! One row per (case, relation). Rows of the same case must repeat the same
//! estate value. A row with an empty relation declares a case with no
//! surviving heirs.
//!
//! ```text
//! CaseID,Estate,Relation,Count
//! A-1,90000,husband,1
//! A-1,90000,daughter,1
//! ```

use std::collections::HashMap;
use std::path::Path;

use csv::Reader;
use serde::{Deserialize, Serialize};

use super::{HeirRegistry, Relation};
use crate::error::{FaraidError, Result};
use crate::estate::EstateValue;

/// A decedent's heirs together with the estate to divide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstateCase {
    pub case_id: String,
    pub estate: EstateValue,
    pub heirs: HeirRegistry,
}

/// Raw CSV row
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "CaseID")]
    case_id: String,
    #[serde(rename = "Estate")]
    estate: String,
    #[serde(rename = "Relation", default)]
    relation: String,
    #[serde(rename = "Count", default)]
    count: Option<u32>,
}

/// Cases under construction, in order of first appearance
struct PendingCase {
    case_id: String,
    estate: EstateValue,
    entries: Vec<(Relation, u32)>,
}

/// Load all cases from a CSV file
pub fn load_cases<P: AsRef<Path>>(path: P) -> Result<Vec<EstateCase>> {
    let reader = Reader::from_path(path)?;
    collect_cases(reader)
}

/// Load cases from any reader (e.g., string buffer, network stream)
pub fn load_cases_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<EstateCase>> {
    collect_cases(Reader::from_reader(reader))
}

fn collect_cases<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<EstateCase>> {
    let mut pending: Vec<PendingCase> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        let estate: EstateValue = row.estate.parse()?;

        let slot = match index.get(&row.case_id) {
            Some(&i) => {
                if pending[i].estate != estate {
                    return Err(FaraidError::InvalidEstate(format!(
                        "case {} lists estate {} and {}",
                        row.case_id, pending[i].estate, estate
                    )));
                }
                i
            }
            None => {
                index.insert(row.case_id.clone(), pending.len());
                pending.push(PendingCase {
                    case_id: row.case_id.clone(),
                    estate,
                    entries: Vec::new(),
                });
                pending.len() - 1
            }
        };

        if row.relation.trim().is_empty() {
            continue;
        }
        let relation: Relation = row.relation.parse()?;
        pending[slot].entries.push((relation, row.count.unwrap_or(1)));
    }

    pending
        .into_iter()
        .map(|case| {
            let heirs = HeirRegistry::from_entries(case.entries).map_err(|e| match e {
                FaraidError::InvalidRegistry(msg) => {
                    FaraidError::InvalidRegistry(format!("case {}: {}", case.case_id, msg))
                }
                other => other,
            })?;
            Ok(EstateCase {
                case_id: case.case_id,
                estate: case.estate,
                heirs,
            })
        })
        .collect()
}
