//! Engine configuration for points where the schools of law differ
//!
//! Both settings default to the documented policy. A JSON file can override
//! either one; missing fields keep their defaults.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Whether a surviving spouse takes part in Radd
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaddSpousePolicy {
    /// Spouse keeps the fixed share only, unless no other heir survives
    #[default]
    ExcludeUnlessSole,
    /// Spouse shares in the redistribution like any other fixed-share heir
    Include,
}

/// Treatment of a paternal grandfather alongside full or consanguine siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrandfatherSiblingsPolicy {
    /// Refuse the configuration with `UnsupportedConfiguration`
    #[default]
    Reject,
    /// The grandfather excludes the siblings, as the father would
    GrandfatherExcludes,
}

/// Settings for a distribution run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub radd_spouse: RaddSpousePolicy,
    pub grandfather_with_siblings: GrandfatherSiblingsPolicy,
}

impl EngineConfig {
    /// Load configuration from a JSON file
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_json_reader(BufReader::new(file))
    }

    /// Load configuration from any JSON reader
    pub fn from_json_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}
