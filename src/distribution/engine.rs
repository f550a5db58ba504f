//! Distribution engine: runs the full pipeline for one estate

use log::info;

use super::adjustment;
use super::eligibility;
use super::fixed;
use super::residuary;
use super::table::{self, ShareTable};
use crate::config::EngineConfig;
use crate::error::{FaraidError, Result};
use crate::estate::{EstateValue, GrossEstate};
use crate::heirs::HeirRegistry;

/// Main distribution engine
///
/// Stateless apart from its configuration, so one engine can serve any number
/// of cases, including concurrently.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistributionEngine {
    config: EngineConfig,
}

impl DistributionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Divide `estate` among the heirs in `registry`.
    ///
    /// Blocking, fixed shares, residuary distribution and Awl/Radd run in that
    /// order. The returned table always sums to exactly one.
    pub fn distribute(&self, registry: &HeirRegistry, estate: &EstateValue) -> Result<ShareTable> {
        if registry.is_empty() {
            return Err(FaraidError::NoEligibleHeirs);
        }

        let eligibility = eligibility::resolve(registry, &self.config)?;
        let eligible = eligibility.eligible;
        if eligible.is_empty() {
            return Err(FaraidError::NoEligibleHeirs);
        }

        let fixed = fixed::allocate(&eligible, registry)?;
        let allocation = residuary::allocate(&eligible, fixed)?;
        let adjusted = adjustment::adjust(&eligible, allocation, &self.config)?;
        let outcome = adjusted.outcome;

        let table = table::assemble(adjusted, &eligible, eligibility.blocked, estate.clone())?;
        info!(
            "distributed {} among {} relations ({} blocked), outcome {}",
            estate,
            table.entries().len(),
            table.blocked().len(),
            outcome.as_str()
        );
        Ok(table)
    }

    /// Settle funeral costs, debts and bequests, then distribute the rest.
    pub fn distribute_gross(&self, registry: &HeirRegistry, gross: &GrossEstate) -> Result<ShareTable> {
        let net = gross.net()?;
        self.distribute(registry, &net)
    }
}
