//! Awl and Radd
//!
//! When the fixed shares claim more than the estate, every fixed share is
//! reduced proportionally (Awl). When they claim less and no residuary heir
//! takes the remainder, the remainder returns to the fixed-share heirs in
//! proportion to their shares (Radd). The two never apply together.

use log::warn;
use serde::{Deserialize, Serialize};

use super::residuary::Allocation;
use super::table::{Basis, ShareEntry};
use crate::config::{EngineConfig, RaddSpousePolicy};
use crate::error::{FaraidError, Result};
use crate::heirs::HeirRegistry;
use crate::rational::Rational;

/// Which adjustment, if any, the distribution needed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentOutcome {
    #[default]
    Balanced,
    AwlApplied,
    RaddApplied,
}

impl AdjustmentOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentOutcome::Balanced => "balanced",
            AdjustmentOutcome::AwlApplied => "awl_applied",
            AdjustmentOutcome::RaddApplied => "radd_applied",
        }
    }
}

/// Entries after adjustment, not yet validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjusted {
    pub entries: Vec<ShareEntry>,
    pub outcome: AdjustmentOutcome,
}

/// Merge fixed and residuary portions into one entry per eligible relation
fn combine(eligible: &HeirRegistry, allocation: &Allocation) -> Vec<ShareEntry> {
    eligible
        .iter()
        .map(|heir| {
            let fixed = allocation.fixed.fraction_of(heir.relation);
            let residuary = allocation.residuary.get(&heir.relation);
            let (fraction, basis) = match (fixed, residuary) {
                (Some(f), Some(r)) => (f + r, Basis::FixedAndResiduary),
                (Some(f), None) => (f.clone(), Basis::Fixed),
                (None, Some(r)) => (r.clone(), Basis::Residuary),
                (None, None) => (Rational::zero(), Basis::Residuary),
            };
            ShareEntry {
                relation: heir.relation,
                count: heir.count,
                fraction,
                basis,
            }
        })
        .collect()
}

fn apply_awl(entries: &mut [ShareEntry], fixed_total: &Rational) -> Result<()> {
    let factor = fixed_total.reciprocal()?;
    for entry in entries.iter_mut().filter(|e| has_fixed(e)) {
        entry.fraction = &entry.fraction * &factor;
        entry.basis = Basis::AwlAdjusted;
    }
    Ok(())
}

fn apply_radd(
    entries: &mut [ShareEntry],
    surplus: &Rational,
    config: &EngineConfig,
) -> Result<()> {
    let fixed_heirs = entries.iter().filter(|e| has_fixed(e)).count();
    let participates = |entry: &ShareEntry| {
        has_fixed(entry)
            && (!entry.relation.is_spouse()
                || fixed_heirs == 1
                || config.radd_spouse == RaddSpousePolicy::Include)
    };

    let pool: Rational = entries
        .iter()
        .filter(|e| participates(e))
        .map(|e| &e.fraction)
        .sum();
    if pool.is_zero() {
        return Err(FaraidError::DivisionByZero {
            operation: "radd participant total",
        });
    }

    for entry in entries.iter_mut() {
        if !participates(entry) {
            continue;
        }
        let returned = (surplus * &entry.fraction).checked_div(&pool)?;
        entry.fraction = &entry.fraction + &returned;
        entry.basis = Basis::RaddAdjusted;
    }
    Ok(())
}

fn has_fixed(entry: &ShareEntry) -> bool {
    matches!(entry.basis, Basis::Fixed | Basis::FixedAndResiduary)
}

/// Resolve over- or under-subscription of the estate.
pub fn adjust(
    eligible: &HeirRegistry,
    allocation: Allocation,
    config: &EngineConfig,
) -> Result<Adjusted> {
    let mut entries = combine(eligible, &allocation);
    let fixed_total = allocation.fixed_total();

    let outcome = if fixed_total > Rational::one() {
        warn!("fixed shares total {}, applying awl", fixed_total);
        apply_awl(&mut entries, &fixed_total)?;
        AdjustmentOutcome::AwlApplied
    } else if allocation.unassigned.is_positive() {
        warn!(
            "{} of the estate has no residuary heir, applying radd",
            allocation.unassigned
        );
        apply_radd(&mut entries, &allocation.unassigned, config)?;
        AdjustmentOutcome::RaddApplied
    } else {
        AdjustmentOutcome::Balanced
    };

    Ok(Adjusted { entries, outcome })
}
