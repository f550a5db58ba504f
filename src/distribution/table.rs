//! Final share table and its invariants

use std::collections::BTreeSet;

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use super::adjustment::{AdjustmentOutcome, Adjusted};
use super::eligibility::Exclusion;
use crate::error::{FaraidError, Result};
use crate::estate::EstateValue;
use crate::heirs::{HeirRegistry, Relation};
use crate::rational::Rational;

/// Rule that produced a share, for audit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Basis {
    Fixed,
    Residuary,
    /// Fixed one sixth plus the residue (father or grandfather beside
    /// female descendants)
    FixedAndResiduary,
    RaddAdjusted,
    AwlAdjusted,
}

impl Basis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Basis::Fixed => "fixed",
            Basis::Residuary => "residuary",
            Basis::FixedAndResiduary => "fixed-and-residuary",
            Basis::RaddAdjusted => "radd-adjusted",
            Basis::AwlAdjusted => "awl-adjusted",
        }
    }
}

/// Share of one relation, covering all of its heirs together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareEntry {
    pub relation: Relation,
    pub count: u32,
    pub fraction: Rational,
    pub basis: Basis,
}

impl ShareEntry {
    /// Fraction of the estate each individual heir of the relation receives
    pub fn per_head(&self) -> Result<Rational> {
        self.fraction.split(self.count)
    }
}

/// A share converted into an amount of the estate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Apportionment {
    pub relation: Relation,
    pub count: u32,
    pub amount: Rational,
    pub amount_per_head: Rational,
}

/// Validated distribution of an estate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareTable {
    entries: Vec<ShareEntry>,
    total_fraction: Rational,
    outcome: AdjustmentOutcome,
    blocked: Vec<Exclusion>,
    estate: EstateValue,
}

impl ShareTable {
    /// Entries in relation order
    pub fn entries(&self) -> &[ShareEntry] {
        &self.entries
    }

    /// Always exactly one
    pub fn total_fraction(&self) -> &Rational {
        &self.total_fraction
    }

    pub fn outcome(&self) -> AdjustmentOutcome {
        self.outcome
    }

    /// Relations present in the registry that receive nothing, and why
    pub fn blocked(&self) -> &[Exclusion] {
        &self.blocked
    }

    pub fn estate(&self) -> &EstateValue {
        &self.estate
    }

    pub fn entry(&self, relation: Relation) -> Option<&ShareEntry> {
        self.entries.iter().find(|e| e.relation == relation)
    }

    /// Fraction held by `relation`, zero when it does not inherit
    pub fn fraction_of(&self, relation: Relation) -> Rational {
        self.entry(relation)
            .map(|e| e.fraction.clone())
            .unwrap_or_else(Rational::zero)
    }

    /// Least common denominator of all shares (the base of the problem)
    pub fn base(&self) -> BigInt {
        Rational::common_denominator(self.entries.iter().map(|e| &e.fraction))
    }

    /// Each relation's share expressed as a numerator over [`base`](Self::base)
    pub fn shares_over_base(&self) -> Vec<(Relation, BigInt)> {
        let base = self.base();
        self.entries
            .iter()
            .filter_map(|e| e.fraction.numer_over(&base).map(|n| (e.relation, n)))
            .collect()
    }

    /// Convert every share into an exact amount of the estate
    pub fn apportion(&self) -> Result<Vec<Apportionment>> {
        self.entries
            .iter()
            .map(|e| {
                let amount = self.estate.amount_of(&e.fraction);
                let amount_per_head = amount.split(e.count)?;
                Ok(Apportionment {
                    relation: e.relation,
                    count: e.count,
                    amount,
                    amount_per_head,
                })
            })
            .collect()
    }
}

/// Check the invariants of an adjusted distribution and freeze it.
pub fn assemble(
    adjusted: Adjusted,
    eligible: &HeirRegistry,
    blocked: Vec<Exclusion>,
    estate: EstateValue,
) -> Result<ShareTable> {
    if eligible.is_empty() {
        return Err(FaraidError::NoEligibleHeirs);
    }

    let Adjusted { entries, outcome } = adjusted;

    let mut seen = BTreeSet::new();
    for entry in &entries {
        if !seen.insert(entry.relation) {
            return Err(FaraidError::InvariantViolation(format!(
                "duplicate entry for {}",
                entry.relation
            )));
        }
        if entry.fraction.is_negative() {
            return Err(FaraidError::InvariantViolation(format!(
                "negative share {} for {}",
                entry.fraction, entry.relation
            )));
        }
        if entry.fraction > Rational::one() {
            return Err(FaraidError::InvariantViolation(format!(
                "share {} for {} exceeds the estate",
                entry.fraction, entry.relation
            )));
        }
        if entry.count != eligible.count(entry.relation) {
            return Err(FaraidError::InvariantViolation(format!(
                "{} is not an eligible heir with count {}",
                entry.relation, entry.count
            )));
        }
    }

    if let Some(missing) = eligible.relations().find(|r| !seen.contains(r)) {
        return Err(FaraidError::InvariantViolation(format!(
            "eligible heir {} received no entry",
            missing
        )));
    }

    let total_fraction: Rational = entries.iter().map(|e| &e.fraction).sum();
    if !total_fraction.is_one() {
        return Err(FaraidError::InvariantViolation(format!(
            "shares sum to {} instead of 1",
            total_fraction
        )));
    }

    let mut entries = entries;
    entries.sort_by_key(|e| e.relation);

    Ok(ShareTable {
        entries,
        total_fraction,
        outcome,
        blocked,
        estate,
    })
}
