//! Residuary distribution (Asaba)
//!
//! Whatever the fixed shares leave goes to the single highest-ranked
//! residuary class present. Inside a class a male heir counts for two shares
//! and a female heir for one.

use std::collections::BTreeMap;

use log::debug;

use super::fixed::FixedAllocation;
use crate::error::{FaraidError, Result};
use crate::heirs::{Gender, HeirRegistry, Relation};
use crate::rational::Rational;

/// One rank of residuary heirs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResiduaryClass {
    /// Relation whose presence activates the class
    pub lead: Relation,
    /// Relation inheriting alongside the lead at the 2:1 ratio
    pub partner: Option<Relation>,
    /// Class only applies when a daughter or son's daughter is eligible
    pub requires_female_descendant: bool,
}

const fn class(lead: Relation, partner: Option<Relation>) -> ResiduaryClass {
    ResiduaryClass {
        lead,
        partner,
        requires_female_descendant: false,
    }
}

const fn with_female_descendant(lead: Relation) -> ResiduaryClass {
    ResiduaryClass {
        lead,
        partner: None,
        requires_female_descendant: true,
    }
}

/// Residuary classes, highest rank first
pub static RESIDUARY_CLASSES: &[ResiduaryClass] = &[
    class(Relation::Son, Some(Relation::Daughter)),
    class(Relation::SonsSon, Some(Relation::SonsDaughter)),
    class(Relation::Father, None),
    class(Relation::PaternalGrandfather, None),
    class(Relation::FullBrother, Some(Relation::FullSister)),
    with_female_descendant(Relation::FullSister),
    class(Relation::PaternalBrother, Some(Relation::PaternalSister)),
    with_female_descendant(Relation::PaternalSister),
    class(Relation::FullNephew, None),
    class(Relation::PaternalNephew, None),
    class(Relation::FullPaternalUncle, None),
    class(Relation::PaternalHalfUncle, None),
    class(Relation::FullCousin, None),
    class(Relation::PaternalCousin, None),
];

impl ResiduaryClass {
    fn applies(&self, eligible: &HeirRegistry) -> bool {
        eligible.contains(self.lead)
            && (!self.requires_female_descendant || eligible.has_female_descendant())
    }

    /// Eligible members of the class
    pub fn members(&self, eligible: &HeirRegistry) -> Vec<Relation> {
        std::iter::once(self.lead)
            .chain(self.partner)
            .filter(|r| eligible.contains(*r))
            .collect()
    }
}

/// 2 shares per male head, 1 per female head
fn weight(relation: Relation, count: u32) -> u32 {
    match relation.gender() {
        Gender::Male => 2 * count,
        Gender::Female => count,
    }
}

/// Fixed shares plus the residuary distribution
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Allocation {
    pub fixed: FixedAllocation,
    /// Residuary portions keyed by relation (zero when nothing was left)
    pub residuary: BTreeMap<Relation, Rational>,
    /// Residue left for the adjustment stage because no residuary heir exists
    pub unassigned: Rational,
}

impl Allocation {
    pub fn fixed_total(&self) -> Rational {
        self.fixed.total()
    }

    pub fn residuary_total(&self) -> Rational {
        self.residuary.values().sum()
    }

    pub fn has_residuary_heirs(&self) -> bool {
        !self.residuary.is_empty()
    }
}

/// Highest-ranked class present among the eligible heirs
pub fn select_class(eligible: &HeirRegistry) -> Option<&'static ResiduaryClass> {
    RESIDUARY_CLASSES.iter().find(|c| c.applies(eligible))
}

/// Divide the residue left by `fixed` among the residuary heirs.
pub fn allocate(eligible: &HeirRegistry, fixed: FixedAllocation) -> Result<Allocation> {
    let fixed_total = fixed.total();
    let residue = if fixed_total < Rational::one() {
        &Rational::one() - &fixed_total
    } else {
        Rational::zero()
    };

    let Some(class) = select_class(eligible) else {
        debug!("no residuary heir, residue {} unassigned", residue);
        return Ok(Allocation {
            fixed,
            residuary: BTreeMap::new(),
            unassigned: residue,
        });
    };

    let members = class.members(eligible);
    let total_weight: u32 = members
        .iter()
        .map(|r| weight(*r, eligible.count(*r)))
        .sum();
    if total_weight == 0 {
        return Err(FaraidError::DivisionByZero {
            operation: "residuary weights",
        });
    }

    let mut residuary = BTreeMap::new();
    for relation in members {
        let portion = residue
            .scale(weight(relation, eligible.count(relation)))
            .split(total_weight)?;
        debug!("{}: residuary {}", relation, portion);
        residuary.insert(relation, portion);
    }

    Ok(Allocation {
        fixed,
        residuary,
        unassigned: Rational::zero(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::distribution::{eligibility, fixed};
    use Relation::*;

    fn q(n: i64, d: i64) -> Rational {
        Rational::ratio(n, d).unwrap()
    }

    fn run(entries: &[(Relation, u32)]) -> Allocation {
        let registry = HeirRegistry::from_entries(entries.iter().copied()).unwrap();
        let eligible = eligibility::resolve(&registry, &EngineConfig::default())
            .unwrap()
            .eligible;
        let fixed = fixed::allocate(&eligible, &registry).unwrap();
        allocate(&eligible, fixed).unwrap()
    }

    #[test]
    fn test_sons_and_daughters_two_to_one() {
        let allocation = run(&[(Son, 2), (Daughter, 1)]);
        assert_eq!(allocation.residuary[&Son], q(4, 5));
        assert_eq!(allocation.residuary[&Daughter], q(1, 5));
        assert!(allocation.unassigned.is_zero());
    }

    #[test]
    fn test_residue_after_fixed_shares() {
        // Wife 1/8, mother 1/6, remaining 17/24 split between 1 son and 1 daughter
        let allocation = run(&[(Wife, 1), (Mother, 1), (Son, 1), (Daughter, 1)]);
        assert_eq!(allocation.residuary[&Son], q(17, 36));
        assert_eq!(allocation.residuary[&Daughter], q(17, 72));
        assert_eq!(&allocation.fixed_total() + &allocation.residuary_total(), Rational::one());
    }

    #[test]
    fn test_father_takes_residue_beside_daughter() {
        let allocation = run(&[(Father, 1), (Daughter, 1)]);
        assert_eq!(allocation.fixed.fraction_of(Father), Some(&q(1, 6)));
        assert_eq!(allocation.residuary[&Father], q(1, 3));
    }

    #[test]
    fn test_father_not_residuary_beside_son() {
        let allocation = run(&[(Father, 1), (Son, 1)]);
        assert!(!allocation.residuary.contains_key(&Father));
        assert_eq!(allocation.residuary[&Son], q(5, 6));
    }

    #[test]
    fn test_sister_residuary_with_daughters() {
        let allocation = run(&[(Daughter, 2), (FullSister, 1)]);
        assert_eq!(allocation.residuary[&FullSister], q(1, 3));
    }

    #[test]
    fn test_collateral_takes_everything_left() {
        let allocation = run(&[(Wife, 1), (FullPaternalUncle, 3)]);
        assert_eq!(allocation.residuary[&FullPaternalUncle], q(3, 4));
    }

    #[test]
    fn test_no_residuary_heir_leaves_residue() {
        let allocation = run(&[(Mother, 1), (Daughter, 1)]);
        assert!(!allocation.has_residuary_heirs());
        assert_eq!(allocation.unassigned, q(1, 3));
    }

    #[test]
    fn test_residuary_gets_zero_when_fixed_exhaust_estate() {
        // Husband 1/2 + mother 1/6 + two uterine siblings 1/3 = 1
        let allocation = run(&[(Husband, 1), (Mother, 1), (MaternalBrother, 2), (FullBrother, 1)]);
        assert_eq!(allocation.fixed_total(), Rational::one());
        assert_eq!(allocation.residuary[&FullBrother], Rational::zero());
    }

    #[test]
    fn test_class_ranking() {
        let registry = HeirRegistry::from_entries([(FullNephew, 1), (PaternalCousin, 1)]).unwrap();
        assert_eq!(select_class(&registry).map(|c| c.lead), Some(FullNephew));

        let sisters = HeirRegistry::from_entries([(FullSister, 1)]).unwrap();
        assert_eq!(select_class(&sisters), None);
    }
}
