//! Blocking (Hajb): which relatives are excluded by closer ones
//!
//! The rules live in [`BLOCKING_RULES`], one row per relation, evaluated top
//! to bottom. Rows are ordered so that every relation a row refers to has
//! already been resolved, and a blocker only counts while it is itself
//! eligible. Within a row the first matching blocker is the one recorded.
//!
//! Spouses, parents, sons and daughters have no row: they are never blocked.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, GrandfatherSiblingsPolicy};
use crate::error::{FaraidError, Result};
use crate::heirs::{HeirRegistry, Kinship, Relation};

/// Why a relation present in the registry does not inherit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "relation", rename_all = "snake_case")]
pub enum ExclusionReason {
    /// Excluded by a closer eligible relative
    BlockedBy(Relation),
    /// Not an heir in any configuration (step-relatives, distant kindred)
    NotAnHeir,
}

/// One entry of the blocked log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    pub relation: Relation,
    pub count: u32,
    pub reason: ExclusionReason,
}

/// Output of the blocking stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eligibility {
    /// Heirs that survive blocking
    pub eligible: HeirRegistry,
    /// Every excluded relation, in the order it was excluded
    pub blocked: Vec<Exclusion>,
}

/// Condition under which a rule row excludes its relation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocker {
    /// Any eligible heir of this relation
    Present(Relation),
    /// At least `min` eligible heirs of `relation`, unless `unless` is eligible
    AtLeast {
        relation: Relation,
        min: u32,
        unless: Relation,
    },
    /// Any eligible descendant, male or female
    AnyDescendant,
    /// This sister relation inheriting as residuary alongside female
    /// descendants
    ResiduarySister(Relation),
    /// The paternal grandfather, subject to [`GrandfatherSiblingsPolicy`]
    GrandfatherByPolicy,
}

/// One row of the blocking table
#[derive(Debug, Clone, Copy)]
pub struct BlockingRule {
    pub relation: Relation,
    pub blockers: &'static [Blocker],
}

/// Relations that never inherit
pub const NON_HEIRS: &[Relation] = &[
    Relation::MaternalGrandfather,
    Relation::Stepson,
    Relation::Stepdaughter,
    Relation::Stepfather,
    Relation::Stepmother,
];

use Blocker::{AnyDescendant, AtLeast, GrandfatherByPolicy, Present, ResiduarySister};
use Relation::*;

/// Blocking table in precedence order
pub static BLOCKING_RULES: &[BlockingRule] = &[
    BlockingRule {
        relation: SonsSon,
        blockers: &[Present(Son)],
    },
    BlockingRule {
        relation: SonsDaughter,
        blockers: &[
            Present(Son),
            AtLeast { relation: Daughter, min: 2, unless: SonsSon },
        ],
    },
    BlockingRule {
        relation: PaternalGrandfather,
        blockers: &[Present(Father)],
    },
    BlockingRule {
        relation: PaternalGrandmother,
        blockers: &[Present(Mother), Present(Father)],
    },
    BlockingRule {
        relation: MaternalGrandmother,
        blockers: &[Present(Mother)],
    },
    BlockingRule {
        relation: FullBrother,
        blockers: &[Present(Son), Present(SonsSon), Present(Father), GrandfatherByPolicy],
    },
    BlockingRule {
        relation: FullSister,
        blockers: &[Present(Son), Present(SonsSon), Present(Father), GrandfatherByPolicy],
    },
    BlockingRule {
        relation: PaternalBrother,
        blockers: &[
            Present(Son),
            Present(SonsSon),
            Present(Father),
            Present(FullBrother),
            ResiduarySister(FullSister),
            GrandfatherByPolicy,
        ],
    },
    BlockingRule {
        relation: PaternalSister,
        blockers: &[
            Present(Son),
            Present(SonsSon),
            Present(Father),
            Present(FullBrother),
            ResiduarySister(FullSister),
            AtLeast { relation: FullSister, min: 2, unless: PaternalBrother },
            GrandfatherByPolicy,
        ],
    },
    BlockingRule {
        relation: MaternalBrother,
        blockers: &[AnyDescendant, Present(Father), Present(PaternalGrandfather)],
    },
    BlockingRule {
        relation: MaternalSister,
        blockers: &[AnyDescendant, Present(Father), Present(PaternalGrandfather)],
    },
    BlockingRule {
        relation: FullNephew,
        blockers: &[
            Present(Son),
            Present(SonsSon),
            Present(Father),
            Present(PaternalGrandfather),
            Present(FullBrother),
            Present(PaternalBrother),
            ResiduarySister(FullSister),
            ResiduarySister(PaternalSister),
        ],
    },
    BlockingRule {
        relation: PaternalNephew,
        blockers: &[
            Present(Son),
            Present(SonsSon),
            Present(Father),
            Present(PaternalGrandfather),
            Present(FullBrother),
            Present(PaternalBrother),
            ResiduarySister(FullSister),
            ResiduarySister(PaternalSister),
            Present(FullNephew),
        ],
    },
    BlockingRule {
        relation: FullPaternalUncle,
        blockers: &[
            Present(Son),
            Present(SonsSon),
            Present(Father),
            Present(PaternalGrandfather),
            Present(FullBrother),
            Present(PaternalBrother),
            ResiduarySister(FullSister),
            ResiduarySister(PaternalSister),
            Present(FullNephew),
            Present(PaternalNephew),
        ],
    },
    BlockingRule {
        relation: PaternalHalfUncle,
        blockers: &[
            Present(Son),
            Present(SonsSon),
            Present(Father),
            Present(PaternalGrandfather),
            Present(FullBrother),
            Present(PaternalBrother),
            ResiduarySister(FullSister),
            ResiduarySister(PaternalSister),
            Present(FullNephew),
            Present(PaternalNephew),
            Present(FullPaternalUncle),
        ],
    },
    BlockingRule {
        relation: FullCousin,
        blockers: &[
            Present(Son),
            Present(SonsSon),
            Present(Father),
            Present(PaternalGrandfather),
            Present(FullBrother),
            Present(PaternalBrother),
            ResiduarySister(FullSister),
            ResiduarySister(PaternalSister),
            Present(FullNephew),
            Present(PaternalNephew),
            Present(FullPaternalUncle),
            Present(PaternalHalfUncle),
        ],
    },
    BlockingRule {
        relation: PaternalCousin,
        blockers: &[
            Present(Son),
            Present(SonsSon),
            Present(Father),
            Present(PaternalGrandfather),
            Present(FullBrother),
            Present(PaternalBrother),
            ResiduarySister(FullSister),
            ResiduarySister(PaternalSister),
            Present(FullNephew),
            Present(PaternalNephew),
            Present(FullPaternalUncle),
            Present(PaternalHalfUncle),
            Present(FullCousin),
        ],
    },
];

impl Blocker {
    /// The relation doing the blocking, if this condition holds in `eligible`
    fn blocks(
        &self,
        blocked: Relation,
        eligible: &HeirRegistry,
        config: &EngineConfig,
    ) -> Result<Option<Relation>> {
        let hit = match *self {
            Present(relation) => eligible.contains(relation).then_some(relation),
            AtLeast { relation, min, unless } => {
                (eligible.count(relation) >= min && !eligible.contains(unless)).then_some(relation)
            }
            AnyDescendant => eligible.relations().find(|r| r.kinship() == Kinship::Descendant),
            ResiduarySister(sister) => {
                is_residuary_sister(sister, eligible).then_some(sister)
            }
            GrandfatherByPolicy => {
                if !eligible.contains(PaternalGrandfather) {
                    None
                } else {
                    match config.grandfather_with_siblings {
                        GrandfatherSiblingsPolicy::GrandfatherExcludes => Some(PaternalGrandfather),
                        GrandfatherSiblingsPolicy::Reject => {
                            warn!("paternal grandfather with {} rejected by policy", blocked);
                            return Err(FaraidError::UnsupportedConfiguration(format!(
                                "paternal grandfather with {}: the schools differ on \
                                 sharing versus exclusion",
                                blocked
                            )));
                        }
                    }
                }
            }
        };
        Ok(hit)
    }
}

/// A sister inherits as residuary "with" female descendants when there is no
/// brother of her own line to make her residuary alongside him.
pub(crate) fn is_residuary_sister(sister: Relation, eligible: &HeirRegistry) -> bool {
    let brother = match sister {
        FullSister => FullBrother,
        PaternalSister => PaternalBrother,
        _ => return false,
    };
    eligible.contains(sister) && eligible.has_female_descendant() && !eligible.contains(brother)
}

/// Apply the blocking table to a registry.
pub fn resolve(registry: &HeirRegistry, config: &EngineConfig) -> Result<Eligibility> {
    let mut blocked = Vec::new();

    for relation in registry.relations().filter(|r| NON_HEIRS.contains(r)) {
        debug!("{} is not an heir", relation);
        blocked.push(Exclusion {
            relation,
            count: registry.count(relation),
            reason: ExclusionReason::NotAnHeir,
        });
    }
    let mut eligible = registry.filtered(|r| !NON_HEIRS.contains(&r));

    for rule in BLOCKING_RULES {
        if !eligible.contains(rule.relation) {
            continue;
        }
        for blocker in rule.blockers {
            if let Some(by) = blocker.blocks(rule.relation, &eligible, config)? {
                debug!("{} blocked by {}", rule.relation, by);
                blocked.push(Exclusion {
                    relation: rule.relation,
                    count: eligible.count(rule.relation),
                    reason: ExclusionReason::BlockedBy(by),
                });
                eligible = eligible.filtered(|r| r != rule.relation);
                break;
            }
        }
    }

    Ok(Eligibility { eligible, blocked })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(entries: &[(Relation, u32)]) -> HeirRegistry {
        HeirRegistry::from_entries(entries.iter().copied()).unwrap()
    }

    fn resolve_default(entries: &[(Relation, u32)]) -> Eligibility {
        resolve(&registry(entries), &EngineConfig::default()).unwrap()
    }

    fn blocker_of(result: &Eligibility, relation: Relation) -> Option<ExclusionReason> {
        result
            .blocked
            .iter()
            .find(|e| e.relation == relation)
            .map(|e| e.reason)
    }

    #[test]
    fn test_table_order_resolves_dependencies_first() {
        // Every relation a blocker refers to must either have no row or an
        // earlier one.
        for (i, rule) in BLOCKING_RULES.iter().enumerate() {
            for blocker in rule.blockers {
                let referenced: Vec<Relation> = match *blocker {
                    Present(r) | ResiduarySister(r) => vec![r],
                    AtLeast { relation, unless, .. } => vec![relation, unless],
                    AnyDescendant => vec![Son, Daughter, SonsSon, SonsDaughter],
                    GrandfatherByPolicy => vec![PaternalGrandfather],
                };
                for r in referenced {
                    if let Some(j) = BLOCKING_RULES.iter().position(|row| row.relation == r) {
                        assert!(j < i, "{} row refers to later row {}", rule.relation, r);
                    }
                }
            }
        }
    }

    #[test]
    fn test_never_blocked_relations_have_no_row() {
        for relation in [Husband, Wife, Son, Daughter, Father, Mother] {
            assert!(BLOCKING_RULES.iter().all(|row| row.relation != relation));
        }
    }

    #[test]
    fn test_step_relatives_and_distant_kindred_excluded() {
        let result = resolve_default(&[
            (Stepson, 2),
            (Stepmother, 1),
            (MaternalGrandfather, 1),
            (Daughter, 1),
        ]);
        assert_eq!(result.eligible.relations().collect::<Vec<_>>(), vec![Daughter]);
        assert_eq!(blocker_of(&result, Stepson), Some(ExclusionReason::NotAnHeir));
        assert_eq!(blocker_of(&result, Stepmother), Some(ExclusionReason::NotAnHeir));
        assert_eq!(
            blocker_of(&result, MaternalGrandfather),
            Some(ExclusionReason::NotAnHeir)
        );
    }

    #[test]
    fn test_son_blocks_grandchildren_and_siblings() {
        let result = resolve_default(&[
            (Son, 1),
            (SonsSon, 2),
            (SonsDaughter, 1),
            (FullBrother, 1),
            (PaternalSister, 1),
            (MaternalBrother, 1),
            (FullCousin, 1),
        ]);
        assert_eq!(result.eligible.relations().collect::<Vec<_>>(), vec![Son]);
        assert_eq!(blocker_of(&result, SonsSon), Some(ExclusionReason::BlockedBy(Son)));
        assert_eq!(blocker_of(&result, SonsDaughter), Some(ExclusionReason::BlockedBy(Son)));
        assert_eq!(blocker_of(&result, FullBrother), Some(ExclusionReason::BlockedBy(Son)));
        assert_eq!(blocker_of(&result, MaternalBrother), Some(ExclusionReason::BlockedBy(Son)));
    }

    #[test]
    fn test_son_does_not_block_grandparents() {
        let result = resolve_default(&[(Son, 1), (PaternalGrandfather, 1), (MaternalGrandmother, 1)]);
        assert!(result.eligible.contains(PaternalGrandfather));
        assert!(result.eligible.contains(MaternalGrandmother));
        assert!(result.blocked.is_empty());
    }

    #[test]
    fn test_two_daughters_block_sons_daughter() {
        let result = resolve_default(&[(Daughter, 2), (SonsDaughter, 1)]);
        assert_eq!(
            blocker_of(&result, SonsDaughter),
            Some(ExclusionReason::BlockedBy(Daughter))
        );
    }

    #[test]
    fn test_sons_son_rescues_sons_daughter() {
        let result = resolve_default(&[(Daughter, 2), (SonsSon, 1), (SonsDaughter, 1)]);
        assert!(result.eligible.contains(SonsDaughter));
        assert!(result.blocked.is_empty());
    }

    #[test]
    fn test_one_daughter_leaves_sons_daughter() {
        let result = resolve_default(&[(Daughter, 1), (SonsDaughter, 2)]);
        assert!(result.eligible.contains(SonsDaughter));
    }

    #[test]
    fn test_father_blocks_grandfather_and_siblings() {
        let result = resolve_default(&[
            (Father, 1),
            (PaternalGrandfather, 1),
            (PaternalGrandmother, 1),
            (FullSister, 2),
            (MaternalSister, 1),
        ]);
        assert_eq!(result.eligible.relations().collect::<Vec<_>>(), vec![Father]);
        assert_eq!(
            blocker_of(&result, PaternalGrandfather),
            Some(ExclusionReason::BlockedBy(Father))
        );
        assert_eq!(
            blocker_of(&result, PaternalGrandmother),
            Some(ExclusionReason::BlockedBy(Father))
        );
        assert_eq!(blocker_of(&result, FullSister), Some(ExclusionReason::BlockedBy(Father)));
    }

    #[test]
    fn test_mother_blocks_grandmothers() {
        let result = resolve_default(&[(Mother, 1), (PaternalGrandmother, 1), (MaternalGrandmother, 1)]);
        assert_eq!(
            blocker_of(&result, PaternalGrandmother),
            Some(ExclusionReason::BlockedBy(Mother))
        );
        assert_eq!(
            blocker_of(&result, MaternalGrandmother),
            Some(ExclusionReason::BlockedBy(Mother))
        );
    }

    #[test]
    fn test_full_brother_blocks_paternal_siblings() {
        let result = resolve_default(&[(FullBrother, 1), (PaternalBrother, 1), (PaternalSister, 2)]);
        assert_eq!(result.eligible.relations().collect::<Vec<_>>(), vec![FullBrother]);
        assert_eq!(
            blocker_of(&result, PaternalSister),
            Some(ExclusionReason::BlockedBy(FullBrother))
        );
    }

    #[test]
    fn test_two_full_sisters_block_paternal_sister() {
        let result = resolve_default(&[(FullSister, 2), (PaternalSister, 1)]);
        assert_eq!(
            blocker_of(&result, PaternalSister),
            Some(ExclusionReason::BlockedBy(FullSister))
        );

        let rescued = resolve_default(&[(FullSister, 2), (PaternalSister, 1), (PaternalBrother, 1)]);
        assert!(rescued.eligible.contains(PaternalSister));
    }

    #[test]
    fn test_residuary_full_sister_blocks_paternal_and_collateral_line() {
        let result = resolve_default(&[
            (Daughter, 1),
            (FullSister, 1),
            (PaternalBrother, 1),
            (FullNephew, 1),
        ]);
        assert_eq!(
            blocker_of(&result, PaternalBrother),
            Some(ExclusionReason::BlockedBy(FullSister))
        );
        assert_eq!(
            blocker_of(&result, FullNephew),
            Some(ExclusionReason::BlockedBy(FullSister))
        );
    }

    #[test]
    fn test_uterine_siblings_blocked_by_any_descendant() {
        let result = resolve_default(&[(SonsDaughter, 1), (MaternalBrother, 1), (MaternalSister, 1)]);
        assert_eq!(
            blocker_of(&result, MaternalBrother),
            Some(ExclusionReason::BlockedBy(SonsDaughter))
        );

        let grandfather = resolve_default(&[(PaternalGrandfather, 1), (MaternalSister, 2)]);
        assert_eq!(
            blocker_of(&grandfather, MaternalSister),
            Some(ExclusionReason::BlockedBy(PaternalGrandfather))
        );
    }

    #[test]
    fn test_collateral_chain() {
        let result = resolve_default(&[
            (PaternalNephew, 1),
            (FullPaternalUncle, 2),
            (PaternalHalfUncle, 1),
            (PaternalCousin, 3),
        ]);
        assert_eq!(result.eligible.relations().collect::<Vec<_>>(), vec![PaternalNephew]);
        assert_eq!(
            blocker_of(&result, PaternalCousin),
            Some(ExclusionReason::BlockedBy(PaternalNephew))
        );
    }

    #[test]
    fn test_grandfather_with_siblings_policy() {
        let entries = [(PaternalGrandfather, 1), (FullBrother, 1), (Mother, 1)];

        let err = resolve(&registry(&entries), &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, FaraidError::UnsupportedConfiguration(_)));

        let config = EngineConfig {
            grandfather_with_siblings: GrandfatherSiblingsPolicy::GrandfatherExcludes,
            ..Default::default()
        };
        let result = resolve(&registry(&entries), &config).unwrap();
        assert_eq!(
            blocker_of(&result, FullBrother),
            Some(ExclusionReason::BlockedBy(PaternalGrandfather))
        );
    }

    #[test]
    fn test_grandfather_policy_irrelevant_when_siblings_otherwise_blocked() {
        // The son blocks the brother before the grandfather rule is consulted.
        let result = resolve_default(&[(Son, 1), (PaternalGrandfather, 1), (FullBrother, 1)]);
        assert_eq!(blocker_of(&result, FullBrother), Some(ExclusionReason::BlockedBy(Son)));
    }
}
