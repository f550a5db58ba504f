//! Fixed Quranic shares (Fard)
//!
//! [`FIXED_SHARE_RULES`] lists, for every relation that can hold a fixed
//! share, the cases in the order they are tried. The first case whose
//! condition holds decides the relation's entitlement. A case may also say
//! that the relation inherits only as residuary, which leaves it to the
//! residuary stage.

use std::collections::BTreeMap;

use log::debug;

use super::eligibility::is_residuary_sister;
use crate::error::{FaraidError, Result};
use crate::heirs::{HeirRegistry, Kinship, Relation};
use crate::rational::Rational;

/// Facts a rule condition may read
pub struct ShareContext<'a> {
    /// Heirs remaining after blocking
    pub eligible: &'a HeirRegistry,
    /// Registry as supplied, including blocked relatives
    pub registry: &'a HeirRegistry,
}

impl ShareContext<'_> {
    fn count(&self, relation: Relation) -> u32 {
        self.eligible.count(relation)
    }

    fn has(&self, relation: Relation) -> bool {
        self.eligible.contains(relation)
    }
}

/// What a matching case awards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Share {
    /// A fraction of the whole estate for all heirs of the relation together
    Whole(i64, i64),
    /// A group fraction split per head across `group`, this relation taking
    /// its head count's part
    GroupPerHead(i64, i64, &'static [Relation]),
    /// One third of what remains after the spouse's share
    ThirdOfRemainder,
    /// No fixed share: the relation inherits as residuary
    Residuary,
}

/// One case of the fixed-share table
pub struct FixedShareRule {
    pub relation: Relation,
    /// Human-readable condition, kept in the allocation for audit
    pub case: &'static str,
    pub applies: fn(&ShareContext) -> bool,
    pub share: Share,
}

/// A fixed share awarded to one relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedShare {
    pub relation: Relation,
    pub fraction: Rational,
    /// The case that produced it
    pub case: &'static str,
}

/// Output of the fixed-share stage
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FixedAllocation {
    /// Fixed shares keyed by relation
    pub shares: BTreeMap<Relation, FixedShare>,
    /// Relations whose matching case sends them to the residuary stage
    pub residuary_only: Vec<Relation>,
}

impl FixedAllocation {
    /// Sum of every fixed share
    pub fn total(&self) -> Rational {
        self.shares.values().map(|s| &s.fraction).sum()
    }

    pub fn fraction_of(&self, relation: Relation) -> Option<&Rational> {
        self.shares.get(&relation).map(|s| &s.fraction)
    }
}

const GRANDMOTHERS: &[Relation] = &[Relation::PaternalGrandmother, Relation::MaternalGrandmother];
const UTERINE: &[Relation] = &[Relation::MaternalBrother, Relation::MaternalSister];

fn always(_: &ShareContext) -> bool {
    true
}

fn has_descendant(ctx: &ShareContext) -> bool {
    ctx.eligible.has_descendant()
}

fn no_descendant(ctx: &ShareContext) -> bool {
    !has_descendant(ctx)
}

fn descendant_or_sibling_group(ctx: &ShareContext) -> bool {
    // Siblings reduce the mother even when they are themselves blocked.
    has_descendant(ctx) || ctx.registry.total_kinship(Kinship::Sibling) >= 2
}

fn spouse_and_both_parents_only(ctx: &ShareContext) -> bool {
    ctx.eligible.len() == 3
        && ctx.eligible.spouse().is_some()
        && ctx.has(Relation::Father)
        && ctx.has(Relation::Mother)
}

fn with_son(ctx: &ShareContext) -> bool {
    ctx.has(Relation::Son)
}

fn with_sons_son(ctx: &ShareContext) -> bool {
    ctx.has(Relation::SonsSon)
}

fn single_daughter(ctx: &ShareContext) -> bool {
    ctx.count(Relation::Daughter) == 1
}

fn several_daughters(ctx: &ShareContext) -> bool {
    ctx.count(Relation::Daughter) >= 2
}

fn sons_daughter_beside_one_daughter(ctx: &ShareContext) -> bool {
    ctx.count(Relation::Daughter) == 1
}

fn single_sons_daughter(ctx: &ShareContext) -> bool {
    !ctx.has(Relation::Daughter) && ctx.count(Relation::SonsDaughter) == 1
}

fn several_sons_daughters(ctx: &ShareContext) -> bool {
    !ctx.has(Relation::Daughter) && ctx.count(Relation::SonsDaughter) >= 2
}

fn with_full_brother(ctx: &ShareContext) -> bool {
    ctx.has(Relation::FullBrother)
}

fn full_sister_with_female_descendant(ctx: &ShareContext) -> bool {
    is_residuary_sister(Relation::FullSister, ctx.eligible)
}

fn single_full_sister(ctx: &ShareContext) -> bool {
    ctx.count(Relation::FullSister) == 1
}

fn several_full_sisters(ctx: &ShareContext) -> bool {
    ctx.count(Relation::FullSister) >= 2
}

fn with_paternal_brother(ctx: &ShareContext) -> bool {
    ctx.has(Relation::PaternalBrother)
}

fn paternal_sister_with_female_descendant(ctx: &ShareContext) -> bool {
    is_residuary_sister(Relation::PaternalSister, ctx.eligible)
}

fn paternal_sister_beside_one_full_sister(ctx: &ShareContext) -> bool {
    ctx.count(Relation::FullSister) == 1
}

fn single_paternal_sister(ctx: &ShareContext) -> bool {
    !ctx.has(Relation::FullSister) && ctx.count(Relation::PaternalSister) == 1
}

fn several_paternal_sisters(ctx: &ShareContext) -> bool {
    !ctx.has(Relation::FullSister) && ctx.count(Relation::PaternalSister) >= 2
}

fn single_uterine_sibling(ctx: &ShareContext) -> bool {
    ctx.eligible.total_of(UTERINE) == 1
}

fn several_uterine_siblings(ctx: &ShareContext) -> bool {
    ctx.eligible.total_of(UTERINE) >= 2
}

/// Fixed-share table. Cases for one relation are contiguous and tried in
/// order.
pub static FIXED_SHARE_RULES: &[FixedShareRule] = &[
    // Spouses
    FixedShareRule {
        relation: Relation::Husband,
        case: "husband, no descendant",
        applies: no_descendant,
        share: Share::Whole(1, 2),
    },
    FixedShareRule {
        relation: Relation::Husband,
        case: "husband, with descendant",
        applies: has_descendant,
        share: Share::Whole(1, 4),
    },
    FixedShareRule {
        relation: Relation::Wife,
        case: "wife, no descendant",
        applies: no_descendant,
        share: Share::Whole(1, 4),
    },
    FixedShareRule {
        relation: Relation::Wife,
        case: "wife, with descendant",
        applies: has_descendant,
        share: Share::Whole(1, 8),
    },
    // Descendants
    FixedShareRule {
        relation: Relation::Daughter,
        case: "daughter with son",
        applies: with_son,
        share: Share::Residuary,
    },
    FixedShareRule {
        relation: Relation::Daughter,
        case: "one daughter",
        applies: single_daughter,
        share: Share::Whole(1, 2),
    },
    FixedShareRule {
        relation: Relation::Daughter,
        case: "two or more daughters",
        applies: several_daughters,
        share: Share::Whole(2, 3),
    },
    FixedShareRule {
        relation: Relation::SonsDaughter,
        case: "son's daughter with son's son",
        applies: with_sons_son,
        share: Share::Residuary,
    },
    FixedShareRule {
        relation: Relation::SonsDaughter,
        case: "son's daughter beside one daughter",
        applies: sons_daughter_beside_one_daughter,
        share: Share::Whole(1, 6),
    },
    FixedShareRule {
        relation: Relation::SonsDaughter,
        case: "one son's daughter",
        applies: single_sons_daughter,
        share: Share::Whole(1, 2),
    },
    FixedShareRule {
        relation: Relation::SonsDaughter,
        case: "two or more son's daughters",
        applies: several_sons_daughters,
        share: Share::Whole(2, 3),
    },
    // Ascendants
    FixedShareRule {
        relation: Relation::Father,
        case: "father, with descendant",
        applies: has_descendant,
        share: Share::Whole(1, 6),
    },
    FixedShareRule {
        relation: Relation::Father,
        case: "father, no descendant",
        applies: no_descendant,
        share: Share::Residuary,
    },
    FixedShareRule {
        relation: Relation::Mother,
        case: "mother, with descendant or two or more siblings",
        applies: descendant_or_sibling_group,
        share: Share::Whole(1, 6),
    },
    FixedShareRule {
        relation: Relation::Mother,
        case: "mother with spouse and father only",
        applies: spouse_and_both_parents_only,
        share: Share::ThirdOfRemainder,
    },
    FixedShareRule {
        relation: Relation::Mother,
        case: "mother, otherwise",
        applies: always,
        share: Share::Whole(1, 3),
    },
    FixedShareRule {
        relation: Relation::PaternalGrandfather,
        case: "grandfather, with descendant",
        applies: has_descendant,
        share: Share::Whole(1, 6),
    },
    FixedShareRule {
        relation: Relation::PaternalGrandfather,
        case: "grandfather, no descendant",
        applies: no_descendant,
        share: Share::Residuary,
    },
    FixedShareRule {
        relation: Relation::PaternalGrandmother,
        case: "grandmothers share one sixth",
        applies: always,
        share: Share::GroupPerHead(1, 6, GRANDMOTHERS),
    },
    FixedShareRule {
        relation: Relation::MaternalGrandmother,
        case: "grandmothers share one sixth",
        applies: always,
        share: Share::GroupPerHead(1, 6, GRANDMOTHERS),
    },
    // Full sisters
    FixedShareRule {
        relation: Relation::FullSister,
        case: "full sister with full brother",
        applies: with_full_brother,
        share: Share::Residuary,
    },
    FixedShareRule {
        relation: Relation::FullSister,
        case: "full sister with female descendant",
        applies: full_sister_with_female_descendant,
        share: Share::Residuary,
    },
    FixedShareRule {
        relation: Relation::FullSister,
        case: "one full sister",
        applies: single_full_sister,
        share: Share::Whole(1, 2),
    },
    FixedShareRule {
        relation: Relation::FullSister,
        case: "two or more full sisters",
        applies: several_full_sisters,
        share: Share::Whole(2, 3),
    },
    // Consanguine sisters
    FixedShareRule {
        relation: Relation::PaternalSister,
        case: "paternal sister with paternal brother",
        applies: with_paternal_brother,
        share: Share::Residuary,
    },
    FixedShareRule {
        relation: Relation::PaternalSister,
        case: "paternal sister with female descendant",
        applies: paternal_sister_with_female_descendant,
        share: Share::Residuary,
    },
    FixedShareRule {
        relation: Relation::PaternalSister,
        case: "paternal sister beside one full sister",
        applies: paternal_sister_beside_one_full_sister,
        share: Share::Whole(1, 6),
    },
    FixedShareRule {
        relation: Relation::PaternalSister,
        case: "one paternal sister",
        applies: single_paternal_sister,
        share: Share::Whole(1, 2),
    },
    FixedShareRule {
        relation: Relation::PaternalSister,
        case: "two or more paternal sisters",
        applies: several_paternal_sisters,
        share: Share::Whole(2, 3),
    },
    // Uterine siblings
    FixedShareRule {
        relation: Relation::MaternalBrother,
        case: "one uterine sibling",
        applies: single_uterine_sibling,
        share: Share::GroupPerHead(1, 6, UTERINE),
    },
    FixedShareRule {
        relation: Relation::MaternalBrother,
        case: "two or more uterine siblings",
        applies: several_uterine_siblings,
        share: Share::GroupPerHead(1, 3, UTERINE),
    },
    FixedShareRule {
        relation: Relation::MaternalSister,
        case: "one uterine sibling",
        applies: single_uterine_sibling,
        share: Share::GroupPerHead(1, 6, UTERINE),
    },
    FixedShareRule {
        relation: Relation::MaternalSister,
        case: "two or more uterine siblings",
        applies: several_uterine_siblings,
        share: Share::GroupPerHead(1, 3, UTERINE),
    },
];

/// Whether the table has any case for `relation`
pub fn has_fixed_rules(relation: Relation) -> bool {
    FIXED_SHARE_RULES.iter().any(|rule| rule.relation == relation)
}

/// First case of the table that applies to `relation`
pub fn matching_rule(relation: Relation, ctx: &ShareContext) -> Option<&'static FixedShareRule> {
    FIXED_SHARE_RULES
        .iter()
        .filter(|rule| rule.relation == relation)
        .find(|rule| (rule.applies)(ctx))
}

/// Assign fixed shares to every eligible relation that has one.
///
/// Relations are processed in presentation order, so the spouse's share is
/// known before the mother's third-of-remainder case reads it.
pub fn allocate(eligible: &HeirRegistry, registry: &HeirRegistry) -> Result<FixedAllocation> {
    let ctx = ShareContext { eligible, registry };
    let mut allocation = FixedAllocation::default();

    for relation in eligible.relations() {
        if !has_fixed_rules(relation) {
            continue;
        }
        let rule = matching_rule(relation, &ctx).ok_or_else(|| {
            FaraidError::UnsupportedConfiguration(format!(
                "no fixed-share case covers {} in this configuration",
                relation
            ))
        })?;

        let fraction = match rule.share {
            Share::Residuary => {
                debug!("{}: {} -> residuary", relation, rule.case);
                allocation.residuary_only.push(relation);
                continue;
            }
            Share::Whole(n, d) => Rational::ratio(n, d)?,
            Share::GroupPerHead(n, d, group) => {
                let heads = eligible.total_of(group);
                Rational::ratio(n, d)?
                    .scale(eligible.count(relation))
                    .split(heads)?
            }
            Share::ThirdOfRemainder => {
                let spouse_share = eligible
                    .spouse()
                    .and_then(|s| allocation.fraction_of(s))
                    .cloned()
                    .unwrap_or_else(Rational::zero);
                (&Rational::one() - &spouse_share).split(3)?
            }
        };

        debug!("{}: {} -> {}", relation, rule.case, fraction);
        allocation.shares.insert(
            relation,
            FixedShare {
                relation,
                fraction,
                case: rule.case,
            },
        );
    }

    Ok(allocation)
}
