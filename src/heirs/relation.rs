//! Kinship categories recognised by the engine

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FaraidError;

/// Gender of a relation, which drives the 2:1 residuary ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

/// Broad family group a relation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kinship {
    Spouse,
    Descendant,
    Ascendant,
    Sibling,
    /// Nephews, uncles and cousins through the male line
    Collateral,
    /// Related by marriage only
    Step,
}

/// Closed set of relations to the decedent.
///
/// Declaration order is the presentation order of a share table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Husband,
    Wife,
    Son,
    Daughter,
    SonsSon,
    SonsDaughter,
    Father,
    Mother,
    PaternalGrandfather,
    PaternalGrandmother,
    MaternalGrandfather,
    MaternalGrandmother,
    FullBrother,
    FullSister,
    /// Consanguine brother (same father)
    PaternalBrother,
    /// Consanguine sister (same father)
    PaternalSister,
    /// Uterine brother (same mother)
    MaternalBrother,
    /// Uterine sister (same mother)
    MaternalSister,
    /// Son of a full brother
    FullNephew,
    /// Son of a consanguine brother
    PaternalNephew,
    /// Father's full brother
    FullPaternalUncle,
    /// Father's consanguine brother
    PaternalHalfUncle,
    /// Son of a full paternal uncle
    FullCousin,
    /// Son of a consanguine paternal uncle
    PaternalCousin,
    Stepson,
    Stepdaughter,
    Stepfather,
    Stepmother,
}

impl Relation {
    /// Every relation in presentation order
    pub const ALL: [Relation; 28] = [
        Relation::Husband,
        Relation::Wife,
        Relation::Son,
        Relation::Daughter,
        Relation::SonsSon,
        Relation::SonsDaughter,
        Relation::Father,
        Relation::Mother,
        Relation::PaternalGrandfather,
        Relation::PaternalGrandmother,
        Relation::MaternalGrandfather,
        Relation::MaternalGrandmother,
        Relation::FullBrother,
        Relation::FullSister,
        Relation::PaternalBrother,
        Relation::PaternalSister,
        Relation::MaternalBrother,
        Relation::MaternalSister,
        Relation::FullNephew,
        Relation::PaternalNephew,
        Relation::FullPaternalUncle,
        Relation::PaternalHalfUncle,
        Relation::FullCousin,
        Relation::PaternalCousin,
        Relation::Stepson,
        Relation::Stepdaughter,
        Relation::Stepfather,
        Relation::Stepmother,
    ];

    pub fn gender(&self) -> Gender {
        use Relation::*;
        match self {
            Wife | Daughter | SonsDaughter | Mother | PaternalGrandmother
            | MaternalGrandmother | FullSister | PaternalSister | MaternalSister
            | Stepdaughter | Stepmother => Gender::Female,
            _ => Gender::Male,
        }
    }

    pub fn kinship(&self) -> Kinship {
        use Relation::*;
        match self {
            Husband | Wife => Kinship::Spouse,
            Son | Daughter | SonsSon | SonsDaughter => Kinship::Descendant,
            Father | Mother | PaternalGrandfather | PaternalGrandmother
            | MaternalGrandfather | MaternalGrandmother => Kinship::Ascendant,
            FullBrother | FullSister | PaternalBrother | PaternalSister
            | MaternalBrother | MaternalSister => Kinship::Sibling,
            FullNephew | PaternalNephew | FullPaternalUncle | PaternalHalfUncle
            | FullCousin | PaternalCousin => Kinship::Collateral,
            Stepson | Stepdaughter | Stepfather | Stepmother => Kinship::Step,
        }
    }

    pub fn is_spouse(&self) -> bool {
        self.kinship() == Kinship::Spouse
    }

    pub fn is_descendant(&self) -> bool {
        self.kinship() == Kinship::Descendant
    }

    pub fn is_sibling(&self) -> bool {
        self.kinship() == Kinship::Sibling
    }

    /// Largest number of living heirs the relation can have, if bounded.
    pub fn max_count(&self) -> Option<u32> {
        use Relation::*;
        match self {
            Husband => Some(1),
            Wife => Some(4),
            Father | Mother | PaternalGrandfather | PaternalGrandmother
            | MaternalGrandfather | MaternalGrandmother | Stepfather | Stepmother => Some(1),
            _ => None,
        }
    }

    /// Canonical snake_case name, as used in case files and JSON
    pub fn as_str(&self) -> &'static str {
        use Relation::*;
        match self {
            Husband => "husband",
            Wife => "wife",
            Son => "son",
            Daughter => "daughter",
            SonsSon => "sons_son",
            SonsDaughter => "sons_daughter",
            Father => "father",
            Mother => "mother",
            PaternalGrandfather => "paternal_grandfather",
            PaternalGrandmother => "paternal_grandmother",
            MaternalGrandfather => "maternal_grandfather",
            MaternalGrandmother => "maternal_grandmother",
            FullBrother => "full_brother",
            FullSister => "full_sister",
            PaternalBrother => "paternal_brother",
            PaternalSister => "paternal_sister",
            MaternalBrother => "maternal_brother",
            MaternalSister => "maternal_sister",
            FullNephew => "full_nephew",
            PaternalNephew => "paternal_nephew",
            FullPaternalUncle => "full_paternal_uncle",
            PaternalHalfUncle => "paternal_half_uncle",
            FullCousin => "full_cousin",
            PaternalCousin => "paternal_cousin",
            Stepson => "stepson",
            Stepdaughter => "stepdaughter",
            Stepfather => "stepfather",
            Stepmother => "stepmother",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; accepts snake_case, kebab-case or spaces.
impl FromStr for Relation {
    type Err = FaraidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '\'')
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();

        Relation::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == key)
            .ok_or_else(|| FaraidError::UnknownRelation(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_sorted_and_complete() {
        let mut sorted = Relation::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, Relation::ALL.to_vec());
        sorted.dedup();
        assert_eq!(sorted.len(), Relation::ALL.len());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("sons_son".parse::<Relation>().unwrap(), Relation::SonsSon);
        assert_eq!("Son's Son".parse::<Relation>().unwrap(), Relation::SonsSon);
        assert_eq!("full-brother".parse::<Relation>().unwrap(), Relation::FullBrother);
        assert_eq!("WIFE".parse::<Relation>().unwrap(), Relation::Wife);
        assert!(matches!(
            "cousin_twice_removed".parse::<Relation>(),
            Err(FaraidError::UnknownRelation(_))
        ));
    }

    #[test]
    fn test_round_trip_names() {
        for relation in Relation::ALL {
            assert_eq!(relation.as_str().parse::<Relation>().unwrap(), relation);
            let json = serde_json::to_string(&relation).unwrap();
            assert_eq!(json, format!("\"{}\"", relation.as_str()));
        }
    }

    #[test]
    fn test_attributes() {
        assert_eq!(Relation::SonsDaughter.gender(), Gender::Female);
        assert_eq!(Relation::PaternalCousin.gender(), Gender::Male);
        assert_eq!(Relation::Stepmother.kinship(), Kinship::Step);
        assert!(Relation::MaternalSister.is_sibling());
        assert!(Relation::Wife.is_spouse());
        assert_eq!(Relation::Wife.max_count(), Some(4));
        assert_eq!(Relation::Daughter.max_count(), None);
    }
}
