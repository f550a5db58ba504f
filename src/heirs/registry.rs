//! Surviving relatives of a decedent, aggregated per relation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::relation::{Kinship, Relation};
use crate::error::{FaraidError, Result};

/// One surviving relation category and how many living heirs it has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heir {
    pub relation: Relation,
    pub count: u32,
}

impl Heir {
    pub fn new(relation: Relation, count: u32) -> Self {
        Self { relation, count }
    }
}

/// Validated set of living heirs.
///
/// Entries are keyed by relation, so the order in which heirs were supplied
/// never affects the registry (or anything computed from it).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Heir>", into = "Vec<Heir>")]
pub struct HeirRegistry {
    heirs: BTreeMap<Relation, u32>,
}

impl HeirRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `(relation, count)` pairs.
    ///
    /// Rejects zero counts, repeated relations, counts above the relation's
    /// natural maximum, and a husband together with a wife.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Relation, u32)>,
    {
        let mut heirs = BTreeMap::new();
        for (relation, count) in entries {
            if count == 0 {
                return Err(FaraidError::InvalidRegistry(format!(
                    "{} listed with a count of zero",
                    relation
                )));
            }
            if let Some(max) = relation.max_count() {
                if count > max {
                    return Err(FaraidError::InvalidRegistry(format!(
                        "{} count {} exceeds the maximum of {}",
                        relation, count, max
                    )));
                }
            }
            if heirs.insert(relation, count).is_some() {
                return Err(FaraidError::DuplicateRelation(relation));
            }
        }

        if heirs.contains_key(&Relation::Husband) && heirs.contains_key(&Relation::Wife) {
            return Err(FaraidError::InvalidRegistry(
                "a decedent cannot leave both a husband and a wife".to_string(),
            ));
        }

        Ok(Self { heirs })
    }

    /// Add one more relation, consuming and re-validating the registry.
    pub fn with(self, relation: Relation, count: u32) -> Result<Self> {
        Self::from_entries(self.heirs.into_iter().chain(std::iter::once((relation, count))))
    }

    /// Subset of this registry restricted to `keep`.
    pub(crate) fn filtered<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(Relation) -> bool,
    {
        Self {
            heirs: self
                .heirs
                .iter()
                .filter(|(relation, _)| keep(**relation))
                .map(|(relation, count)| (*relation, *count))
                .collect(),
        }
    }

    /// Number of living heirs of `relation` (0 when absent)
    pub fn count(&self, relation: Relation) -> u32 {
        self.heirs.get(&relation).copied().unwrap_or(0)
    }

    pub fn contains(&self, relation: Relation) -> bool {
        self.heirs.contains_key(&relation)
    }

    /// True when at least one of `relations` is present
    pub fn has_any(&self, relations: &[Relation]) -> bool {
        relations.iter().any(|r| self.contains(*r))
    }

    /// Total head count over `relations`
    pub fn total_of(&self, relations: &[Relation]) -> u32 {
        relations.iter().map(|r| self.count(*r)).sum()
    }

    /// Total head count over every relation of a kinship group
    pub fn total_kinship(&self, kinship: Kinship) -> u32 {
        self.heirs
            .iter()
            .filter(|(r, _)| r.kinship() == kinship)
            .map(|(_, c)| *c)
            .sum()
    }

    pub fn has_descendant(&self) -> bool {
        self.total_kinship(Kinship::Descendant) > 0
    }

    pub fn has_male_descendant(&self) -> bool {
        self.has_any(&[Relation::Son, Relation::SonsSon])
    }

    pub fn has_female_descendant(&self) -> bool {
        self.has_any(&[Relation::Daughter, Relation::SonsDaughter])
    }

    /// The present spouse relation, if any
    pub fn spouse(&self) -> Option<Relation> {
        [Relation::Husband, Relation::Wife]
            .into_iter()
            .find(|r| self.contains(*r))
    }

    pub fn relations(&self) -> impl Iterator<Item = Relation> + '_ {
        self.heirs.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Heir> + '_ {
        self.heirs.iter().map(|(r, c)| Heir::new(*r, *c))
    }

    pub fn len(&self) -> usize {
        self.heirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heirs.is_empty()
    }
}

impl TryFrom<Vec<Heir>> for HeirRegistry {
    type Error = FaraidError;

    fn try_from(heirs: Vec<Heir>) -> Result<Self> {
        Self::from_entries(heirs.into_iter().map(|h| (h.relation, h.count)))
    }
}

impl From<HeirRegistry> for Vec<Heir> {
    fn from(registry: HeirRegistry) -> Self {
        registry.iter().collect()
    }
}
