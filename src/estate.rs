//! Estate values handed to the engine
//!
//! The engine only deals in fractions. [`EstateValue`] is carried alongside a
//! share table so callers can turn fractions into amounts, and
//! [`GrossEstate`] derives the net distributable value from the gross figures
//! an intake form collects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FaraidError, Result};
use crate::rational::Rational;

/// Net distributable value of an estate. Always strictly positive.
///
/// Currency-agnostic: the unit is whatever the caller uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Rational", into = "Rational")]
pub struct EstateValue(Rational);

impl EstateValue {
    pub fn new(value: Rational) -> Result<Self> {
        if !value.is_positive() {
            return Err(FaraidError::InvalidEstate(format!(
                "net estate must be positive, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> &Rational {
        &self.0
    }

    /// Amount corresponding to `fraction` of the estate
    pub fn amount_of(&self, fraction: &Rational) -> Rational {
        &self.0 * fraction
    }
}

impl fmt::Display for EstateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EstateValue {
    type Err = FaraidError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s.parse()?)
    }
}

impl TryFrom<Rational> for EstateValue {
    type Error = FaraidError;

    fn try_from(value: Rational) -> Result<Self> {
        Self::new(value)
    }
}

impl From<EstateValue> for Rational {
    fn from(value: EstateValue) -> Self {
        value.0
    }
}

/// Gross estate figures before the charges that precede inheritance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrossEstate {
    /// Total value of the decedent's assets
    pub assets: Rational,

    /// Funeral and burial costs
    #[serde(default)]
    pub funeral_costs: Rational,

    /// Outstanding debts
    #[serde(default)]
    pub debts: Rational,

    /// Bequests requested in the will, before the one-third cap
    #[serde(default)]
    pub bequests: Rational,
}

impl GrossEstate {
    pub fn new(assets: Rational) -> Self {
        Self {
            assets,
            funeral_costs: Rational::zero(),
            debts: Rational::zero(),
            bequests: Rational::zero(),
        }
    }

    /// Value left after funeral costs and debts, before bequests
    pub fn after_charges(&self) -> Result<Rational> {
        for (label, value) in [
            ("assets", &self.assets),
            ("funeral costs", &self.funeral_costs),
            ("debts", &self.debts),
            ("bequests", &self.bequests),
        ] {
            if value.is_negative() {
                return Err(FaraidError::InvalidEstate(format!(
                    "{} cannot be negative, got {}",
                    label, value
                )));
            }
        }
        Ok(&(&self.assets - &self.funeral_costs) - &self.debts)
    }

    /// Largest bequest the heirs are bound by: one third of the value after
    /// funeral costs and debts
    pub fn bequest_cap(&self) -> Result<Rational> {
        let remaining = self.after_charges()?;
        if !remaining.is_positive() {
            return Ok(Rational::zero());
        }
        remaining.split(3)
    }

    /// Bequests actually deducted (requested bequests, capped)
    pub fn allowed_bequests(&self) -> Result<Rational> {
        let cap = self.bequest_cap()?;
        Ok(self.bequests.clone().min(cap))
    }

    /// Portion of the requested bequests above the cap
    pub fn bequest_excess(&self) -> Result<Rational> {
        let allowed = self.allowed_bequests()?;
        Ok(&self.bequests - &allowed)
    }

    /// Net distributable estate after funeral costs, debts and capped bequests
    pub fn net(&self) -> Result<EstateValue> {
        let remaining = self.after_charges()?;
        if !remaining.is_positive() {
            return Err(FaraidError::InvalidEstate(format!(
                "funeral costs and debts exhaust the estate (remaining {})",
                remaining
            )));
        }
        let allowed = self.allowed_bequests()?;
        EstateValue::new(&remaining - &allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(s: &str) -> Rational {
        s.parse().unwrap()
    }

    #[test]
    fn test_estate_value_must_be_positive() {
        assert!(EstateValue::new(q("100")).is_ok());
        assert!(matches!(
            EstateValue::new(Rational::zero()),
            Err(FaraidError::InvalidEstate(_))
        ));
        assert!("-5".parse::<EstateValue>().is_err());
    }

    #[test]
    fn test_amount_of() {
        let estate: EstateValue = "120000".parse().unwrap();
        assert_eq!(estate.amount_of(&q("3/13")), q("360000/13"));
        assert_eq!(estate.amount_of(&q("1/8")), q("15000"));
    }

    #[test]
    fn test_net_without_bequests() {
        let gross = GrossEstate {
            assets: q("100000"),
            funeral_costs: q("2500.50"),
            debts: q("7499.50"),
            bequests: Rational::zero(),
        };
        assert_eq!(gross.net().unwrap().value(), &q("90000"));
    }

    #[test]
    fn test_bequests_capped_at_one_third() {
        let gross = GrossEstate {
            assets: q("100000"),
            funeral_costs: q("4000"),
            debts: q("6000"),
            bequests: q("50000"),
        };
        assert_eq!(gross.bequest_cap().unwrap(), q("30000"));
        assert_eq!(gross.allowed_bequests().unwrap(), q("30000"));
        assert_eq!(gross.bequest_excess().unwrap(), q("20000"));
        assert_eq!(gross.net().unwrap().value(), &q("60000"));
    }

    #[test]
    fn test_bequests_under_cap() {
        let mut gross = GrossEstate::new(q("9000"));
        gross.bequests = q("1000");
        assert_eq!(gross.bequest_excess().unwrap(), Rational::zero());
        assert_eq!(gross.net().unwrap().value(), &q("8000"));
    }

    #[test]
    fn test_exhausted_estate() {
        let mut gross = GrossEstate::new(q("5000"));
        gross.debts = q("5000");
        assert!(matches!(gross.net(), Err(FaraidError::InvalidEstate(_))));

        let mut negative = GrossEstate::new(q("5000"));
        negative.debts = q("-1");
        assert!(negative.net().is_err());
    }

    #[test]
    fn test_deserialize_gross_estate() {
        let json = r#"{"assets":"250000.00","debts":"10000"}"#;
        let gross: GrossEstate = serde_json::from_str(json).unwrap();
        assert_eq!(gross.funeral_costs, Rational::zero());
        assert_eq!(gross.net().unwrap().value(), &q("240000"));
    }

    #[test]
    fn test_deserialize_json_numbers() {
        let json = r#"{"assets":250000,"debts":10000}"#;
        let gross: GrossEstate = serde_json::from_str(json).unwrap();
        assert_eq!(gross.assets, q("250000"));
        assert_eq!(gross.net().unwrap().value(), &q("240000"));

        let estate: EstateValue = serde_json::from_str("1250.75").unwrap();
        assert_eq!(estate.value(), &q("5003/4"));

        let mixed: GrossEstate =
            serde_json::from_str(r#"{"assets":1000.10,"funeral_costs":"0.10","bequests":300}"#)
                .unwrap();
        assert_eq!(mixed.net().unwrap().value(), &q("700"));

        assert!(serde_json::from_str::<EstateValue>("-1250.75").is_err());
        assert!(serde_json::from_str::<EstateValue>("0").is_err());
    }
}
