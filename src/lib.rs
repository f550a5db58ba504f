//! Fara'id - exact share distribution for Islamic inheritance
//!
//! This library provides:
//! - Heir registries with per-relation head counts
//! - Blocking (Hajb) of relatives excluded by closer heirs
//! - Fixed Quranic shares and residuary (Asaba) distribution
//! - Proportional reduction (Awl) and return (Radd) of the estate
//! - Exact rational arithmetic throughout, with CSV batch runs

pub mod batch;
pub mod config;
pub mod distribution;
pub mod error;
pub mod estate;
pub mod heirs;
pub mod rational;

// Re-export commonly used types
pub use batch::{BatchRunner, CaseResult};
pub use config::{EngineConfig, GrandfatherSiblingsPolicy, RaddSpousePolicy};
pub use distribution::{AdjustmentOutcome, Basis, DistributionEngine, ShareEntry, ShareTable};
pub use error::{FaraidError, Result};
pub use estate::{EstateValue, GrossEstate};
pub use heirs::{EstateCase, HeirRegistry, Relation};
pub use rational::Rational;
