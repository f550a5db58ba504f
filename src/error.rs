//! Error types for the distribution engine
//!
//! Every failure is returned as a value. A failure is always an input defect
//! (or, for `DivisionByZero` and `InvariantViolation`, an engine defect), so
//! the same input fails the same way every time.

use thiserror::Error;

use crate::heirs::Relation;

/// Top-level error type for the engine and its loaders.
#[derive(Error, Debug)]
pub enum FaraidError {
    /// A rational denominator would have been zero.
    #[error("division by zero in {operation}")]
    DivisionByZero {
        /// Arithmetic operation that failed
        operation: &'static str,
    },

    /// Heir combination outside the supported rule table.
    #[error("unsupported heir configuration: {0}")]
    UnsupportedConfiguration(String),

    /// Nobody in the registry is entitled to inherit.
    #[error("no eligible heirs")]
    NoEligibleHeirs,

    /// Registry rejected at construction time.
    #[error("invalid heir registry: {0}")]
    InvalidRegistry(String),

    /// Relation named more than once where a single entry is required.
    #[error("duplicate entry for {0}")]
    DuplicateRelation(Relation),

    /// Estate value is missing, zero or negative.
    #[error("invalid estate value: {0}")]
    InvalidEstate(String),

    /// A computed share table broke one of its invariants.
    #[error("share table invariant violated: {0}")]
    InvariantViolation(String),

    /// Text could not be read as a rational number.
    #[error("invalid rational literal: {0:?}")]
    InvalidRational(String),

    /// Unknown relation name.
    #[error("unknown relation: {0:?}")]
    UnknownRelation(String),

    /// CSV read or write failure.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON read or write failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, FaraidError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = FaraidError::DivisionByZero { operation: "reciprocal" };
        assert_eq!(err.to_string(), "division by zero in reciprocal");

        let err = FaraidError::DuplicateRelation(Relation::Husband);
        assert_eq!(err.to_string(), "duplicate entry for husband");

        assert_eq!(FaraidError::NoEligibleHeirs.to_string(), "no eligible heirs");
    }
}
