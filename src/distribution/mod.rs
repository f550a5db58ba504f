//! Share distribution pipeline
//!
//! Registry -> eligibility (Hajb) -> fixed shares (Fard) -> residuary (Asaba)
//! -> adjustment (Awl/Radd) -> validated [`ShareTable`].

pub mod adjustment;
pub mod eligibility;
pub mod engine;
pub mod fixed;
pub mod residuary;
pub mod table;

pub use adjustment::AdjustmentOutcome;
pub use eligibility::{Eligibility, Exclusion, ExclusionReason};
pub use engine::DistributionEngine;
pub use table::{Apportionment, Basis, ShareEntry, ShareTable};
