//! Heir model and case loading

mod registry;
mod relation;
pub mod loader;

pub use registry::{Heir, HeirRegistry};
pub use relation::{Gender, Kinship, Relation};
pub use loader::{load_cases, load_cases_from_reader, EstateCase};
