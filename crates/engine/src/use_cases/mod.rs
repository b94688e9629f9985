//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific area.
//! Use cases talk to port traits directly; there is no wrapper layer.

pub mod check;
pub mod trait_options;

pub use check::CheckUseCases;
pub use trait_options::TraitOptionUseCases;
