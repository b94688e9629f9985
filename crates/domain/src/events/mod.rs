//! Domain events
//!
//! Mutations on the check message return these so callers can log, notify
//! or persist without re-deriving what changed.

mod trait_events;

pub use trait_events::{ForcefulApplied, TraitApplied};
