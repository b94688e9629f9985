//! Trait options engine library.
//!
//! Server-side half of the weapon trait add-on: applies suppressed
//! modifiers to rolled chat messages and regrades them.
//!
//! ## Structure
//!
//! - `use_cases/` - User story orchestration over ports
//! - `infrastructure/` - Port traits and their adapters (JSON store, config, log notifier)
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
