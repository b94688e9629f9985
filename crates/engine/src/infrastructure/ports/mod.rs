//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Message and actor storage (could swap the JSON file for the host's database)
//! - Notifications (could swap log output for chat toasts)
//! - Random (for testing)

mod error;
mod external;
mod repos;
mod testing;
pub mod types;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{ActorRepo, ChatMessageRepo};

pub use types::{ActorRecord, UserRole};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::NotificationPort;

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::{MockActorRepo, MockChatMessageRepo};

#[cfg(test)]
pub use external::MockNotificationPort;

#[cfg(test)]
pub use testing::MockRandomPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::RandomPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::{NotificationError, RepoError};
