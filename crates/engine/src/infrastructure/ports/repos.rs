//! Repository port traits for message and actor storage.

use async_trait::async_trait;
use trait_options_domain::{ActorId, CheckMessage, MessageId};

use super::error::RepoError;
use super::types::ActorRecord;

// =============================================================================
// Chat Messages
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatMessageRepo: Send + Sync {
    async fn get(&self, id: MessageId) -> Result<Option<CheckMessage>, RepoError>;
    async fn save(&self, message: &CheckMessage) -> Result<(), RepoError>;
    async fn list(&self) -> Result<Vec<CheckMessage>, RepoError>;
}

// =============================================================================
// Actors
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActorRepo: Send + Sync {
    async fn get(&self, id: ActorId) -> Result<Option<ActorRecord>, RepoError>;

    /// Delete the first effect with `slug`. Returns whether one was removed.
    async fn remove_effect(&self, id: ActorId, slug: &str) -> Result<bool, RepoError>;
}
