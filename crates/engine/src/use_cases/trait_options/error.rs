//! Trait option errors.

use crate::infrastructure::ports::RepoError;
use trait_options_domain::{ActorId, DomainError, MessageId, TraitModifier};

/// Errors that can occur while offering or applying trait modifiers.
#[derive(Debug, thiserror::Error)]
pub enum TraitOptionError {
    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),
    #[error("Actor not found: {0}")]
    ActorNotFound(ActorId),
    #[error("{modifier} cannot be applied to message {message}")]
    NotEligible { modifier: TraitModifier, message: MessageId },
    #[error("Validation error: {0}")]
    Validation(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}
