//! Unified error types for the domain layer
//!
//! Every fallible domain constructor returns `DomainError`, so the engine can
//! wrap a single type instead of juggling one error per value object.

use thiserror::Error;

use crate::value_objects::DiceParseError;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Neither a die result nor a roll total could be derived from the roll
    #[error("Invalid roll input: {0}")]
    InvalidRollInput(String),

    /// The difficulty class is missing or not an integer
    #[error("Invalid difficulty class: {0}")]
    InvalidDifficultyClass(String),

    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Create an invalid roll input error.
    ///
    /// Raised when a roll carries no usable d20 face (and is not
    /// deterministic) or has not been evaluated yet.
    pub fn invalid_roll(msg: impl Into<String>) -> Self {
        Self::InvalidRollInput(msg.into())
    }

    /// Create an invalid difficulty class error
    pub fn invalid_dc(msg: impl Into<String>) -> Self {
        Self::InvalidDifficultyClass(msg.into())
    }

    /// Creates a validation error for business rule violations.
    ///
    /// # Example
    /// ```ignore
    /// if slug.is_empty() {
    ///     return Err(DomainError::validation("Modifier slug cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    ///
    /// Use this in `FromStr` implementations when the input string
    /// doesn't match any known variant or format.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

impl From<DiceParseError> for DomainError {
    fn from(err: DiceParseError) -> Self {
        Self::Parse(err.to_string())
    }
}
