//! The two numbers a degree of success is computed from.

use serde::{Deserialize, Serialize};

use super::RollExpression;
use crate::DomainError;

/// Natural face of the primary die plus the complete roll total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollOutcome {
    pub die_result: i32,
    pub total: i32,
}

impl RollOutcome {
    pub fn new(die_result: i32, total: i32) -> Self {
        Self { die_result, total }
    }

    /// A bare die value with a flat modifier, e.g. a roll entered by hand.
    pub fn from_die_and_modifier(die_value: i32, modifier: i32) -> Self {
        Self {
            die_result: die_value,
            total: die_value.saturating_add(modifier),
        }
    }

    /// Extract the pair from an evaluated roll expression.
    ///
    /// The die result is the first active face of the first d20; for a
    /// roll with no dice at all it is the first literal number. Anything
    /// else (no d20, unrolled dice) is rejected.
    pub fn from_expression(roll: &RollExpression) -> Result<Self, DomainError> {
        let total = roll
            .total()
            .ok_or_else(|| DomainError::invalid_roll(format!("'{}' has not been evaluated", roll.formula())))?;

        let die_result = if roll.is_deterministic() {
            roll.numeric_terms().first().copied()
        } else {
            roll.first_d20().and_then(|d| d.first_active())
        }
        .ok_or_else(|| DomainError::invalid_roll(format!("'{}' has no d20 result", roll.formula())))?;

        Ok(Self { die_result, total })
    }
}

impl TryFrom<&RollExpression> for RollOutcome {
    type Error = DomainError;

    fn try_from(roll: &RollExpression) -> Result<Self, Self::Error> {
        RollOutcome::from_expression(roll)
    }
}
