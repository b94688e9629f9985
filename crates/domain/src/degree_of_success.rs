//! Degree of success calculation.
//!
//! PF2e compares a check total against a DC and grades the result:
//! - beat the DC by 10 or more: critical success
//! - miss the DC by 10 or more: critical failure
//! - otherwise meet it for a success, fall short for a failure
//!
//! A natural 20 then moves the result one step up and a natural 1 one step
//! down. Finally at most one rule-based adjustment is applied on top.

use serde::{Deserialize, Serialize};

use crate::value_objects::{Degree, DegreeAdjustment, DegreeAdjustments, DifficultyClass, RollExpression, RollOutcome};
use crate::DomainError;

const NATURAL_MAX: i32 = 20;
const NATURAL_MIN: i32 = 1;
const CRITICAL_MARGIN: i32 = 10;

/// The graded result of a single check.
///
/// Built once per roll and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DegreeOfSuccess {
    /// Degree after the natural 20/1 nudge, before rule adjustments
    pub unadjusted: Degree,
    pub adjustment: Option<DegreeAdjustment>,
    /// Final degree
    pub value: Degree,
    pub die_result: i32,
    pub roll_total: i32,
    pub dc: DifficultyClass,
}

impl DegreeOfSuccess {
    /// Grade `roll` against `dc`, applying the first qualifying adjustment.
    pub fn compute(roll: RollOutcome, dc: DifficultyClass, adjustments: Option<&DegreeAdjustments>) -> Self {
        let unadjusted = calculate_degree(dc.value, roll.total, roll.die_result);
        let adjustment = adjustments.and_then(|a| a.resolve(unadjusted)).cloned();
        let value = adjustment
            .as_ref()
            .map_or(unadjusted, |a| a.amount.apply(unadjusted));

        Self {
            unadjusted,
            adjustment,
            value,
            die_result: roll.die_result,
            roll_total: roll.total,
            dc,
        }
    }

    /// Grade an evaluated roll expression.
    pub fn from_expression(
        roll: &RollExpression,
        dc: DifficultyClass,
        adjustments: Option<&DegreeAdjustments>,
    ) -> Result<Self, DomainError> {
        Ok(Self::compute(RollOutcome::from_expression(roll)?, dc, adjustments))
    }

    /// How far the total landed from the DC (positive when it beat it).
    pub fn offset(&self) -> i32 {
        self.roll_total.saturating_sub(self.dc.value)
    }

    pub fn is_adjusted(&self) -> bool {
        self.adjustment.is_some()
    }
}

/// Base classification from the margin, before any die nudge.
pub fn classify(dc: i32, total: i32) -> Degree {
    let margin = i64::from(total) - i64::from(dc);
    if margin >= i64::from(CRITICAL_MARGIN) {
        Degree::CriticalSuccess
    } else if margin <= -i64::from(CRITICAL_MARGIN) {
        Degree::CriticalFailure
    } else if margin >= 0 {
        Degree::Success
    } else {
        Degree::Failure
    }
}

/// Shift a degree by the natural die face: 20 up a step, 1 down a step.
pub fn nudge_by_die(die_result: i32, degree: Degree) -> Degree {
    match die_result {
        NATURAL_MAX => degree.upgrade(),
        NATURAL_MIN => degree.downgrade(),
        _ => degree,
    }
}

/// Classified and nudged degree, i.e. the unadjusted result of a check.
pub fn calculate_degree(dc: i32, total: i32, die_result: i32) -> Degree {
    nudge_by_die(die_result, classify(dc, total))
}
