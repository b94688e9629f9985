//! Check use cases.
//!
//! Rolls a fresh check formula and grades it against a DC, for the CLI and
//! for testing adjustment rules outside of a chat message.

use std::sync::Arc;

use serde::Serialize;
use trait_options_domain::{
    DegreeAdjustments, DegreeOfSuccess, DiceParseError, DifficultyClass, DomainError, RollExpression,
};

use crate::infrastructure::ports::RandomPort;

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Invalid formula: {0}")]
    Formula(#[from] DiceParseError),
    #[error("Validation error: {0}")]
    Validation(#[from] DomainError),
}

/// An evaluated check and its grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RolledCheck {
    pub formula: String,
    pub total: i32,
    pub degree: DegreeOfSuccess,
}

pub struct RollCheck {
    random: Arc<dyn RandomPort>,
}

impl RollCheck {
    pub fn new(random: Arc<dyn RandomPort>) -> Self {
        Self { random }
    }

    pub fn execute(
        &self,
        formula: &str,
        dc: DifficultyClass,
        adjustments: Option<&DegreeAdjustments>,
    ) -> Result<RolledCheck, CheckError> {
        let rolled = RollExpression::parse(formula)?.roll_with(|min, max| self.random.gen_range(min, max));
        let degree = DegreeOfSuccess::from_expression(&rolled, dc, adjustments)?;

        tracing::debug!(
            formula = %rolled.formula(),
            die = degree.die_result,
            total = degree.roll_total,
            degree = %degree.value,
            "Rolled check"
        );

        Ok(RolledCheck {
            formula: rolled.formula(),
            total: degree.roll_total,
            degree,
        })
    }
}

/// Container for check use cases.
pub struct CheckUseCases {
    pub roll: Arc<RollCheck>,
}

impl CheckUseCases {
    pub fn new(roll: Arc<RollCheck>) -> Self {
        Self { roll }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockRandomPort;
    use crate::infrastructure::random::FixedRandom;
    use trait_options_domain::{AdjustmentAmount, Degree, DegreeAdjustment, OutcomeKey};

    #[test]
    fn grades_the_rolled_total() {
        let use_case = RollCheck::new(Arc::new(FixedRandom(13)));
        let check = use_case.execute("1d20+5", DifficultyClass::new(18), None).unwrap();

        assert_eq!(check.total, 18);
        assert_eq!(check.degree.die_result, 13);
        assert_eq!(check.degree.value, Degree::Success);
    }

    #[test]
    fn natural_twenty_upgrades() {
        let mut random = MockRandomPort::new();
        random
            .expect_gen_range()
            .withf(|min, max| *min == 1 && *max == 20)
            .times(1)
            .return_const(20);

        let use_case = RollCheck::new(Arc::new(random));
        let check = use_case.execute("d20 - 5", DifficultyClass::new(20), None).unwrap();

        assert_eq!(check.total, 15);
        assert_eq!(check.degree.unadjusted, Degree::Success);
    }

    #[test]
    fn applies_adjustments() {
        let adjustments = DegreeAdjustments::new().with(
            OutcomeKey::CriticalFailure,
            DegreeAdjustment::new("Sturdy", AdjustmentAmount::INCREASE),
        );
        let use_case = RollCheck::new(Arc::new(FixedRandom(2)));
        let check = use_case
            .execute("1d20+1", DifficultyClass::new(20), Some(&adjustments))
            .unwrap();

        assert_eq!(check.degree.unadjusted, Degree::CriticalFailure);
        assert_eq!(check.degree.value, Degree::Failure);
        assert!(check.degree.is_adjusted());
    }

    #[test]
    fn when_formula_is_invalid_returns_error() {
        let use_case = RollCheck::new(Arc::new(FixedRandom(10)));
        let result = use_case.execute("1d20 +", DifficultyClass::new(15), None);
        assert!(matches!(result, Err(CheckError::Formula(_))));
    }

    #[test]
    fn when_formula_has_no_dice_uses_first_number() {
        let use_case = RollCheck::new(Arc::new(FixedRandom(10)));
        let check = use_case.execute("10 + 5", DifficultyClass::new(15), None).unwrap();
        assert_eq!(check.total, 15);
        assert_eq!(check.degree.die_result, 10);
    }
}
