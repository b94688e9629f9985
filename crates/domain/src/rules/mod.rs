//! Rule elements that feed degree-of-success adjustments

mod adjustment_rules;
mod incapacitation;
mod predicate;

pub use adjustment_rules::{collect_adjustments, select_rules, DegreeAdjustmentRule};
pub use incapacitation::{
    has_incapacitation, incapacitation_adjustment, EffectSource, IncapacitationContext, INCAPACITATION_LABEL,
};
pub use predicate::{Predicate, Statement};
