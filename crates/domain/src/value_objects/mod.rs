//! Value objects - Immutable objects defined by their attributes

mod adjustment;
mod check_type;
mod damage;
mod degree;
mod dice;
mod difficulty_class;
mod modifier;
mod roll_outcome;
mod trait_modifier;

// Degree-of-success ladder
pub use degree::Degree;

pub use adjustment::{AdjustmentAmount, DegreeAdjustment, DegreeAdjustments, OutcomeKey};
pub use check_type::CheckType;
pub use damage::DamageRoll;
pub use dice::{DiceParseError, DiceTerm, DieResult, Operator, RollExpression, RollTerm};
pub use difficulty_class::DifficultyClass;
pub use modifier::{Modifier, ModifierType, StatisticModifier};
pub use roll_outcome::RollOutcome;

// Re-appliable trait modifiers (backswing, sweep, forceful, nudge fate)
pub use trait_modifier::{AppliedModifierSet, RollKind, TraitModifier};
