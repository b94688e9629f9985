//! Degree-of-success rules and re-appliable weapon trait modifiers.
//!
//! Pure domain logic: no I/O, no randomness. Dice are rolled through a
//! closure handed in by the caller.

pub mod aggregates;
pub mod error;
pub mod events;
pub mod ids;
pub mod rules;
pub mod value_objects;

mod degree_of_success;

pub use aggregates::{
    AdjustmentSources, CheckContext, CheckMessage, EffectiveRollOptions, FortuneEffect, ItemSummary, MessageRoll,
    RollTwice, Substitution,
};
pub use degree_of_success::{calculate_degree, classify, nudge_by_die, DegreeOfSuccess};
pub use error::DomainError;
pub use events::{ForcefulApplied, TraitApplied};
pub use ids::{ActorId, MessageId};
pub use rules::{
    collect_adjustments, incapacitation_adjustment, DegreeAdjustmentRule, EffectSource, IncapacitationContext,
    Predicate, Statement,
};

// Re-export value objects
pub use value_objects::{
    AdjustmentAmount, AppliedModifierSet, CheckType, DamageRoll, Degree, DegreeAdjustment, DegreeAdjustments,
    DiceParseError, DiceTerm, DieResult, DifficultyClass, Modifier, ModifierType, Operator, OutcomeKey, RollExpression,
    RollKind, RollOutcome, RollTerm, StatisticModifier, TraitModifier,
};
