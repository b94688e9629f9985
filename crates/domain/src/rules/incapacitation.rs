//! Incapacitation trait
//!
//! Effects with the incapacitation trait are weaker against creatures of a
//! higher level than the effect: the creature's save improves by a step, or
//! the caster's attack or skill check against it worsens by a step.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::value_objects::{AdjustmentAmount, CheckType, DegreeAdjustment, DegreeAdjustments, OutcomeKey};

pub const INCAPACITATION_LABEL: &str = "PF2E.TraitIncapacitation";

/// What produced the effect being rolled against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EffectSource {
    Spell {
        rank: i32,
    },
    PhysicalItem {
        level: i32,
    },
    /// Anything else; falls back to the rolling actor's level
    Other {
        #[serde(default, rename = "originLevel")]
        origin_level: Option<i32>,
    },
}

impl Default for EffectSource {
    fn default() -> Self {
        EffectSource::Other { origin_level: None }
    }
}

impl EffectSource {
    /// Spells count as twice their rank.
    pub fn effect_level(&self, self_level: i32) -> i32 {
        match self {
            EffectSource::Spell { rank } => rank.saturating_mul(2),
            EffectSource::PhysicalItem { level } => *level,
            EffectSource::Other { origin_level } => origin_level.unwrap_or(self_level),
        }
    }
}

/// Levels involved in an incapacitation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncapacitationContext {
    pub check_type: CheckType,
    pub self_level: i32,
    pub target_level: Option<i32>,
    pub source: EffectSource,
}

pub fn has_incapacitation(options: &BTreeSet<String>) -> bool {
    options.contains("incapacitation") || options.contains("item:trait:incapacitation")
}

/// The `all` adjustment incapacitation adds to a check against a DC, if any.
pub fn incapacitation_adjustment(
    options: &BTreeSet<String>,
    has_dc: bool,
    context: &IncapacitationContext,
) -> Option<DegreeAdjustments> {
    if !has_dc || !has_incapacitation(options) {
        return None;
    }

    let effect_level = context.source.effect_level(context.self_level);
    let amount = if context.check_type == CheckType::SavingThrow && context.self_level > effect_level {
        AdjustmentAmount::INCREASE
    } else if context.check_type.targets_defense() && context.target_level.is_some_and(|level| level > effect_level) {
        AdjustmentAmount::LOWER
    } else {
        return None;
    };

    Some(DegreeAdjustments::new().with(OutcomeKey::All, DegreeAdjustment::new(INCAPACITATION_LABEL, amount)))
}
