//! Weapon damage rolls
//!
//! Damage is kept as its rolled dice plus the modifier list, so the formula
//! can be rebuilt whenever a modifier is switched on. Critical hits double
//! the whole expression.

use serde::{Deserialize, Serialize};

use super::{DiceTerm, Modifier, RollExpression, StatisticModifier};
use crate::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageRoll {
    /// Weapon damage dice, already rolled
    pub dice: Vec<DiceTerm>,
    /// Damage type of the base damage (e.g. "slashing")
    pub damage_type: String,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub critical: bool,
}

impl DamageRoll {
    pub fn new(dice: Vec<DiceTerm>, damage_type: impl Into<String>, modifiers: Vec<Modifier>) -> Self {
        Self {
            dice,
            damage_type: damage_type.into(),
            modifiers,
            critical: false,
        }
    }

    pub fn critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    /// Stacked modifiers that apply to the base damage type.
    pub fn statistic(&self) -> StatisticModifier {
        let applicable = self
            .modifiers
            .iter()
            .filter(|m| m.applies_to_damage_type(&self.damage_type))
            .cloned()
            .collect();
        StatisticModifier::new("damage", applicable)
    }

    /// Rebuild the damage formula from the dice and current modifiers.
    pub fn expression(&self) -> RollExpression {
        let base = RollExpression::rebuild(self.dice.iter().cloned(), self.statistic().total_modifier);
        if self.critical {
            base.multiplied(2)
        } else {
            base
        }
    }

    pub fn total(&self) -> Option<i32> {
        self.expression().total()
    }

    pub fn has_enabled(&self, slug: &str) -> bool {
        self.modifiers.iter().any(|m| m.slug == slug && m.enabled)
    }

    /// A copy of this roll with the modifier `slug` switched on.
    pub fn with_modifier_enabled(&self, slug: &str) -> Result<Self, DomainError> {
        if !self.modifiers.iter().any(|m| m.slug == slug) {
            return Err(DomainError::validation(format!("Damage roll has no '{}' modifier", slug)));
        }
        let modifiers = self
            .modifiers
            .iter()
            .map(|m| if m.slug == slug { m.activated() } else { m.clone() })
            .collect();
        Ok(Self {
            modifiers,
            ..self.clone()
        })
    }
}
