//! Numeric modifiers and PF2e stacking
//!
//! Typed bonuses and penalties don't stack: only the highest bonus and the
//! lowest penalty of each type count. Untyped modifiers always stack.
//! Ignored modifiers never count.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Modifier types recognised by the stacking rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierType {
    Ability,
    Proficiency,
    Circumstance,
    Item,
    Status,
    #[default]
    Untyped,
}

/// A named bonus or penalty to a roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    pub slug: String,
    pub label: String,
    pub modifier: i32,
    #[serde(rename = "type", default)]
    pub kind: ModifierType,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub ignored: bool,
    /// Damage modifiers may only apply to one damage type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_type: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl Modifier {
    pub fn new(slug: impl Into<String>, label: impl Into<String>, modifier: i32, kind: ModifierType) -> Self {
        Self {
            slug: slug.into(),
            label: label.into(),
            modifier,
            kind,
            enabled: true,
            ignored: false,
            damage_type: None,
        }
    }

    /// A modifier that is present on the roll but was switched off.
    pub fn suppressed(mut self) -> Self {
        self.enabled = false;
        self.ignored = true;
        self
    }

    pub fn with_damage_type(mut self, damage_type: impl Into<String>) -> Self {
        self.damage_type = Some(damage_type.into());
        self
    }

    /// The same modifier, switched back on.
    pub fn activated(&self) -> Self {
        Self {
            enabled: true,
            ignored: false,
            ..self.clone()
        }
    }

    pub fn is_active(&self) -> bool {
        self.enabled && !self.ignored
    }

    /// Untyped damage modifiers apply to every damage type.
    pub fn applies_to_damage_type(&self, damage_type: &str) -> bool {
        self.damage_type.as_deref().map_or(true, |t| t == damage_type)
    }
}

/// A statistic's modifier list after stacking rules were applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticModifier {
    pub slug: String,
    pub modifiers: Vec<Modifier>,
    pub total_modifier: i32,
}

impl StatisticModifier {
    /// Apply stacking to `modifiers`, recomputing every `enabled` flag.
    pub fn new(slug: impl Into<String>, modifiers: Vec<Modifier>) -> Self {
        let mut winners: HashMap<(ModifierType, bool), usize> = HashMap::new();
        for (index, modifier) in modifiers.iter().enumerate() {
            if modifier.ignored || modifier.kind == ModifierType::Untyped {
                continue;
            }
            let is_penalty = modifier.modifier < 0;
            winners
                .entry((modifier.kind, is_penalty))
                .and_modify(|best| {
                    let current = modifiers[*best].modifier;
                    let better = if is_penalty {
                        modifier.modifier < current
                    } else {
                        modifier.modifier > current
                    };
                    if better {
                        *best = index;
                    }
                })
                .or_insert(index);
        }

        let modifiers: Vec<Modifier> = modifiers
            .into_iter()
            .enumerate()
            .map(|(index, modifier)| {
                let enabled = !modifier.ignored
                    && (modifier.kind == ModifierType::Untyped
                        || winners.get(&(modifier.kind, modifier.modifier < 0)) == Some(&index));
                Modifier { enabled, ..modifier }
            })
            .collect();

        let total_modifier = modifiers
            .iter()
            .filter(|m| m.enabled)
            .fold(0i32, |acc, m| acc.saturating_add(m.modifier));

        Self {
            slug: slug.into(),
            modifiers,
            total_modifier,
        }
    }

    pub fn enabled(&self) -> impl Iterator<Item = &Modifier> {
        self.modifiers.iter().filter(|m| m.enabled)
    }
}
