//! Suppressed modifiers that can be re-applied after the roll.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Which kind of roll message a modifier is offered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RollKind {
    AttackRoll,
    DamageRoll,
    /// Any check graded against a DC (attack, save, skill)
    Check,
}

/// Every modifier this add-on knows how to re-apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraitModifier {
    /// +1 circumstance to attack after missing the target this turn
    Backswing,
    /// +1 circumstance to attack a different target this turn
    Sweep,
    /// Forceful damage on the second attack of the turn
    ForcefulSecond,
    /// Forceful damage on the third and later attacks of the turn
    ForcefulThird,
    /// +1 on a failed check while the Nudge Fate effect is active
    NudgeFate,
}

impl TraitModifier {
    pub const ALL: [TraitModifier; 5] = [
        TraitModifier::Backswing,
        TraitModifier::Sweep,
        TraitModifier::ForcefulSecond,
        TraitModifier::ForcefulThird,
        TraitModifier::NudgeFate,
    ];

    /// Attack-roll trait buttons, in display order.
    pub const ATTACK_TRAITS: [TraitModifier; 2] = [TraitModifier::Backswing, TraitModifier::Sweep];

    /// Slug of the modifier on the roll.
    pub fn slug(self) -> &'static str {
        match self {
            TraitModifier::Backswing => "backswing",
            TraitModifier::Sweep => "sweep",
            TraitModifier::ForcefulSecond => "forceful-second",
            TraitModifier::ForcefulThird => "forceful-third",
            TraitModifier::NudgeFate => "nudge-fate",
        }
    }

    /// Weapon trait the item must carry, `None` for effect-driven modifiers.
    pub fn weapon_trait(self) -> Option<&'static str> {
        match self {
            TraitModifier::Backswing => Some("backswing"),
            TraitModifier::Sweep => Some("sweep"),
            TraitModifier::ForcefulSecond | TraitModifier::ForcefulThird => Some("forceful"),
            TraitModifier::NudgeFate => None,
        }
    }

    pub fn roll_kind(self) -> RollKind {
        match self {
            TraitModifier::Backswing | TraitModifier::Sweep => RollKind::AttackRoll,
            TraitModifier::ForcefulSecond | TraitModifier::ForcefulThird => RollKind::DamageRoll,
            TraitModifier::NudgeFate => RollKind::Check,
        }
    }

    /// Roll option recorded once the modifier has been applied.
    pub fn bonus_option(self) -> String {
        format!("{}-bonus", self.slug())
    }

    /// Forceful stage for the attack number encoded in the MAP roll options.
    pub fn forceful_stage(options: &BTreeSet<String>) -> TraitModifier {
        if options.contains("map:increases:1") {
            TraitModifier::ForcefulSecond
        } else {
            TraitModifier::ForcefulThird
        }
    }
}

impl fmt::Display for TraitModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for TraitModifier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TraitModifier::ALL
            .into_iter()
            .find(|m| m.slug() == s)
            .ok_or_else(|| DomainError::parse(format!("Unknown trait modifier: {}", s)))
    }
}

/// Modifiers already applied to a message, so they are not offered twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppliedModifierSet(BTreeSet<TraitModifier>);

impl AppliedModifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, modifier: TraitModifier) -> bool {
        self.0.contains(&modifier)
    }

    /// A new set that also records `modifier`.
    pub fn with(&self, modifier: TraitModifier) -> Self {
        let mut applied = self.0.clone();
        applied.insert(modifier);
        Self(applied)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TraitModifier> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<TraitModifier> for AppliedModifierSet {
    fn from_iter<T: IntoIterator<Item = TraitModifier>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
