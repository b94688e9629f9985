use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of roll recorded on a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckType {
    AttackRoll,
    SpellAttackRoll,
    SkillCheck,
    SavingThrow,
    PerceptionCheck,
    FlatCheck,
    DamageRoll,
    /// Unknown variant for forward compatibility
    #[serde(other)]
    Unknown,
}

impl CheckType {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckType::AttackRoll => "attack-roll",
            CheckType::SpellAttackRoll => "spell-attack-roll",
            CheckType::SkillCheck => "skill-check",
            CheckType::SavingThrow => "saving-throw",
            CheckType::PerceptionCheck => "perception-check",
            CheckType::FlatCheck => "flat-check",
            CheckType::DamageRoll => "damage-roll",
            CheckType::Unknown => "unknown",
        }
    }

    /// Checks that roll against a target's defense rather than the actor's own.
    pub fn targets_defense(self) -> bool {
        matches!(
            self,
            CheckType::AttackRoll | CheckType::SpellAttackRoll | CheckType::SkillCheck
        )
    }

    /// Check types a Nudge Fate can improve.
    pub fn can_be_nudged(self) -> bool {
        matches!(
            self,
            CheckType::SavingThrow | CheckType::AttackRoll | CheckType::SkillCheck
        )
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_types_deserialize() {
        let kind: CheckType = serde_json::from_str(r#""initiative""#).unwrap();
        assert_eq!(kind, CheckType::Unknown);
        let kind: CheckType = serde_json::from_str(r#""spell-attack-roll""#).unwrap();
        assert_eq!(kind, CheckType::SpellAttackRoll);
    }

    #[test]
    fn nudge_fate_excludes_spell_attacks() {
        assert!(CheckType::SavingThrow.can_be_nudged());
        assert!(!CheckType::SpellAttackRoll.can_be_nudged());
        assert!(CheckType::SpellAttackRoll.targets_defense());
        assert!(!CheckType::SavingThrow.targets_defense());
    }
}
