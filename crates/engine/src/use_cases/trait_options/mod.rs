//! Trait option use cases.
//!
//! Offering and applying the weapon trait buttons (backswing, sweep,
//! forceful) and the GM-only Nudge Fate on rolled checks.

use std::sync::Arc;

use serde::Serialize;
use trait_options_domain::{Degree, ForcefulApplied, MessageId, RollKind, TraitApplied, TraitModifier};

mod apply_forceful;
mod apply_modifier;
mod error;
mod nudge_fate;
mod offer;

pub use apply_forceful::ApplyForceful;
pub use apply_modifier::ApplyTraitModifier;
pub use error::TraitOptionError;
pub use nudge_fate::{NudgeFate, NudgeFateOutcome, NUDGE_FATE_EFFECT};
pub use offer::{OfferTraitOptions, TraitOption};

/// Result of pressing a trait button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AppliedTrait {
    Check {
        modifier: TraitModifier,
        new_total: i32,
        outcome: Option<Degree>,
        extra_tags: Vec<String>,
    },
    Damage {
        modifier: TraitModifier,
        previous_total: Option<i32>,
        new_total: Option<i32>,
        critical: bool,
    },
}

impl From<TraitApplied> for AppliedTrait {
    fn from(event: TraitApplied) -> Self {
        Self::Check {
            modifier: event.modifier,
            new_total: event.new_total,
            outcome: event.degree.map(|d| d.value),
            extra_tags: event.extra_tags,
        }
    }
}

impl From<ForcefulApplied> for AppliedTrait {
    fn from(event: ForcefulApplied) -> Self {
        Self::Damage {
            modifier: event.modifier,
            previous_total: event.previous_total,
            new_total: event.new_total,
            critical: event.critical,
        }
    }
}

/// Container for trait option use cases.
pub struct TraitOptionUseCases {
    pub offer: Arc<OfferTraitOptions>,
    pub apply_modifier: Arc<ApplyTraitModifier>,
    pub apply_forceful: Arc<ApplyForceful>,
    pub nudge_fate: Arc<NudgeFate>,
}

impl TraitOptionUseCases {
    pub fn new(
        offer: Arc<OfferTraitOptions>,
        apply_modifier: Arc<ApplyTraitModifier>,
        apply_forceful: Arc<ApplyForceful>,
        nudge_fate: Arc<NudgeFate>,
    ) -> Self {
        Self {
            offer,
            apply_modifier,
            apply_forceful,
            nudge_fate,
        }
    }

    /// Apply the modifier behind a button, routing forceful to the damage path.
    pub async fn apply(&self, message_id: MessageId, kind: TraitModifier) -> Result<AppliedTrait, TraitOptionError> {
        match kind.roll_kind() {
            RollKind::DamageRoll => Ok(self.apply_forceful.execute(message_id, kind).await?.into()),
            RollKind::AttackRoll | RollKind::Check => Ok(self.apply_modifier.execute(message_id, kind).await?.into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use trait_options_domain::{
        calculate_degree, ActorId, CheckContext, CheckMessage, CheckType, DamageRoll, DiceTerm, DieResult,
        DifficultyClass, ItemSummary, Modifier, ModifierType, RollExpression,
    };

    /// Greataxe strike at `1d20 + 7` with suppressed backswing and sweep.
    pub fn attack_message(face: i32, dc: i32) -> CheckMessage {
        let context = CheckContext::new(CheckType::AttackRoll)
            .with_options(["action:strike"])
            .with_domains(["attack-roll", "strike-attack-roll"])
            .with_dc(DifficultyClass::new(dc));
        CheckMessage::check(ActorId::new(), "strike", context, RollExpression::check(DiceTerm::d20(face), 7))
            .with_modifiers(vec![
                Modifier::new("str", "Strength", 4, ModifierType::Ability),
                Modifier::new("proficiency", "Trained", 3, ModifierType::Proficiency),
                Modifier::new("backswing", "Backswing", 1, ModifierType::Circumstance).suppressed(),
                Modifier::new("sweep", "Sweep", 1, ModifierType::Circumstance).suppressed(),
            ])
            .with_item(ItemSummary::new("Greataxe").with_traits(["backswing", "sweep", "forceful"]))
    }

    /// Greataxe damage of `1d12 (8) + 4` after the attack penalty went up.
    pub fn damage_message(map_option: &str) -> CheckMessage {
        let roll = DamageRoll::new(
            vec![DiceTerm::new(1, 12).unwrap().with_results([DieResult::active(8)])],
            "slashing",
            vec![
                Modifier::new("str", "Strength", 4, ModifierType::Ability),
                Modifier::new("forceful-second", "Forceful", 1, ModifierType::Circumstance).suppressed(),
                Modifier::new("forceful-third", "Forceful", 2, ModifierType::Circumstance).suppressed(),
            ],
        );
        let context = CheckContext::new(CheckType::DamageRoll).with_options([map_option]);
        CheckMessage::damage(ActorId::new(), "damage", context, roll)
            .with_item(ItemSummary::new("Greataxe").with_traits(["forceful"]))
    }

    /// Fortitude save at `1d20 + 7` graded against `dc`, with a suppressed Nudge Fate.
    pub fn save_message(actor_id: ActorId, face: i32, dc: i32) -> CheckMessage {
        let outcome = calculate_degree(dc, face + 7, face);
        let context = CheckContext::new(CheckType::SavingThrow)
            .with_domains(["fortitude", "saving-throw"])
            .with_dc(DifficultyClass::new(dc))
            .with_outcome(outcome);
        CheckMessage::check(actor_id, "fortitude", context, RollExpression::check(DiceTerm::d20(face), 7))
            .with_modifiers(vec![
                Modifier::new("con", "Constitution", 3, ModifierType::Ability),
                Modifier::new("proficiency", "Expert", 4, ModifierType::Proficiency),
                Modifier::new("nudge-fate", "Nudge Fate", 1, ModifierType::Status).suppressed(),
            ])
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{attack_message, damage_message};
    use super::*;
    use crate::infrastructure::ports::{
        ActorRecord, MockActorRepo, MockChatMessageRepo, MockNotificationPort,
    };
    use std::collections::BTreeSet;

    fn use_cases(messages: MockChatMessageRepo, actors: MockActorRepo) -> TraitOptionUseCases {
        let messages: Arc<MockChatMessageRepo> = Arc::new(messages);
        let actors: Arc<MockActorRepo> = Arc::new(actors);
        let apply_modifier = Arc::new(ApplyTraitModifier::new(messages.clone(), actors.clone()));
        TraitOptionUseCases::new(
            Arc::new(OfferTraitOptions::new(messages.clone(), BTreeSet::new())),
            apply_modifier.clone(),
            Arc::new(ApplyForceful::new(messages.clone())),
            Arc::new(NudgeFate::new(
                messages,
                actors,
                Arc::new(MockNotificationPort::new()),
                apply_modifier,
                BTreeSet::new(),
            )),
        )
    }

    #[tokio::test]
    async fn apply_routes_forceful_to_damage() {
        let message = damage_message("map:increases:1");
        let id = message.id();
        let mut messages = MockChatMessageRepo::new();
        messages
            .expect_get()
            .withf(move |m| *m == id)
            .returning(move |_| Ok(Some(message.clone())));
        messages.expect_save().times(1).returning(|_| Ok(()));

        let result = use_cases(messages, MockActorRepo::new())
            .apply(id, TraitModifier::ForcefulSecond)
            .await
            .unwrap();

        assert_eq!(
            result,
            AppliedTrait::Damage {
                modifier: TraitModifier::ForcefulSecond,
                previous_total: Some(12),
                new_total: Some(13),
                critical: false,
            }
        );
    }

    #[tokio::test]
    async fn apply_routes_attack_traits_to_checks() {
        let message = attack_message(10, 18);
        let id = message.id();
        let actor = ActorRecord::new("Amiri", 5).with_id(message.actor_id());
        let mut messages = MockChatMessageRepo::new();
        messages
            .expect_get()
            .returning(move |_| Ok(Some(message.clone())));
        messages.expect_save().times(1).returning(|_| Ok(()));
        let mut actors = MockActorRepo::new();
        actors
            .expect_get()
            .returning(move |_| Ok(Some(actor.clone())));

        let result = use_cases(messages, actors)
            .apply(id, TraitModifier::Backswing)
            .await
            .unwrap();

        assert_eq!(
            result,
            AppliedTrait::Check {
                modifier: TraitModifier::Backswing,
                new_total: 18,
                outcome: Some(Degree::Success),
                extra_tags: Vec::new(),
            }
        );
    }
}
