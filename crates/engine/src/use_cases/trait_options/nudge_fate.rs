//! Nudge Fate use case.
//!
//! When a GM sees a failed check from an actor under the Nudge Fate effect,
//! the +1 is applied only if it changes the outcome. The effect is spent
//! afterwards.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use trait_options_domain::{MessageId, TraitModifier};

use crate::infrastructure::ports::{ActorRepo, ChatMessageRepo, NotificationPort, UserRole};

use super::apply_modifier::ApplyTraitModifier;
use super::error::TraitOptionError;
use super::AppliedTrait;

/// Slug of the effect granting Nudge Fate.
pub const NUDGE_FATE_EFFECT: &str = "effect-nudge-fate";

const NUDGE_FATE_NOTICE: &str = "Nudge Fate effect was activated";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "kebab-case")]
pub enum NudgeFateOutcome {
    /// Only the GM resolves Nudge Fate
    NotGm,
    /// Wrong check type, outcome or no Nudge Fate modifier on the roll
    NotApplicable,
    /// +1 would not change the degree
    Unchanged,
    Applied(AppliedTrait),
}

pub struct NudgeFate {
    messages: Arc<dyn ChatMessageRepo>,
    actors: Arc<dyn ActorRepo>,
    notifier: Arc<dyn NotificationPort>,
    apply: Arc<ApplyTraitModifier>,
    disabled: BTreeSet<TraitModifier>,
}

impl NudgeFate {
    pub fn new(
        messages: Arc<dyn ChatMessageRepo>,
        actors: Arc<dyn ActorRepo>,
        notifier: Arc<dyn NotificationPort>,
        apply: Arc<ApplyTraitModifier>,
        disabled: BTreeSet<TraitModifier>,
    ) -> Self {
        Self {
            messages,
            actors,
            notifier,
            apply,
            disabled,
        }
    }

    pub async fn execute(&self, message_id: MessageId, role: UserRole) -> Result<NudgeFateOutcome, TraitOptionError> {
        if !role.is_gm() {
            return Ok(NudgeFateOutcome::NotGm);
        }
        if self.disabled.contains(&TraitModifier::NudgeFate) {
            tracing::debug!(message_id = %message_id, "Nudge Fate is disabled");
            return Ok(NudgeFateOutcome::NotApplicable);
        }

        let message = self
            .messages
            .get(message_id)
            .await?
            .ok_or(TraitOptionError::MessageNotFound(message_id))?;

        if !message.is_eligible(TraitModifier::NudgeFate) {
            return Ok(NudgeFateOutcome::NotApplicable);
        }
        let Some(nudged) = message.nudged_degree() else {
            tracing::debug!(message_id = %message_id, "Nudge Fate would not change the outcome");
            return Ok(NudgeFateOutcome::Unchanged);
        };

        tracing::debug!(message_id = %message_id, nudged = %nudged, "Nudge Fate changes the outcome");
        let event = self.apply.execute(message_id, TraitModifier::NudgeFate).await?;

        // Side effects only warn on failure
        if let Err(e) = self.notifier.info(NUDGE_FATE_NOTICE).await {
            tracing::warn!(error = %e, "Failed to send Nudge Fate notification");
        }
        match self.actors.remove_effect(message.actor_id(), NUDGE_FATE_EFFECT).await {
            Ok(true) => tracing::debug!(actor_id = %message.actor_id(), "Removed Nudge Fate effect"),
            Ok(false) => tracing::debug!(actor_id = %message.actor_id(), "Actor had no Nudge Fate effect"),
            Err(e) => tracing::warn!(
                actor_id = %message.actor_id(),
                error = %e,
                "Failed to remove Nudge Fate effect"
            ),
        }

        Ok(NudgeFateOutcome::Applied(event.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{
        ActorRecord, MockActorRepo, MockChatMessageRepo, MockNotificationPort, NotificationError, RepoError,
    };
    use crate::use_cases::trait_options::test_support::save_message;
    use trait_options_domain::{ActorId, CheckMessage, Degree};

    struct Fixture {
        messages: MockChatMessageRepo,
        actors: MockActorRepo,
        notifier: MockNotificationPort,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                messages: MockChatMessageRepo::new(),
                actors: MockActorRepo::new(),
                notifier: MockNotificationPort::new(),
            }
        }

        fn with_message(mut self, message: CheckMessage) -> Self {
            let id = message.id();
            self.messages
                .expect_get()
                .withf(move |m| *m == id)
                .returning(move |_| Ok(Some(message.clone())));
            self
        }

        fn build(self, disabled: BTreeSet<TraitModifier>) -> NudgeFate {
            let messages: Arc<MockChatMessageRepo> = Arc::new(self.messages);
            let actors: Arc<MockActorRepo> = Arc::new(self.actors);
            let apply = Arc::new(ApplyTraitModifier::new(messages.clone(), actors.clone()));
            NudgeFate::new(messages, actors, Arc::new(self.notifier), apply, disabled)
        }
    }

    #[tokio::test]
    async fn players_cannot_nudge() {
        let use_case = Fixture::new().build(BTreeSet::new());
        let outcome = use_case.execute(MessageId::new(), UserRole::Player).await.unwrap();
        assert_eq!(outcome, NudgeFateOutcome::NotGm);
    }

    #[tokio::test]
    async fn disabled_nudge_is_not_applicable() {
        let use_case = Fixture::new().build([TraitModifier::NudgeFate].into());
        let outcome = use_case.execute(MessageId::new(), UserRole::Gm).await.unwrap();
        assert_eq!(outcome, NudgeFateOutcome::NotApplicable);
    }

    #[tokio::test]
    async fn successes_are_not_applicable() {
        // 15 + 7 = 22 beats DC 20
        let message = save_message(ActorId::new(), 15, 20);
        let id = message.id();
        let mut fixture = Fixture::new().with_message(message);
        fixture.messages.expect_save().never();

        let outcome = fixture.build(BTreeSet::new()).execute(id, UserRole::Gm).await.unwrap();
        assert_eq!(outcome, NudgeFateOutcome::NotApplicable);
    }

    #[tokio::test]
    async fn unchanged_outcome_leaves_the_message_alone() {
        // 5 + 7 = 12 and 13 both fail DC 20
        let message = save_message(ActorId::new(), 5, 20);
        let id = message.id();
        let mut fixture = Fixture::new().with_message(message);
        fixture.messages.expect_save().never();
        fixture.notifier.expect_info().never();
        fixture.actors.expect_remove_effect().never();

        let outcome = fixture.build(BTreeSet::new()).execute(id, UserRole::Gm).await.unwrap();
        assert_eq!(outcome, NudgeFateOutcome::Unchanged);
    }

    #[tokio::test]
    async fn changed_outcome_applies_notifies_and_spends_the_effect() {
        // 12 + 7 = 19 fails DC 20, 20 succeeds
        let actor = ActorRecord::new("Seoni", 4).with_effect(NUDGE_FATE_EFFECT);
        let actor_id = actor.id;
        let message = save_message(actor_id, 12, 20);
        let id = message.id();

        let mut fixture = Fixture::new().with_message(message);
        fixture
            .messages
            .expect_save()
            .withf(|saved| saved.context().outcome == Some(Degree::Success))
            .times(1)
            .returning(|_| Ok(()));
        fixture
            .actors
            .expect_get()
            .withf(move |a| *a == actor_id)
            .returning(move |_| Ok(Some(actor.clone())));
        fixture
            .notifier
            .expect_info()
            .withf(|m| m == NUDGE_FATE_NOTICE)
            .times(1)
            .returning(|_| Ok(()));
        fixture
            .actors
            .expect_remove_effect()
            .withf(move |a, slug| *a == actor_id && slug == NUDGE_FATE_EFFECT)
            .times(1)
            .returning(|_, _| Ok(true));

        let outcome = fixture.build(BTreeSet::new()).execute(id, UserRole::Gm).await.unwrap();

        assert_eq!(
            outcome,
            NudgeFateOutcome::Applied(AppliedTrait::Check {
                modifier: TraitModifier::NudgeFate,
                new_total: 20,
                outcome: Some(Degree::Success),
                extra_tags: Vec::new(),
            })
        );
    }

    #[tokio::test]
    async fn side_effect_failures_do_not_fail_the_nudge() {
        let actor = ActorRecord::new("Seoni", 4);
        let actor_id = actor.id;
        let message = save_message(actor_id, 12, 20);
        let id = message.id();

        let mut fixture = Fixture::new().with_message(message);
        fixture.messages.expect_save().returning(|_| Ok(()));
        fixture
            .actors
            .expect_get()
            .returning(move |_| Ok(Some(actor.clone())));
        fixture
            .notifier
            .expect_info()
            .returning(|_| Err(NotificationError::Failed("no table".to_string())));
        fixture
            .actors
            .expect_remove_effect()
            .returning(|a, _| Err(RepoError::not_found("Actor", a)));

        let outcome = fixture.build(BTreeSet::new()).execute(id, UserRole::Gm).await.unwrap();
        assert!(matches!(outcome, NudgeFateOutcome::Applied(_)));
    }
}
