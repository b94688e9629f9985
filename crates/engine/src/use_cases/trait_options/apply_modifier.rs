//! Apply trait modifier use case.
//!
//! Switches on a suppressed check modifier (backswing, sweep, nudge fate),
//! regrades the check with the actor's adjustment rules and saves it.

use std::sync::Arc;

use trait_options_domain::{AdjustmentSources, MessageId, RollKind, TraitApplied, TraitModifier};

use crate::infrastructure::ports::{ActorRepo, ChatMessageRepo};

use super::error::TraitOptionError;

pub struct ApplyTraitModifier {
    messages: Arc<dyn ChatMessageRepo>,
    actors: Arc<dyn ActorRepo>,
}

impl ApplyTraitModifier {
    pub fn new(messages: Arc<dyn ChatMessageRepo>, actors: Arc<dyn ActorRepo>) -> Self {
        Self { messages, actors }
    }

    /// Execute the apply use case.
    ///
    /// # Returns
    /// * `Ok(TraitApplied)` - The rebuilt total and, when graded, the new degree
    /// * `Err(TraitOptionError::NotEligible)` - The button should not have been offered
    pub async fn execute(&self, message_id: MessageId, kind: TraitModifier) -> Result<TraitApplied, TraitOptionError> {
        let mut message = self
            .messages
            .get(message_id)
            .await?
            .ok_or(TraitOptionError::MessageNotFound(message_id))?;

        if kind.roll_kind() == RollKind::DamageRoll || !message.is_eligible(kind) {
            return Err(TraitOptionError::NotEligible {
                modifier: kind,
                message: message_id,
            });
        }

        let actor = self
            .actors
            .get(message.actor_id())
            .await?
            .ok_or(TraitOptionError::ActorNotFound(message.actor_id()))?;

        let target_level = match message.target_id() {
            Some(target_id) => {
                let target = self.actors.get(target_id).await?;
                if target.is_none() {
                    tracing::debug!(target_id = %target_id, "Target actor not found, skipping level comparison");
                }
                target.map(|t| t.level)
            }
            None => None,
        };

        let event = message.apply_check_modifier(
            kind,
            AdjustmentSources {
                rules: &actor.adjustment_rules,
                self_level: actor.level,
                target_level,
            },
        )?;

        self.messages.save(&message).await?;

        tracing::info!(
            message_id = %message_id,
            modifier = %kind,
            new_total = event.new_total,
            outcome = ?event.degree.as_ref().map(|d| d.value),
            "{} was added",
            kind
        );

        Ok(event)
    }
}
