//! Apply forceful use case.

use std::sync::Arc;

use trait_options_domain::{ForcefulApplied, MessageId, TraitModifier};

use crate::infrastructure::ports::ChatMessageRepo;

use super::error::TraitOptionError;

/// Switches on the forceful stage for a damage roll and saves the rebuilt damage.
pub struct ApplyForceful {
    messages: Arc<dyn ChatMessageRepo>,
}

impl ApplyForceful {
    pub fn new(messages: Arc<dyn ChatMessageRepo>) -> Self {
        Self { messages }
    }

    pub async fn execute(&self, message_id: MessageId, kind: TraitModifier) -> Result<ForcefulApplied, TraitOptionError> {
        let mut message = self
            .messages
            .get(message_id)
            .await?
            .ok_or(TraitOptionError::MessageNotFound(message_id))?;

        if !message.is_eligible(kind) {
            return Err(TraitOptionError::NotEligible {
                modifier: kind,
                message: message_id,
            });
        }

        let event = message.apply_forceful()?;
        self.messages.save(&message).await?;

        tracing::info!(
            message_id = %message_id,
            modifier = %event.modifier,
            previous_total = ?event.previous_total,
            new_total = ?event.new_total,
            critical = event.critical,
            "{} was added",
            event.modifier
        );

        Ok(event)
    }
}
