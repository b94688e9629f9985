//! Offer trait options use case.
//!
//! Decides which "Apply X" buttons a chat message should show.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use trait_options_domain::{MessageId, TraitModifier};

use crate::infrastructure::ports::ChatMessageRepo;

use super::error::TraitOptionError;

/// A button to render under a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitOption {
    pub modifier: TraitModifier,
    pub label: String,
    pub tooltip: String,
}

impl TraitOption {
    pub fn new(modifier: TraitModifier) -> Self {
        let slug = modifier.slug();
        let trait_name = slug.split('-').next().unwrap_or(slug);
        Self {
            modifier,
            label: format!("Apply {}", capitalize(trait_name)),
            tooltip: format!("PF2E.TraitDescription{}", capitalize(trait_name)),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub struct OfferTraitOptions {
    messages: Arc<dyn ChatMessageRepo>,
    disabled: BTreeSet<TraitModifier>,
}

impl OfferTraitOptions {
    pub fn new(messages: Arc<dyn ChatMessageRepo>, disabled: BTreeSet<TraitModifier>) -> Self {
        Self { messages, disabled }
    }

    pub async fn execute(&self, message_id: MessageId) -> Result<Vec<TraitOption>, TraitOptionError> {
        let message = self
            .messages
            .get(message_id)
            .await?
            .ok_or(TraitOptionError::MessageNotFound(message_id))?;

        let options: Vec<TraitOption> = message
            .offered_modifiers()
            .into_iter()
            .filter(|kind| !self.disabled.contains(kind))
            .map(TraitOption::new)
            .collect();

        tracing::debug!(
            message_id = %message_id,
            offered = options.len(),
            "Computed trait options"
        );
        Ok(options)
    }
}
