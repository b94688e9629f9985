//! Helper types for port operations.

use serde::{Deserialize, Serialize};
use trait_options_domain::{ActorId, DegreeAdjustmentRule};

/// What the engine needs to know about an actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRecord {
    pub id: ActorId,
    pub name: String,
    pub level: i32,
    /// Degree-of-success adjustment rule elements from the actor's items and effects
    #[serde(default)]
    pub adjustment_rules: Vec<DegreeAdjustmentRule>,
    /// Slugs of effects currently on the actor
    #[serde(default)]
    pub effects: Vec<String>,
}

impl ActorRecord {
    pub fn new(name: impl Into<String>, level: i32) -> Self {
        Self {
            id: ActorId::new(),
            name: name.into(),
            level,
            adjustment_rules: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: ActorId) -> Self {
        self.id = id;
        self
    }

    pub fn with_rules(mut self, rules: Vec<DegreeAdjustmentRule>) -> Self {
        self.adjustment_rules = rules;
        self
    }

    pub fn with_effect(mut self, slug: impl Into<String>) -> Self {
        self.effects.push(slug.into());
        self
    }

    pub fn has_effect(&self, slug: &str) -> bool {
        self.effects.iter().any(|e| e == slug)
    }
}

/// Role of the user triggering a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Gm,
    Player,
}

impl UserRole {
    pub fn is_gm(self) -> bool {
        matches!(self, UserRole::Gm)
    }
}
