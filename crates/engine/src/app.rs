//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    config::EngineConfig,
    memory::InMemoryStore,
    ports::{ActorRepo, ChatMessageRepo, NotificationPort, RandomPort},
};
use crate::use_cases::{
    check::RollCheck,
    trait_options::{ApplyForceful, ApplyTraitModifier, NudgeFate, OfferTraitOptions},
    CheckUseCases, TraitOptionUseCases,
};

/// Main application state.
///
/// Holds the repository ports and every use case wired against them.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
}

/// Container for repository ports.
pub struct Repositories {
    pub messages: Arc<dyn ChatMessageRepo>,
    pub actors: Arc<dyn ActorRepo>,
}

/// Container for all use cases.
pub struct UseCases {
    pub trait_options: TraitOptionUseCases,
    pub check: CheckUseCases,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        store: Arc<InMemoryStore>,
        notifier: Arc<dyn NotificationPort>,
        random: Arc<dyn RandomPort>,
        config: &EngineConfig,
    ) -> Self {
        let messages: Arc<dyn ChatMessageRepo> = store.clone();
        let actors: Arc<dyn ActorRepo> = store;

        let apply_modifier = Arc::new(ApplyTraitModifier::new(messages.clone(), actors.clone()));
        let trait_options = TraitOptionUseCases::new(
            Arc::new(OfferTraitOptions::new(messages.clone(), config.disabled.clone())),
            apply_modifier.clone(),
            Arc::new(ApplyForceful::new(messages.clone())),
            Arc::new(NudgeFate::new(
                messages.clone(),
                actors.clone(),
                notifier,
                apply_modifier,
                config.disabled.clone(),
            )),
        );
        let check = CheckUseCases::new(Arc::new(RollCheck::new(random)));

        Self {
            repositories: Repositories { messages, actors },
            use_cases: UseCases { trait_options, check },
        }
    }
}
