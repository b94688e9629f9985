//! Engine configuration from the environment.
//!
//! Supported environment variables:
//! - `TRAIT_OPTIONS_MESSAGES`: path of the JSON message file (default `messages.json`)
//! - `TRAIT_OPTIONS_DISABLED`: comma-separated trait modifier slugs that are never offered
//! - `TRAIT_OPTIONS_LOG`: tracing filter directive (default `trait_options_engine=info`)
//!
//! Invalid values are logged and replaced by their defaults.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;
use trait_options_domain::TraitModifier;

pub const DEFAULT_MESSAGES_PATH: &str = "messages.json";
pub const DEFAULT_LOG_FILTER: &str = "trait_options_engine=info";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub messages_path: PathBuf,
    /// Modifier kinds that are never offered or nudged
    pub disabled: BTreeSet<TraitModifier>,
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            messages_path: PathBuf::from(DEFAULT_MESSAGES_PATH),
            disabled: BTreeSet::new(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl EngineConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration from a `.env` style file only.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let vars = dotenvy::from_path_iter(path.as_ref())?.collect::<Result<HashMap<String, String>, _>>()?;
        Ok(Self::from_lookup(|key| vars.get(key).cloned()))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("TRAIT_OPTIONS_MESSAGES") {
            let path = path.trim();
            if path.is_empty() {
                tracing::warn!("TRAIT_OPTIONS_MESSAGES is empty, using {}", DEFAULT_MESSAGES_PATH);
            } else {
                config.messages_path = PathBuf::from(path);
            }
        }

        if let Some(list) = lookup("TRAIT_OPTIONS_DISABLED") {
            config.disabled = parse_disabled(&list);
        }

        if let Some(filter) = lookup("TRAIT_OPTIONS_LOG") {
            match EnvFilter::try_new(&filter) {
                Ok(_) => config.log_filter = filter,
                Err(e) => tracing::warn!(
                    filter = %filter,
                    error = %e,
                    "TRAIT_OPTIONS_LOG is not a valid filter, ignoring"
                ),
            }
        }

        config
    }

    pub fn is_enabled(&self, modifier: TraitModifier) -> bool {
        !self.disabled.contains(&modifier)
    }
}

fn parse_disabled(list: &str) -> BTreeSet<TraitModifier> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|slug| match slug.parse::<TraitModifier>() {
            Ok(modifier) => Some(modifier),
            Err(e) => {
                tracing::warn!(slug, error = %e, "Unknown slug in TRAIT_OPTIONS_DISABLED, ignoring");
                None
            }
        })
        .collect()
}
