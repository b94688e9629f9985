//! Trait options engine - command line entry point.
//!
//! Works against a JSON message file so chat messages can be inspected and
//! modified without the host running.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trait_options_domain::{DegreeAdjustments, DifficultyClass, MessageId, TraitModifier};

use trait_options_engine::infrastructure::{
    config::EngineConfig,
    memory::InMemoryStore,
    notifications::LogNotifier,
    ports::{ChatMessageRepo, RandomPort, UserRole},
    random::{SeededRandom, SystemRandom},
};
use trait_options_engine::use_cases::trait_options::TraitOption;
use trait_options_engine::App;

/// Apply PF2e weapon trait modifiers to rolled chat messages
#[derive(Parser, Debug)]
#[command(name = "trait-options")]
#[command(about = "Offer and apply weapon trait modifiers on rolled checks")]
struct Args {
    /// Message file, overrides TRAIT_OPTIONS_MESSAGES
    #[arg(long)]
    messages: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stored messages with the trait buttons each would show
    List,
    /// Show the trait buttons for one message
    Offer { message_id: MessageId },
    /// Apply a trait modifier (backswing, sweep, forceful-second, forceful-third, nudge-fate)
    Apply { message_id: MessageId, modifier: TraitModifier },
    /// Resolve Nudge Fate on a failed check
    Nudge {
        message_id: MessageId,
        /// Run as a player instead of the GM
        #[arg(long)]
        player: bool,
    },
    /// Roll a fresh check and grade it
    Check {
        formula: String,
        dc: i32,
        /// Degree adjustments as JSON, e.g. '{"criticalFailure":{"label":"Sturdy","amount":1}}'
        #[arg(long)]
        adjustments: Option<String>,
        /// Random seed for reproducible rolls
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageSummary {
    id: MessageId,
    check_type: String,
    content: String,
    options: Vec<TraitOption>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary may run from `crates/engine`).
    load_dotenv_from_repo_root();

    let args = Args::parse();
    let mut config = EngineConfig::from_env();
    if let Some(path) = args.messages {
        config.messages_path = path;
    }

    // Initialize logging on stderr so stdout stays machine readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(
        messages = %config.messages_path.display(),
        disabled = ?config.disabled,
        "Loaded configuration"
    );

    let store = Arc::new(InMemoryStore::open(&config.messages_path).await?);
    let random: Arc<dyn RandomPort> = match &args.command {
        Command::Check { seed: Some(seed), .. } => Arc::new(SeededRandom::new(*seed)),
        _ => Arc::new(SystemRandom::new()),
    };
    let app = App::new(store, Arc::new(LogNotifier::new()), random, &config);
    let trait_options = &app.use_cases.trait_options;

    match args.command {
        Command::List => {
            let mut summaries = Vec::new();
            for message in app.repositories.messages.list().await? {
                summaries.push(MessageSummary {
                    id: message.id(),
                    check_type: message.check_type().to_string(),
                    content: message.content().to_string(),
                    options: trait_options.offer.execute(message.id()).await?,
                });
            }
            print_json(&summaries)?;
        }
        Command::Offer { message_id } => {
            print_json(&trait_options.offer.execute(message_id).await?)?;
        }
        Command::Apply { message_id, modifier } => {
            if !config.is_enabled(modifier) {
                anyhow::bail!("{} is disabled by TRAIT_OPTIONS_DISABLED", modifier);
            }
            print_json(&trait_options.apply(message_id, modifier).await?)?;
        }
        Command::Nudge { message_id, player } => {
            let role = if player { UserRole::Player } else { UserRole::Gm };
            print_json(&trait_options.nudge_fate.execute(message_id, role).await?)?;
        }
        Command::Check {
            formula,
            dc,
            adjustments,
            ..
        } => {
            let adjustments = adjustments
                .map(|raw| serde_json::from_str::<DegreeAdjustments>(&raw))
                .transpose()?;
            let check = app
                .use_cases
                .check
                .roll
                .execute(&formula, DifficultyClass::new(dc), adjustments.as_ref())?;
            print_json(&check)?;
        }
    }

    Ok(())
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
