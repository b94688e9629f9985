//! Notification adapter that writes to the log.

use async_trait::async_trait;

use crate::infrastructure::ports::{NotificationError, NotificationPort};

/// Stands in for the host's toast notifications when running headless.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationPort for LogNotifier {
    async fn info(&self, message: &str) -> Result<(), NotificationError> {
        if message.trim().is_empty() {
            return Err(NotificationError::Failed("Empty notification".to_string()));
        }
        tracing::info!(target: "trait_options_engine::notify", "{}", message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn logs_messages() {
        assert!(LogNotifier::new().info("Nudge Fate effect was activated").await.is_ok());
    }

    #[tokio::test]
    async fn rejects_blank_messages() {
        assert!(LogNotifier::new().info("   ").await.is_err());
    }
}
