//! User-facing notification port.

use async_trait::async_trait;

use super::error::NotificationError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationPort: Send + Sync {
    /// Show an informational toast to the users at the table.
    async fn info(&self, message: &str) -> Result<(), NotificationError>;
}
