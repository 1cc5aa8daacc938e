//! Port definitions (traits) for external collaborators
//!
//! The engine itself needs none of these. They cover the thin platform glue
//! around it: remembering tags for completion and handing passwords to a
//! clipboard. Adapters implement these traits.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{Password, TagRecord};

/// Error type for tag history operations
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Port for the set of previously used tags
#[async_trait]
pub trait TagHistory: Send + Sync {
    /// All remembered tags, sorted by tag
    async fn list(&self) -> Result<Vec<TagRecord>, HistoryError>;

    /// Remember a tag. Returns true if it was not already known.
    async fn record(&self, tag: &str) -> Result<bool, HistoryError>;

    /// Forget every tag
    async fn clear(&self) -> Result<(), HistoryError>;
}

/// Error type for clipboard operations
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("Clipboard command failed: {0}")]
    Command(String),
    #[error("Clipboard command timed out")]
    Timeout,
}

/// Port for handing a password to the user's clipboard
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Replace the clipboard contents with the password
    async fn copy(&self, password: &Password) -> Result<(), ClipboardError>;

    /// Replace the clipboard contents with nothing
    async fn clear(&self) -> Result<(), ClipboardError>;

    /// Short name for logs (e.g., "wl-copy", "memory")
    fn name(&self) -> &str;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[async_trait]
impl<T: TagHistory + ?Sized> TagHistory for &T {
    async fn list(&self) -> Result<Vec<TagRecord>, HistoryError> {
        (**self).list().await
    }

    async fn record(&self, tag: &str) -> Result<bool, HistoryError> {
        (**self).record(tag).await
    }

    async fn clear(&self) -> Result<(), HistoryError> {
        (**self).clear().await
    }
}

#[async_trait]
impl<T: Clipboard + ?Sized> Clipboard for &T {
    async fn copy(&self, password: &Password) -> Result<(), ClipboardError> {
        (**self).copy(password).await
    }

    async fn clear(&self) -> Result<(), ClipboardError> {
        (**self).clear().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
