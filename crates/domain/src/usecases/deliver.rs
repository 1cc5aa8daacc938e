//! Clipboard delivery with timed auto-clear

use std::time::Duration;

use crate::{
    model::Password,
    ports::{Clipboard, ClipboardError},
};

/// When to warn about and perform the clipboard clear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipboardPolicy {
    /// Delay between copy and clear. Zero keeps the password on the clipboard.
    pub clear_after: Duration,
    /// How long before the clear to emit a warning. Zero disables the warning.
    pub warn_before: Duration,
}

impl Default for ClipboardPolicy {
    fn default() -> Self {
        Self {
            clear_after: Duration::from_secs(120),
            warn_before: Duration::from_secs(30),
        }
    }
}

/// Progress notifications emitted during delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryEvent {
    Copied,
    ClearingSoon { remaining: Duration },
    Cleared,
}

/// How a delivery ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The password was left on the clipboard
    Kept,
    /// The clipboard was cleared after the configured delay
    Cleared,
}

/// Use case that copies a password and clears it again later
pub struct ClipboardDelivery<C> {
    clipboard: C,
    policy: ClipboardPolicy,
}

impl<C: Clipboard> ClipboardDelivery<C> {
    pub fn new(clipboard: C, policy: ClipboardPolicy) -> Self {
        Self { clipboard, policy }
    }

    pub async fn deliver<F>(
        &self,
        password: &Password,
        mut notify: F,
    ) -> Result<DeliveryOutcome, ClipboardError>
    where
        F: FnMut(DeliveryEvent) + Send,
    {
        self.clipboard.copy(password).await?;
        tracing::info!(clipboard = self.clipboard.name(), "Copied password to clipboard");
        notify(DeliveryEvent::Copied);

        if self.policy.clear_after.is_zero() {
            return Ok(DeliveryOutcome::Kept);
        }

        let warn_before = self.policy.warn_before;
        if !warn_before.is_zero() && warn_before < self.policy.clear_after {
            tokio::time::sleep(self.policy.clear_after - warn_before).await;
            tracing::warn!(
                seconds = warn_before.as_secs(),
                "Clearing clipboard in {} seconds",
                warn_before.as_secs()
            );
            notify(DeliveryEvent::ClearingSoon {
                remaining: warn_before,
            });
            tokio::time::sleep(warn_before).await;
        } else {
            tokio::time::sleep(self.policy.clear_after).await;
        }

        self.clipboard.clear().await?;
        tracing::info!(clipboard = self.clipboard.name(), "Cleared password");
        notify(DeliveryEvent::Cleared);

        Ok(DeliveryOutcome::Cleared)
    }
}
