//! In-memory clipboard for tests

use async_trait::async_trait;
use opensesame_domain::{Clipboard, ClipboardError, Password};
use std::sync::Mutex;

/// One operation performed on a [`MemoryClipboard`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardOp {
    Copy(String),
    Clear,
}

/// Clipboard that keeps its contents and every operation in memory
#[derive(Default)]
pub struct MemoryClipboard {
    operations: Mutex<Vec<ClipboardOp>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents, `None` if never written or cleared
    pub fn contents(&self) -> Option<String> {
        match self.operations().last() {
            Some(ClipboardOp::Copy(value)) => Some(value.clone()),
            Some(ClipboardOp::Clear) | None => None,
        }
    }

    /// Every copy and clear, oldest first
    pub fn operations(&self) -> Vec<ClipboardOp> {
        self.operations
            .lock()
            .map(|ops| ops.clone())
            .unwrap_or_default()
    }

    fn push(&self, op: ClipboardOp) -> Result<(), ClipboardError> {
        self.operations
            .lock()
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))?
            .push(op);
        Ok(())
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn copy(&self, password: &Password) -> Result<(), ClipboardError> {
        self.push(ClipboardOp::Copy(password.to_string()))
    }

    async fn clear(&self) -> Result<(), ClipboardError> {
        self.push(ClipboardOp::Clear)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
