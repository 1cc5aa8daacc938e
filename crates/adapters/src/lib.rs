//! opensesame adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `history`: JSON file and in-memory tag histories
//! - `clipboard`: Command-based and in-memory clipboards

mod clipboard_command;
mod clipboard_memory;
mod history_fs;
mod history_memory;

/// Re-exports for tag history adapters
pub mod history {
    pub use crate::history_fs::JsonFileTagHistory;
    pub use crate::history_memory::InMemoryTagHistory;
}

/// Re-exports for clipboard adapters
pub mod clipboard {
    pub use crate::clipboard_command::CommandClipboard;
    pub use crate::clipboard_memory::{ClipboardOp, MemoryClipboard};
}
