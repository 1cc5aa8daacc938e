//! Error types for input validation and the derivation engine

use thiserror::Error;

/// A violated precondition, reported before any hashing happens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Tag is required")]
    EmptyTag,
    #[error("Passphrase is required")]
    EmptyPassphrase,
    #[error("At least one character class must be selected")]
    NoClassSelected,
}

/// Failure of the digest primitive self-test
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("SHA-1 self-test failed: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },
}
