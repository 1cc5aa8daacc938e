//! opensesame domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `engine`: The deterministic password derivation
//! - `model`: Value types (policy flags, seed, password, tag records)
//! - `error`: Input validation and engine errors
//! - `ports`: Trait definitions for external collaborators (adapters)
//! - `usecases`: Generation and clipboard delivery flows

pub mod engine;
pub mod error;
pub mod model;
pub mod ports;
pub mod usecases;

pub use engine::{Engine, PASSWORD_LENGTH, TextEncoding, generate};
pub use error::*;
pub use model::*;
pub use ports::*;
