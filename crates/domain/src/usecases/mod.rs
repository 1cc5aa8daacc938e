//! Application use cases

pub mod deliver;
pub mod generate;

pub use deliver::{ClipboardDelivery, ClipboardPolicy, DeliveryEvent, DeliveryOutcome};
pub use generate::{GenerateConfig, GenerateOutcome, GenerateRequest, GenerateUseCase};
