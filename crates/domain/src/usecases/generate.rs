//! Password generation use case

use secrecy::SecretString;

use crate::{
    engine::Engine,
    error::InputError,
    model::{DerivationInput, Password, PolicyFlags},
    ports::TagHistory,
};

/// Configuration for the generate use case
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Record each tag in the history port
    pub remember_tags: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            remember_tags: true,
        }
    }
}

/// Raw, unvalidated request from the caller
pub struct GenerateRequest {
    pub tag: String,
    pub passphrase: SecretString,
    pub flags: PolicyFlags,
}

/// Result of a successful generation
#[derive(Debug)]
pub struct GenerateOutcome {
    pub password: Password,
    /// Whether the tag was added to history by this call
    pub tag_was_new: bool,
}

/// Use case wiring validation, tag history and the engine together
pub struct GenerateUseCase<H> {
    history: H,
    engine: Engine,
    config: GenerateConfig,
}

impl<H: TagHistory> GenerateUseCase<H> {
    pub fn new(history: H, engine: Engine, config: GenerateConfig) -> Self {
        Self {
            history,
            engine,
            config,
        }
    }

    /// Validate the request, remember the tag and derive the password.
    ///
    /// Invalid input is rejected before history or hashing is touched.
    /// A failing history store is logged and does not block derivation.
    pub async fn execute(&self, request: GenerateRequest) -> Result<GenerateOutcome, InputError> {
        let input = DerivationInput::new(request.tag, request.passphrase, request.flags)?;

        let tag_was_new = if self.config.remember_tags {
            match self.history.record(input.tag()).await {
                Ok(added) => added,
                Err(error) => {
                    tracing::warn!(error = %error, "Failed to record tag in history");
                    false
                }
            }
        } else {
            false
        };

        tracing::info!(policy = %input.flags(), tag_was_new, "Generating password");

        let password = self.engine.generate(&input);

        Ok(GenerateOutcome {
            password,
            tag_was_new,
        })
    }
}
