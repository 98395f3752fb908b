//! Recipe generation through an external text-generation model.
//!
//! The flow is a single linear transform: build a prompt from the user's
//! ingredients and preferences, make one model call, strip and parse the
//! JSON answer, normalize it into a [`GeneratedRecipe`]. Any failure along
//! the way is answered with a deterministic fallback recipe instead.

pub mod gemini;
pub mod generator;
pub mod normalize;
pub mod prompt;

use async_trait::async_trait;
use thiserror::Error;

pub use generator::{Generation, RecipeGenerator};
pub use normalize::{GeneratedRecipe, NormalizeError, fallback_recipe, parse_recipe};
pub use prompt::{GenerationRequest, SYSTEM_PROMPT, build_prompt};

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Rate limited by provider (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse provider response: {0}")]
    ParseError(String),
}

/// A text-completion backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Sends one prompt and returns the raw text of the first answer.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;

    fn provider_name(&self) -> &'static str;

    fn model_name(&self) -> &str;
}
