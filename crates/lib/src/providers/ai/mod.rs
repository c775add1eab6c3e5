pub mod openai;

use crate::errors::BotError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// Sampling parameters for a single generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationSettings {
    /// Low randomness and a generous ceiling for SQL output.
    pub const TRANSLATION: Self = Self {
        temperature: 0.3,
        max_tokens: 500,
    };

    /// Warmer sampling and a short ceiling for prose answers.
    pub const COMPOSITION: Self = Self {
        temperature: 0.7,
        max_tokens: 300,
    };
}

/// A trait for interacting with a text-generation service.
///
/// The bot calls it twice per turn at most: once to turn a question into SQL,
/// and once to turn query rows into a prose answer.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a completion from a system and a user prompt.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        settings: &GenerationSettings,
    ) -> Result<String, BotError>;
}

dyn_clone::clone_trait_object!(AiProvider);
