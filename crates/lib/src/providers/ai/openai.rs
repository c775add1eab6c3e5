use crate::{
    constants::DEFAULT_AI_TIMEOUT,
    errors::BotError,
    providers::ai::{AiProvider, GenerationSettings},
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;
use tracing::{debug, warn};

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// --- Provider implementation ---

/// A provider for any OpenAI-compatible chat completions API (Groq, OpenAI, local servers).
#[derive(Clone, Debug)]
pub struct OpenAiProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
    model: Option<String>,
    timeout: Duration,
}

impl OpenAiProvider {
    /// Creates a new `OpenAiProvider` with the default 30 second timeout.
    pub fn new(
        api_url: String,
        api_key: Option<String>,
        model: Option<String>,
    ) -> Result<Self, BotError> {
        Self::with_timeout(api_url, api_key, model, DEFAULT_AI_TIMEOUT)
    }

    /// Creates a new `OpenAiProvider` whose requests give up after `timeout`.
    pub fn with_timeout(
        api_url: String,
        api_key: Option<String>,
        model: Option<String>,
        timeout: Duration,
    ) -> Result<Self, BotError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(BotError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            api_key: api_key.filter(|k| !k.is_empty()),
            model,
            timeout,
        })
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        settings: &GenerationSettings,
    ) -> Result<String, BotError> {
        let request_body = ChatRequest {
            model: self.model.as_deref(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        };

        let mut request_builder = self.client.post(&self.api_url);
        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }

        debug!(url = %self.api_url, model = ?self.model, "--> Sending chat completion request");

        let response = request_builder
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BotError::AiTimeout(self.timeout)
                } else {
                    BotError::AiRequest(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "AI provider returned an error status");
            return Err(BotError::AiApi {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                BotError::AiTimeout(self.timeout)
            } else {
                BotError::AiDeserialization(e)
            }
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(BotError::EmptyCompletion)
    }
}
