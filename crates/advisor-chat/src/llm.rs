//! Port to the external text generation service, plus an OpenAI-compatible
//! chat completions client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use advisor_core::config::LlmConfig;

use crate::error::GenerationError;
use crate::types::ImageInput;

/// Longest slice of an error body kept in diagnostics.
const BODY_EXCERPT_CHARS: usize = 300;

/// A service that turns instructions plus a user payload into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `user` under the `system` instructions.
    async fn generate(&self, system: &str, user: &str) -> Result<String, GenerationError>;

    /// Generate a completion that also sees `image`.
    ///
    /// Generators without vision support keep the default, which fails.
    async fn generate_with_image(
        &self,
        system: &str,
        user: &str,
        image: &ImageInput,
    ) -> Result<String, GenerationError> {
        let _ = (system, user, image);
        Err(GenerationError::Request(format!(
            "{} does not support image input",
            self.name()
        )))
    }

    /// Short name used in logs.
    fn name(&self) -> &str;
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

// =============================================================================
// OpenAiGenerator
// =============================================================================

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiGenerator {
    /// Build a client from configuration, reading the API key from the
    /// environment variable named by `api_key_env`.
    ///
    /// A missing key is not an error here; every request then fails with
    /// [`GenerationError::Configuration`] without touching the network.
    pub fn from_config(config: &LlmConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            tracing::warn!(
                env = %config.api_key_env,
                "No API key found; generation requests will fail until it is set"
            );
        }
        Self::with_api_key(config, api_key)
    }

    /// Build a client with an explicit key.
    pub fn with_api_key(config: &LlmConfig, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_key_env: config.api_key_env.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn complete(&self, messages: Vec<ChatMessage<'_>>) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            GenerationError::Configuration(format!("{} is not set", self.api_key_env))
        })?;

        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Request(format!("request to {} failed: {}", self.base_url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Request(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), model = %self.model, "Generation request rejected");
            return Err(map_status(status.as_u16(), &body));
        }

        parse_completion(&body)
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, system: &str, user: &str) -> Result<String, GenerationError> {
        self.complete(vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(system),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Text(user),
            },
        ])
        .await
    }

    async fn generate_with_image(
        &self,
        system: &str,
        user: &str,
        image: &ImageInput,
    ) -> Result<String, GenerationError> {
        self.complete(vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(system),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text { text: user },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.to_data_url(),
                        },
                    },
                ]),
            },
        ])
        .await
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Map a non-success HTTP status to a generation error.
fn map_status(status: u16, body: &str) -> GenerationError {
    let excerpt: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
    match status {
        401 | 403 => GenerationError::Configuration(format!(
            "credentials rejected (status {})",
            status
        )),
        429 => GenerationError::RateLimited(format!("status {}: {}", status, excerpt)),
        _ => GenerationError::Request(format!("status {}: {}", status, excerpt)),
    }
}

fn parse_completion(body: &str) -> Result<String, GenerationError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::Request(format!("malformed completion response: {}", e)))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| GenerationError::Request("completion response has no content".to_string()))
}
