//! Completion provider for OpenAI-compatible chat endpoints.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LlmCredentials;

/// Completion errors.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("network error: {0}")]
    Network(String),

    #[error("provider returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("unexpected provider response: {0}")]
    Decode(String),

    #[error("request was blocked by the provider's content filter")]
    ContentFiltered,

    #[error("provider returned an empty reply")]
    Empty,
}

/// One prompt in, one reply out. Implementations do not retry.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;

    /// Transcribe or describe an image so it can be used as source text.
    async fn describe_image(
        &self,
        file_name: &str,
        mime: &str,
        bytes: &[u8],
    ) -> Result<String, CompletionError>;
}

/// Builds a provider for one request's credentials.
pub trait ProviderFactory: Send + Sync {
    fn provider(&self, credentials: &LlmCredentials) -> Arc<dyn CompletionProvider>;
}

const VISION_INSTRUCTION: &str = "Extract all text in this image verbatim, keeping its reading order. \
If the image has little or no text, describe its content in detail instead. \
Reply with the extracted content only.";

// === API Request/Response Types ===

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
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
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Provider speaking the `/chat/completions` protocol.
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    vision_model: String,
}

impl OpenAiProvider {
    pub fn new(client: Client, credentials: &LlmCredentials) -> Self {
        Self {
            client,
            base_url: credentials.base_url.trim_end_matches('/').to_string(),
            api_key: credentials.api_key.clone(),
            model: credentials.model.clone(),
            vision_model: credentials.vision_model.clone(),
        }
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(model = request.model, %url, "calling completion endpoint");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(CompletionError::Backend { status, message });
        }

        let response: ChatResponse = resp
            .json()
            .await
            .map_err(|e| CompletionError::Decode(e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::Decode("no choices in response".to_string()))?;

        tracing::debug!(finish_reason = ?choice.finish_reason, "completion finished");
        if choice.finish_reason.as_deref() == Some("content_filter") {
            return Err(CompletionError::ContentFiltered);
        }

        let content = choice.message.content.unwrap_or_default();
        if content.trim().is_empty() {
            return Err(CompletionError::Empty);
        }
        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Text(prompt),
            }],
        };
        self.send(&request).await
    }

    async fn describe_image(
        &self,
        file_name: &str,
        mime: &str,
        bytes: &[u8],
    ) -> Result<String, CompletionError> {
        tracing::debug!(file_name, mime, size = bytes.len(), "sending image to vision model");
        let data_url = format!("data:{};base64,{}", mime, BASE64.encode(bytes));
        let request = ChatRequest {
            model: &self.vision_model,
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: VISION_INSTRUCTION,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ]),
            }],
        };
        self.send(&request).await
    }
}

/// Factory sharing one HTTP client across requests.
#[derive(Clone)]
pub struct OpenAiProviderFactory {
    client: Client,
}

impl OpenAiProviderFactory {
    pub fn new(timeout: Duration) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CompletionError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

impl ProviderFactory for OpenAiProviderFactory {
    fn provider(&self, credentials: &LlmCredentials) -> Arc<dyn CompletionProvider> {
        Arc::new(OpenAiProvider::new(self.client.clone(), credentials))
    }
}
