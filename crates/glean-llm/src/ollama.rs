//! Ollama Provider Implementation
//!
//! Integration with Ollama's local chat API for both text and vision
//! models.
//!
//! # Features
//!
//! - Async HTTP communication with the `/api/chat` endpoint
//! - JSON-schema-constrained output via the `format` parameter
//! - Base64 image attachments for vision models
//! - Retry logic with exponential backoff
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use glean_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3", "llama3.2-vision");
//! ```

use crate::LlmError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use glean_domain::{CompletionRequest, LlmProvider};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default text model
pub const DEFAULT_TEXT_MODEL: &str = "llama3";

/// Default vision model
pub const DEFAULT_VISION_MODEL: &str = "llama3.2-vision";

/// Default timeout for LLM requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Ollama API provider for local LLM inference
///
/// Routes text requests to the text model and image requests to the
/// vision model on the same server.
pub struct OllamaProvider {
    endpoint: String,
    text_model: String,
    vision_model: String,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<Value>,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f64,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
    #[allow(dead_code)]
    done: bool,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `text_model`: Model for text requests (e.g., "llama3")
    /// - `vision_model`: Model for image requests (e.g., "llama3.2-vision")
    pub fn new(
        endpoint: impl Into<String>,
        text_model: impl Into<String>,
        vision_model: impl Into<String>,
    ) -> Result<Self, LlmError> {
        Self::with_timeout(
            endpoint,
            text_model,
            vision_model,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a provider with a custom request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        text_model: impl Into<String>,
        vision_model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            text_model: text_model.into(),
            vision_model: vision_model.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Create a provider against `http://localhost:11434` with default models
    pub fn local() -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, DEFAULT_TEXT_MODEL, DEFAULT_VISION_MODEL)
    }

    /// Set the maximum number of retry attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    fn model_for(&self, request: &CompletionRequest) -> &str {
        if request.needs_vision() {
            &self.vision_model
        } else {
            &self.text_model
        }
    }

    fn build_body(&self, request: &CompletionRequest) -> ChatRequest {
        let mut messages = vec![ChatMessage {
            role: "system",
            content: request.system.clone(),
            images: Vec::new(),
        }];

        messages.push(ChatMessage {
            role: "user",
            content: request.user.clone(),
            images: request.images.iter().map(|img| BASE64.encode(img)).collect(),
        });

        ChatRequest {
            model: self.model_for(request).to_string(),
            messages,
            stream: false,
            format: request.schema.clone(),
            // Deterministic output for extraction
            options: ChatOptions { temperature: 0.0 },
        }
    }

    async fn chat(&self, body: &ChatRequest) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.endpoint);

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.client.post(&url).json(body).send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        return match response.json::<ChatResponse>().await {
                            Ok(chat) => Ok(chat.message.content),
                            Err(e) => Err(LlmError::InvalidResponse(format!(
                                "Failed to parse response: {}",
                                e
                            ))),
                        };
                    } else if response.status() == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(body.model.clone()));
                    } else {
                        let status = response.status();
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!(
                    "Ollama request failed (attempt {}/{}), retrying in {:?}",
                    attempts, self.max_retries, delay
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

#[async_trait::async_trait]
impl LlmProvider for OllamaProvider {
    type Error = LlmError;

    async fn complete(&self, request: CompletionRequest) -> Result<String, Self::Error> {
        let body = self.build_body(&request);
        self.chat(&body).await
    }

    fn model_name(&self, request: &CompletionRequest) -> String {
        self.model_for(request).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_creation() {
        let provider = OllamaProvider::new("http://localhost:11434", "llama3", "llava").unwrap();
        assert_eq!(provider.endpoint, "http://localhost:11434");
        assert_eq!(provider.text_model, "llama3");
        assert_eq!(provider.vision_model, "llava");
        assert_eq!(provider.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let provider = OllamaProvider::new("http://localhost:11434/", "llama3", "llava").unwrap();
        assert_eq!(provider.endpoint, "http://localhost:11434");
    }

    #[test]
    fn test_local_defaults() {
        let provider = OllamaProvider::local().unwrap();
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(provider.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(provider.vision_model, DEFAULT_VISION_MODEL);
    }

    #[test]
    fn test_with_max_retries_floor() {
        let provider = OllamaProvider::local().unwrap().with_max_retries(0);
        assert_eq!(provider.max_retries, 1);
    }

    #[test]
    fn test_model_routing() {
        let provider = OllamaProvider::new("http://localhost:11434", "llama3", "llava").unwrap();

        let text = CompletionRequest::text("s", "u");
        assert_eq!(provider.model_name(&text), "llama3");

        let image = CompletionRequest::image("s", vec![0xFF, 0xD8]);
        assert_eq!(provider.model_name(&image), "llava");
    }

    #[test]
    fn test_build_body_text() {
        let provider = OllamaProvider::local().unwrap();
        let request = CompletionRequest::text("extract fields", "Alice is 30")
            .with_schema(json!({"type": "object"}));

        let body = provider.build_body(&request);
        assert_eq!(body.model, DEFAULT_TEXT_MODEL);
        assert!(!body.stream);
        assert_eq!(body.options.temperature, 0.0);
        assert_eq!(body.messages.len(), 2);
        assert_eq!(body.messages[0].role, "system");
        assert_eq!(body.messages[1].content, "Alice is 30");
        assert!(body.messages[1].images.is_empty());
        assert!(body.format.is_some());
    }

    #[test]
    fn test_build_body_encodes_images() {
        let provider = OllamaProvider::local().unwrap();
        let request = CompletionRequest::image("extract fields", vec![1, 2, 3]);

        let body = provider.build_body(&request);
        assert_eq!(body.model, DEFAULT_VISION_MODEL);
        assert_eq!(body.messages[1].images, vec![BASE64.encode([1, 2, 3])]);
    }

    #[test]
    fn test_body_serialization_omits_empty_images() {
        let provider = OllamaProvider::local().unwrap();
        let request = CompletionRequest::text("s", "u");
        let body = provider.build_body(&request);

        let json = serde_json::to_value(&body).unwrap();
        assert!(json["messages"][0].get("images").is_none());
        assert!(json.get("format").is_none());
    }

    #[tokio::test]
    async fn test_error_on_unreachable_endpoint() {
        let provider = OllamaProvider::new("http://127.0.0.1:1", "llama3", "llava")
            .unwrap()
            .with_max_retries(1);

        let result = provider.complete(CompletionRequest::text("s", "u")).await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }

    // Integration test (requires running Ollama)
    #[tokio::test]
    #[ignore] // Only run when Ollama is available
    async fn test_ollama_chat_integration() {
        let provider = OllamaProvider::local().unwrap();
        let result = provider
            .complete(CompletionRequest::text("Reply with 'hello'", "hi"))
            .await;

        if let Ok(response) = result {
            assert!(!response.is_empty());
        }
    }
}
