//! Trait definitions for external interactions
//!
//! These traits define the boundary between the extraction pipeline and
//! infrastructure. Implementations live in other crates (glean-llm).

use serde_json::Value;

/// A single completion request to the model backend
///
/// When `images` is non-empty the provider routes the request to its
/// vision model.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System instruction describing the extraction task
    pub system: String,

    /// User content: the text to analyze (empty for pure image requests)
    pub user: String,

    /// Raw image bytes to attach, if any
    pub images: Vec<Vec<u8>>,

    /// JSON Schema the response must conform to, if supported
    pub schema: Option<Value>,
}

impl CompletionRequest {
    /// A text-only request
    pub fn text(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            images: Vec::new(),
            schema: None,
        }
    }

    /// A request carrying one image
    pub fn image(system: impl Into<String>, image: Vec<u8>) -> Self {
        Self {
            system: system.into(),
            user: String::new(),
            images: vec![image],
            schema: None,
        }
    }

    /// Attach a response schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Whether this request needs a vision-capable model
    pub fn needs_vision(&self) -> bool {
        !self.images.is_empty()
    }
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (glean-llm)
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Error type for LLM operations
    type Error;

    /// Run a completion request and return the raw model output
    async fn complete(&self, request: CompletionRequest) -> Result<String, Self::Error>;

    /// Name of the model that would serve this request, for metadata
    fn model_name(&self, request: &CompletionRequest) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_request() {
        let req = CompletionRequest::text("extract things", "Alice is 30");
        assert!(!req.needs_vision());
        assert!(req.schema.is_none());
    }

    #[test]
    fn test_image_request_needs_vision() {
        let req = CompletionRequest::image("extract things", vec![0xFF, 0xD8]);
        assert!(req.needs_vision());
        assert!(req.user.is_empty());
    }

    #[test]
    fn test_with_schema() {
        let req = CompletionRequest::text("s", "u").with_schema(json!({"type": "object"}));
        assert_eq!(req.schema.unwrap()["type"], "object");
    }
}
