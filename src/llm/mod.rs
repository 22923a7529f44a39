pub mod analyzer;
pub mod assistant;
#[cfg(feature = "gemini")]
pub mod client;
pub mod prompts;
pub mod types;

pub use analyzer::*;
pub use assistant::*;
#[cfg(feature = "gemini")]
pub use client::*;
pub use types::*;

use crate::error::Result;
use crate::request::Language;
use async_trait::async_trait;

pub const JSON_MIME_TYPE: &str = "application/json";

/// One call to the generative backend.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub system_instruction: Option<String>,
    /// Conversation so far, oldest first. The last entry is the new prompt.
    pub contents: Vec<Content>,
    pub language: Option<Language>,
    pub response_mime_type: Option<String>,
    pub response_schema: Option<serde_json::Value>,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, contents: Vec<Content>) -> Self {
        Self {
            model: model.into(),
            system_instruction: None,
            contents,
            language: None,
            response_mime_type: None,
            response_schema: None,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Constrains the reply to JSON matching `schema`.
    pub fn with_json_schema(mut self, schema: serde_json::Value) -> Self {
        self.response_mime_type = Some(JSON_MIME_TYPE.to_string());
        self.response_schema = Some(schema);
        self
    }
}

/// The external text-generation service.
///
/// Implementations return the reply text, `AdvisorError::UpstreamEmpty` when
/// the service answered without content, and `AdvisorError::Upstream` for any
/// transport or service-side failure. They must not retry.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Human-readable name of this backend (for logs).
    fn name(&self) -> &str;

    async fn generate(&self, request: GenerationRequest) -> Result<String>;
}
