use crate::error::{AdvisorError, Result};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_ANALYSIS_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-3-flash-preview";

/// Process-level settings for the generative backend.
///
/// Built once at startup and shared read-only between the analyzer and the
/// assistant. A missing API key is not an error here; it surfaces through
/// [`AdvisorConfig::require_api_key`] before any backend call is attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub analysis_model: String,
    pub chat_model: String,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            analysis_model: DEFAULT_ANALYSIS_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
        }
    }
}

impl AdvisorConfig {
    /// Reads `GEMINI_API_KEY` (or `API_KEY`), `GEMINI_BASE_URL`,
    /// `GEMINI_ANALYSIS_MODEL` and `GEMINI_CHAT_MODEL`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_key = non_empty_var("GEMINI_API_KEY").or_else(|| non_empty_var("API_KEY"));

        Self {
            api_key,
            base_url: non_empty_var("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            analysis_model: non_empty_var("GEMINI_ANALYSIS_MODEL")
                .unwrap_or(defaults.analysis_model),
            chat_model: non_empty_var("GEMINI_CHAT_MODEL").unwrap_or(defaults.chat_model),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_analysis_model(mut self, model: impl Into<String>) -> Self {
        self.analysis_model = model.into();
        self
    }

    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(AdvisorError::Configuration(
                "GEMINI_API_KEY (or API_KEY) is not configured".to_string(),
            )),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
