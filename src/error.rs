use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Generative backend returned no content: {0}")]
    UpstreamEmpty(String),

    #[error("Generative backend error: {0}")]
    Upstream(String),

    #[error("Schema violation at '{field}': {details}")]
    SchemaViolation { field: String, details: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdvisorError {
    pub fn schema_violation(field: impl Into<String>, details: impl Into<String>) -> Self {
        Self::SchemaViolation {
            field: field.into(),
            details: details.into(),
        }
    }

    /// True for transport/backend failures, the only class a caller might retry.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream(_) | Self::UpstreamEmpty(_))
    }
}

#[cfg(feature = "gemini")]
impl From<reqwest::Error> for AdvisorError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AdvisorError>;
