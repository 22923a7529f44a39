use crate::config::{AdvisorConfig, DEFAULT_BASE_URL};
use crate::error::{AdvisorError, Result};
use crate::llm::types::*;
use crate::llm::{GenerationRequest, GenerativeBackend};
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;

/// [`GenerativeBackend`] over the Gemini `generateContent` REST endpoint.
///
/// No request timeout is configured; callers that need a deadline wrap the
/// service call themselves.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn from_config(config: &AdvisorConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        Ok(Self::new(api_key).with_base_url(config.base_url.clone()))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }

    fn build_payload(request: GenerationRequest) -> GenerateContentRequest {
        let generation_config =
            if request.response_mime_type.is_some() || request.response_schema.is_some() {
                Some(GenerationConfig {
                    response_mime_type: request.response_mime_type,
                    response_schema: request.response_schema,
                })
            } else {
                None
            };

        GenerateContentRequest {
            contents: request.contents,
            system_instruction: request.system_instruction.map(Content::user),
            generation_config,
        }
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let url = self.endpoint(&request.model);
        debug!(
            "Gemini request: model {}, {} content item(s), language {:?}",
            request.model,
            request.contents.len(),
            request.language
        );
        let payload = Self::build_payload(request);

        let res = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await.unwrap_or_default();
            error!("Gemini API error (status {}): {}", status, err_text);
            return Err(AdvisorError::Upstream(format!(
                "Gemini API Error (status {}): {}",
                status, err_text
            )));
        }

        let body: GenerateContentResponse = res.json().await?;

        if let Some(usage) = &body.usage_metadata {
            debug!(
                "Gemini usage: {:?} prompt tokens, {:?} candidate tokens",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        body.first_text()
            .ok_or_else(|| AdvisorError::UpstreamEmpty(body.empty_reason()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AnalysisResult;

    #[test]
    fn test_endpoint_formatting() {
        let client = GeminiClient::new("key".to_string()).with_base_url("http://localhost:9000/");
        assert_eq!(
            client.endpoint("gemini-3-flash-preview"),
            "http://localhost:9000/models/gemini-3-flash-preview:generateContent"
        );
    }

    #[test]
    fn test_from_config_requires_key() {
        let result = GeminiClient::from_config(&AdvisorConfig::default());
        assert!(matches!(result, Err(AdvisorError::Configuration(_))));
    }

    #[test]
    fn test_payload_carries_schema_and_system_instruction() {
        let request = GenerationRequest::new("m", vec![Content::user("analyze")])
            .with_system_instruction("be precise")
            .with_json_schema(AnalysisResult::response_schema());
        let payload = serde_json::to_value(GeminiClient::build_payload(request)).unwrap();

        assert_eq!(payload["systemInstruction"]["parts"][0]["text"], "be precise");
        assert_eq!(
            payload["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(payload["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_chat_payload_has_no_generation_config() {
        let request = GenerationRequest::new(
            "m",
            vec![Content::user("hi"), Content::model("hello"), Content::user("margin?")],
        );
        let payload = serde_json::to_value(GeminiClient::build_payload(request)).unwrap();

        assert!(payload.get("generationConfig").is_none());
        assert_eq!(payload["contents"][1]["role"], "model");
        assert_eq!(payload["contents"].as_array().unwrap().len(), 3);
    }
}
