use crate::config::AdvisorConfig;
use crate::error::{AdvisorError, Result};
use crate::llm::prompts::build_analysis_prompt;
use crate::llm::types::{send_event, AnalysisEvent, Content};
use crate::llm::{GenerationRequest, GenerativeBackend};
use crate::request::{AnalysisRequest, Language};
use crate::schema::AnalysisResult;
use crate::validator::validate;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc::Sender;

/// Turns raw financial text into a validated [`AnalysisResult`].
///
/// Stateless between calls. Every failure is returned to the caller; a report
/// is either fully valid or not produced at all.
pub struct FinancialAnalyzer {
    backend: Arc<dyn GenerativeBackend>,
    config: AdvisorConfig,
}

impl FinancialAnalyzer {
    pub fn new(backend: Arc<dyn GenerativeBackend>, config: AdvisorConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    pub async fn analyze(
        &self,
        raw_text: &str,
        industry: &str,
        language: Language,
    ) -> Result<AnalysisResult> {
        self.analyze_with_progress(raw_text, industry, language, None)
            .await
    }

    pub async fn analyze_request(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        self.analyze(&request.raw_text, &request.industry, request.language)
            .await
    }

    /// Same as [`analyze`](Self::analyze), reporting each stage on `progress`.
    pub async fn analyze_with_progress(
        &self,
        raw_text: &str,
        industry: &str,
        language: Language,
        progress: Option<Sender<AnalysisEvent>>,
    ) -> Result<AnalysisResult> {
        send_event(&progress, AnalysisEvent::Starting).await;

        let outcome = self.run(raw_text, industry, language, &progress).await;

        let event = match &outcome {
            Ok(result) => AnalysisEvent::Success {
                health_score: result.health_score,
            },
            Err(e) => AnalysisEvent::Failed {
                reason: e.to_string(),
            },
        };
        send_event(&progress, event).await;

        outcome
    }

    async fn run(
        &self,
        raw_text: &str,
        industry: &str,
        language: Language,
        progress: &Option<Sender<AnalysisEvent>>,
    ) -> Result<AnalysisResult> {
        // Must fail before anything reaches the backend.
        self.config.require_api_key()?;

        if raw_text.trim().is_empty() {
            return Err(AdvisorError::InvalidRequest(
                "financial text must not be empty".to_string(),
            ));
        }

        let prompt = build_analysis_prompt(raw_text, industry, language);
        let model = self.config.analysis_model.clone();
        let request = GenerationRequest::new(model.clone(), vec![Content::user(prompt)])
            .with_language(language)
            .with_json_schema(AnalysisResult::response_schema());

        send_event(progress, AnalysisEvent::Requesting { model: model.clone() }).await;
        info!(
            "Requesting {} analysis ({} chars, language {}) from {} model {}",
            industry,
            raw_text.len(),
            language,
            self.backend.name(),
            model
        );

        let raw = self.backend.generate(request).await.map_err(|e| {
            error!("Analysis request failed: {}", e);
            e
        })?;

        if raw.trim().is_empty() {
            return Err(AdvisorError::UpstreamEmpty(
                "backend returned blank analysis text".to_string(),
            ));
        }

        send_event(progress, AnalysisEvent::Validating).await;

        let result = validate(&raw).map_err(|e| {
            warn!("Analysis response rejected: {}", e);
            e
        })?;

        info!(
            "Analysis complete: health score {}, {} risk(s), {} recommendation(s)",
            result.health_score,
            result.risks.len(),
            result.recommendations.len()
        );

        Ok(result)
    }
}
