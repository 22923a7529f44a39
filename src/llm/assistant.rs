use crate::config::AdvisorConfig;
use crate::error::{AdvisorError, Result};
use crate::llm::prompts::build_chat_system_prompt;
use crate::llm::types::Content;
use crate::llm::{GenerationRequest, GenerativeBackend};
use crate::schema::AnalysisResult;
use crate::session::{ConversationTurn, Session, TurnRole};
use log::{debug, warn};
use std::sync::Arc;

/// Multi-turn advisor grounded in a prior analysis.
///
/// Never fails: when the backend cannot answer, a fallback turn
/// (see [`ConversationTurn::is_fallback`]) is appended instead.
pub struct AdvisorAssistant {
    backend: Arc<dyn GenerativeBackend>,
    config: AdvisorConfig,
}

impl AdvisorAssistant {
    pub fn new(backend: Arc<dyn GenerativeBackend>, config: AdvisorConfig) -> Self {
        Self { backend, config }
    }

    /// Appends `message` to `session`, asks the backend for a reply and appends
    /// that too. Returns the appended assistant turn.
    ///
    /// # Arguments
    /// * `session` - The caller-owned conversation; one call at a time per session
    /// * `message` - The user's new message
    /// * `context` - The analysis to ground answers in, if one exists yet
    pub async fn converse(
        &self,
        session: &mut Session,
        message: &str,
        context: Option<&AnalysisResult>,
    ) -> ConversationTurn {
        session.push_user(message);

        let reply = self.reply(session, context).await;
        match reply {
            Ok(text) => session.push_assistant(text).clone(),
            Err(e) => {
                warn!(
                    "Advisor could not answer in session {}: {}",
                    session.id(),
                    e
                );
                session.push_fallback().clone()
            }
        }
    }

    async fn reply(&self, session: &Session, context: Option<&AnalysisResult>) -> Result<String> {
        self.config.require_api_key()?;

        let system_prompt = build_chat_system_prompt(context)?;
        let request = GenerationRequest::new(
            self.config.chat_model.clone(),
            history_contents(session.turns()),
        )
        .with_system_instruction(system_prompt);

        debug!(
            "Advisor request: session {}, {} turn(s), grounded: {}",
            session.id(),
            session.len(),
            context.is_some()
        );

        let text = self.backend.generate(request).await?;
        if text.trim().is_empty() {
            return Err(AdvisorError::UpstreamEmpty(
                "backend returned a blank reply".to_string(),
            ));
        }

        Ok(text)
    }
}

/// Maps turns onto backend contents, oldest first.
pub fn history_contents(turns: &[ConversationTurn]) -> Vec<Content> {
    turns
        .iter()
        .map(|turn| match turn.role {
            TurnRole::User => Content::user(turn.text.clone()),
            TurnRole::Assistant => Content::model(turn.text.clone()),
        })
        .collect()
}
