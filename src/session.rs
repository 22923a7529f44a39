use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reply appended when the backend could not produce an answer.
pub const FALLBACK_REPLY: &str = "I apologize, I could not generate a response.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TurnKind {
    #[default]
    Message,
    /// Degraded assistant reply standing in for a failed backend call.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    pub id: String,
    pub role: TurnRole,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub kind: TurnKind,
}

impl ConversationTurn {
    fn new(role: TurnRole, text: impl Into<String>, kind: TurnKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            created_at: Utc::now(),
            kind,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.kind == TurnKind::Fallback
    }
}

/// One advisory dialogue. Owned by the caller; turns can only be appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: Uuid,
    turns: Vec<ConversationTurn>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            turns: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> &ConversationTurn {
        self.push(ConversationTurn::new(TurnRole::User, text, TurnKind::Message))
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) -> &ConversationTurn {
        self.push(ConversationTurn::new(
            TurnRole::Assistant,
            text,
            TurnKind::Message,
        ))
    }

    pub fn push_fallback(&mut self) -> &ConversationTurn {
        self.push(ConversationTurn::new(
            TurnRole::Assistant,
            FALLBACK_REPLY,
            TurnKind::Fallback,
        ))
    }

    fn push(&mut self, turn: ConversationTurn) -> &ConversationTurn {
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }
}
