//! Core data models for the TradingPal dispatcher

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//
// ================= Messages =================
//

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// A single transcript message. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

//
// ================= Session State =================
//

/// The shared conversation record threading through every step.
///
/// Append-only within a turn: insertion order is chronological order and
/// messages are never reordered, edited, or deleted. Steps receive an
/// immutable snapshot and return an extended copy; the dispatcher is the
/// sole writer of the canonical next state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    messages: Vec<Message>,
}

impl SessionState {
    /// Create a session with a single opening user message
    pub fn new(user_text: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(user_text)],
        }
    }

    /// Append a message. The only mutation the state supports.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

//
// ================= Experts =================
//

/// The fixed set of expert identifiers.
///
/// The derive order is the canonical enumeration order: the merge step
/// appends expert outputs in this order, never in arrival order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExpertKind {
    Premarket,
    Intraday,
    Postmarket,
    Strategy,
}

impl ExpertKind {
    pub const ALL: [ExpertKind; 4] = [
        ExpertKind::Premarket,
        ExpertKind::Intraday,
        ExpertKind::Postmarket,
        ExpertKind::Strategy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpertKind::Premarket => "premarket",
            ExpertKind::Intraday => "intraday",
            ExpertKind::Postmarket => "postmarket",
            ExpertKind::Strategy => "strategy",
        }
    }

    /// Parse a wire token from the classifier vocabulary.
    /// Unrecognized tokens yield `None` and are dropped by normalization.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "premarket" => Some(ExpertKind::Premarket),
            "intraday" => Some(ExpertKind::Intraday),
            "postmarket" => Some(ExpertKind::Postmarket),
            "strategy" => Some(ExpertKind::Strategy),
            _ => None,
        }
    }
}

impl fmt::Display for ExpertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//
// ================= Routing =================
//

/// Normalized classifier output, consumed immediately by the dispatcher.
///
/// The two variants are mutually exclusive: a clarification request never
/// carries expert selections, and a dispatch set is non-empty, deduplicated,
/// and drawn only from the fixed valid vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    Dispatch(Vec<ExpertKind>),
    Clarify { question: String },
}

//
// ================= Suspension =================
//

/// Saved suspension state for one paused thread.
///
/// Created when the clarification step begins, consumed exactly once when
/// the caller supplies resumption input. A first-class serializable value,
/// not a frozen call stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub state: SessionState,
    pub question: String,
    pub created_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(state: SessionState, question: String) -> Self {
        Self {
            state,
            question,
            created_at: Utc::now(),
        }
    }
}

//
// ================= Outcome =================
//

/// Result of driving a thread through `start` or `resume`.
#[derive(Debug, Clone)]
pub enum Outcome {
    Completed(SessionState),
    Suspended { thread_id: String, question: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_is_append_only() {
        let mut state = SessionState::new("What's the market doing?");
        assert_eq!(state.message_count(), 1);
        assert_eq!(state.messages()[0].role, MessageRole::User);

        state.push(Message::assistant("Markets are up."));
        assert_eq!(state.message_count(), 2);
        assert_eq!(
            state.last_message().unwrap().content,
            "Markets are up."
        );
        // Earlier messages untouched
        assert_eq!(state.messages()[0].content, "What's the market doing?");
    }

    #[test]
    fn test_expert_token_parsing() {
        assert_eq!(
            ExpertKind::from_token("premarket"),
            Some(ExpertKind::Premarket)
        );
        assert_eq!(
            ExpertKind::from_token("  STRATEGY "),
            Some(ExpertKind::Strategy)
        );
        assert_eq!(ExpertKind::from_token("astrology"), None);
        assert_eq!(ExpertKind::from_token(""), None);
    }

    #[test]
    fn test_enumeration_order_matches_derive_order() {
        let mut sorted = vec![
            ExpertKind::Strategy,
            ExpertKind::Premarket,
            ExpertKind::Postmarket,
            ExpertKind::Intraday,
        ];
        sorted.sort();
        assert_eq!(sorted, ExpertKind::ALL.to_vec());
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
