//! Intent classifier adapter
//!
//! Wraps the text-generation capability to turn the conversation into a
//! routing decision. The LLM reply is untrusted free text: anything outside
//! the expected token grammar is coerced into a clarification request and
//! never propagated as a crash.

use crate::generator::{strip_code_fences, TextGenerator};
use crate::models::{ExpertKind, RoutingDecision, SessionState};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shown when the classifier cannot produce a usable routing decision
pub const DEFAULT_CLARIFICATION_PROMPT: &str =
    "Could you please clarify your request? I can assist with premarket, \
     intraday, postmarket, and strategy inquiries.";

/// Wire token that requests human clarification instead of an expert set
const CLARIFICATION_MARKER: &str = "human_clarification";

const ROUTING_INSTRUCTIONS: &str = r#"You are a routing assistant for a stock market chatbot. Analyze the user's message and route it to one or more appropriate expert agents. Choose from the following five options:

- premarket: for questions about recent news or market trends.
- intraday: for questions about active or ongoing trades.
- postmarket: for reviewing trades or performance after the trading day.
- strategy: for proposed or hypothetical trading strategies.
- human_clarification: for questions that are not finance-related or require additional clarification.

Instructions:

- Respond with one or more space-separated agent names, for example: "premarket strategy".
- Do not repeat names.
- If you include human_clarification, it must be the only agent selected.
- If human_clarification is selected, include a follow-up question on the second line. If necessary, acknowledge what the user said and gently remind them that you are a trading assistant covering premarket, intraday, postmarket, and strategy inquiries."#;

/// Intent classifier adapter over the external capability
pub struct IntentClassifier {
    generator: Arc<dyn TextGenerator>,
}

impl IntentClassifier {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Classify the conversation into a normalized routing decision.
    ///
    /// Capability failures degrade to a clarification request rather than an
    /// error: a broken classifier must never crash the session.
    pub async fn classify(&self, state: &SessionState) -> RoutingDecision {
        let raw = match self
            .generator
            .generate(ROUTING_INSTRUCTIONS, state.messages())
            .await
        {
            Ok(raw) => raw,
            Err(error) => {
                warn!(%error, "Classifier capability failed, degrading to clarification");
                return RoutingDecision::Clarify {
                    question: DEFAULT_CLARIFICATION_PROMPT.to_string(),
                };
            }
        };

        debug!(reply = %raw, "Classifier raw reply");
        let decision = parse_decision(&raw);

        match &decision {
            RoutingDecision::Dispatch(experts) => {
                info!(?experts, "Routing to experts");
            }
            RoutingDecision::Clarify { question } => {
                info!(%question, "Routing to human clarification");
            }
        }

        decision
    }
}

/// Normalize raw classifier output into a well-defined routing decision.
///
/// Grammar: space-separated expert identifiers on one line, or the
/// clarification marker with an optional follow-up question on the next
/// line. The marker is mutually exclusive with expert tokens and wins when
/// both appear. Unrecognized tokens are dropped; duplicates are collapsed;
/// an empty result coerces to clarification with the default prompt.
pub fn parse_decision(raw: &str) -> RoutingDecision {
    let cleaned = strip_code_fences(raw);

    if let Some(marker_line) = cleaned
        .lines()
        .position(|line| line.contains(CLARIFICATION_MARKER))
    {
        let question = cleaned
            .lines()
            .skip(marker_line + 1)
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or(DEFAULT_CLARIFICATION_PROMPT)
            .to_string();

        return RoutingDecision::Clarify { question };
    }

    let mut selected: Vec<ExpertKind> = Vec::new();
    for token in cleaned.split_whitespace() {
        if let Some(expert) = ExpertKind::from_token(token) {
            if !selected.contains(&expert) {
                selected.push(expert);
            }
        }
    }

    if selected.is_empty() {
        return RoutingDecision::Clarify {
            question: DEFAULT_CLARIFICATION_PROMPT.to_string(),
        };
    }

    RoutingDecision::Dispatch(selected)
}
