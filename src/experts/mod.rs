//! Expert handlers
//!
//! Four specialized response handlers sharing one contract: read the session
//! state, delegate to the text-generation capability with a domain-specific
//! instruction template, and return exactly one new assistant message. The
//! handlers never mutate shared state; the dispatcher owns appending.

use crate::error::DispatchError;
use crate::generator::TextGenerator;
use crate::models::{ExpertKind, Message, SessionState};
use std::sync::Arc;
use tracing::debug;

pub mod strategy;
pub use strategy::StrategyPlan;

const PREMARKET_INSTRUCTIONS: &str = "You are a premarket analyst for a trading assistant. \
Review overnight news, economic releases, and global market trends referenced in the conversation, \
then predict trends for the next trading day.\n\
Format your response as follows:\n\
Summary: [Your summary and reasoning here]\n\
Key Levels: [Statistics and key levels here]\n\
Potential Watchlist: [Stocks ranked by importance]\n\
Initial Risk Assessment: [Your initial risk assessment here]";

const INTRADAY_INSTRUCTIONS: &str = "You are an intraday trading assistant. \
Focus on real-time technical analysis, order book dynamics, and short-term predictions \
for the user's active or ongoing trades. Be structured and concise.";

const POSTMARKET_INSTRUCTIONS: &str = "You are an expert in analyzing postmarket trading data. \
Review the performance of the user's trades, identify patterns in the execution, \
and suggest potential refinements.\n\
Format your response as follows:\n\
Summary: [Your summary and reasoning here]\n\
Key Patterns: [Any patterns identified in the user's trades]\n\
Suggested Refinements: [Your suggestions for improving the trading strategy]";

pub(crate) fn instructions(kind: ExpertKind) -> &'static str {
    match kind {
        ExpertKind::Premarket => PREMARKET_INSTRUCTIONS,
        ExpertKind::Intraday => INTRADAY_INSTRUCTIONS,
        ExpertKind::Postmarket => POSTMARKET_INSTRUCTIONS,
        ExpertKind::Strategy => strategy::STRATEGY_INSTRUCTIONS,
    }
}

/// One expert handler instance
#[derive(Clone)]
pub struct Expert {
    kind: ExpertKind,
    instructions: &'static str,
    generator: Arc<dyn TextGenerator>,
}

impl Expert {
    pub fn for_kind(kind: ExpertKind, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            kind,
            instructions: instructions(kind),
            generator,
        }
    }

    pub fn kind(&self) -> ExpertKind {
        self.kind
    }

    /// Run the handler over a read-only state snapshot.
    ///
    /// Delegate failure is the unit of failure for this handler and surfaces
    /// as an execution fault for the round. The strategy handler additionally
    /// post-processes the reply into a structured plan artifact; its parse
    /// failures are recovered locally and never fault the round.
    pub async fn run(&self, state: &SessionState) -> crate::Result<Message> {
        debug!(expert = %self.kind, "Running expert handler");

        let raw = self
            .generator
            .generate(self.instructions, state.messages())
            .await
            .map_err(|e| {
                DispatchError::ExpertExecutionFault(format!(
                    "{} expert delegate failed: {}",
                    self.kind, e
                ))
            })?;

        let content = match self.kind {
            ExpertKind::Strategy => strategy::structure_strategy_reply(&raw),
            _ => raw,
        };

        Ok(Message::assistant(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::MockGenerator;
    use crate::models::MessageRole;

    #[tokio::test]
    async fn test_expert_appends_nothing_and_returns_one_message() {
        let generator = Arc::new(MockGenerator::script(["Markets look steady."]));
        let expert = Expert::for_kind(ExpertKind::Intraday, generator);
        let state = SessionState::new("How are my open positions?");

        let message = expert.run(&state).await.unwrap();

        assert_eq!(message.role, MessageRole::Assistant);
        assert_eq!(message.content, "Markets look steady.");
        // Handler is read-only over state
        assert_eq!(state.message_count(), 1);
    }

    #[tokio::test]
    async fn test_delegate_failure_is_execution_fault() {
        let generator = Arc::new(MockGenerator::failing("timeout"));
        let expert = Expert::for_kind(ExpertKind::Premarket, generator);
        let state = SessionState::new("Any overnight news?");

        let error = expert.run(&state).await.unwrap_err();
        assert!(matches!(
            error,
            DispatchError::ExpertExecutionFault(_)
        ));
        assert!(error.to_string().contains("premarket"));
    }

    #[test]
    fn test_each_expert_has_distinct_instructions() {
        let mut seen = Vec::new();
        for kind in ExpertKind::ALL {
            let template = instructions(kind);
            assert!(!seen.contains(&template));
            seen.push(template);
        }
    }
}
