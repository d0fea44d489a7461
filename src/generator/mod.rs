//! Text generation capability boundary
//!
//! The dispatcher treats content generation as an opaque external service
//! with unspecified latency and possible transient failure. Everything that
//! needs generated text (classifier, experts) goes through this trait.

use crate::models::Message;
use crate::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

pub mod gemini;
pub use gemini::GeminiGenerator;

/// Trait for the external text-generation capability
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce a text reply for the given system instruction and conversation
    async fn generate(
        &self,
        system_instruction: &str,
        conversation: &[Message],
    ) -> Result<String>;
}

/// Strip a markdown code fence wrapping an LLM reply, if present.
pub(crate) fn strip_code_fences(raw: &str) -> &str {
    raw.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

enum MockBehavior {
    /// Scripted replies, consumed in order
    Script(Mutex<VecDeque<String>>),
    /// Echo the system instruction back as the reply
    EchoInstruction,
    /// Always fail with the given message
    Fail(String),
}

/// Mock generator for development & testing
/// Keeps the dispatcher functional without an LLM dependency
pub struct MockGenerator {
    behavior: MockBehavior,
}

impl MockGenerator {
    /// Replies are returned in order; an exhausted script is an error.
    pub fn script<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            behavior: MockBehavior::Script(Mutex::new(
                replies.into_iter().map(Into::into).collect(),
            )),
        }
    }

    /// Every call echoes its system instruction back.
    /// Useful for asserting which handler produced which message.
    pub fn echo() -> Self {
        Self {
            behavior: MockBehavior::EchoInstruction,
        }
    }

    /// Every call fails. Simulates an unavailable delegate.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: MockBehavior::Fail(message.into()),
        }
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(
        &self,
        system_instruction: &str,
        _conversation: &[Message],
    ) -> Result<String> {
        match &self.behavior {
            MockBehavior::Script(replies) => {
                let mut replies = replies.lock().await;
                replies.pop_front().ok_or_else(|| {
                    crate::error::DispatchError::LlmError(
                        "Mock generator script exhausted".to_string(),
                    )
                })
            }
            MockBehavior::EchoInstruction => Ok(system_instruction.to_string()),
            MockBehavior::Fail(message) => {
                Err(crate::error::DispatchError::LlmError(message.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let generator = MockGenerator::script(["first", "second"]);
        assert_eq!(generator.generate("sys", &[]).await.unwrap(), "first");
        assert_eq!(generator.generate("sys", &[]).await.unwrap(), "second");
        assert!(generator.generate("sys", &[]).await.is_err());
    }

    #[tokio::test]
    async fn test_failing_generator() {
        let generator = MockGenerator::failing("delegate down");
        let error = generator.generate("sys", &[]).await.unwrap_err();
        assert!(error.to_string().contains("delegate down"));
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  plain text  "), "plain text");
    }
}
