//! Dispatcher configuration
//!
//! The two external capabilities are passed explicitly at construction.
//! No ambient globals or environment lookups inside the library.

use crate::generator::TextGenerator;
use std::sync::Arc;

/// Recognized options for building a [`crate::Dispatcher`]
#[derive(Clone)]
pub struct DispatcherConfig {
    /// Capability that turns the conversation into a routing decision
    pub intent_classifier: Arc<dyn TextGenerator>,
    /// Capability the expert handlers delegate to for content generation
    pub text_generator: Arc<dyn TextGenerator>,
}

impl DispatcherConfig {
    pub fn new(
        intent_classifier: Arc<dyn TextGenerator>,
        text_generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            intent_classifier,
            text_generator,
        }
    }

    /// One capability serving both roles
    pub fn shared(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            intent_classifier: Arc::clone(&generator),
            text_generator: generator,
        }
    }
}
