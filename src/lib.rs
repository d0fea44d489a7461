//! TradingPal Dispatcher
//!
//! A conversational dispatcher for a trading assistant that:
//! - Classifies each user message into one or more expert intents
//! - Fans out to the matching expert handlers in parallel
//! - Pauses mid-flight to ask the user a clarifying question when needed
//! - Joins all expert outputs and merges them into the transcript
//!
//! ROUND:
//! ROUTING → (CLARIFYING ⇄ ROUTING) | DISPATCHING → SUMMARIZING → TERMINAL

pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod experts;
pub mod generator;
pub mod models;

pub use error::{DispatchError, Result};

// Re-export common types
pub use config::DispatcherConfig;
pub use dispatcher::Dispatcher;
pub use generator::{GeminiGenerator, TextGenerator};
pub use models::*;
