//! Dispatcher graph engine
//!
//! Owns the step graph and drives one round per `start`/`resume` call:
//!
//! Routing → {Clarifying, Dispatching}
//! Clarifying → Routing (on resume)
//! Dispatching → Summarizing (join complete)
//! Summarizing → Terminal
//!
//! Clarification suspends the thread behind a first-class checkpoint; expert
//! fan-out runs every selected handler over the same pre-fan-out snapshot and
//! joins all of them before the merge step.

use crate::classifier::IntentClassifier;
use crate::config::DispatcherConfig;
use crate::error::DispatchError;
use crate::experts::Expert;
use crate::generator::TextGenerator;
use crate::models::{
    Checkpoint, ExpertKind, Message, Outcome, RoutingDecision, SessionState,
};
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Phases of one dispatch round
enum Phase {
    Routing,
    Clarifying(String),
    Dispatching(Vec<ExpertKind>),
    Summarizing(Vec<(ExpertKind, Message)>),
}

/// Coordinates classification, clarification, expert fan-out, and merge
pub struct Dispatcher {
    classifier: IntentClassifier,
    generator: Arc<dyn TextGenerator>,
    checkpoints: RwLock<HashMap<String, Checkpoint>>,
}

impl Dispatcher {
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            classifier: IntentClassifier::new(config.intent_classifier),
            generator: config.text_generator,
            checkpoints: RwLock::new(HashMap::new()),
        }
    }

    /// Begin a round for `thread_id` from the given initial state.
    ///
    /// Returns `Completed` with the final state, or `Suspended` with the
    /// pending clarification question. A fault during expert dispatch fails
    /// the round and leaves the caller's prior state intact.
    pub async fn start(&self, initial_state: SessionState, thread_id: &str) -> Result<Outcome> {
        info!(
            thread_id,
            messages = initial_state.message_count(),
            "Dispatcher: starting round"
        );
        self.advance(initial_state, thread_id).await
    }

    /// Satisfy an outstanding clarification suspension with caller input.
    ///
    /// Consumes the thread's checkpoint exactly once; calling without an
    /// outstanding checkpoint is a usage error. Control returns to the
    /// routing step so the classifier re-evaluates the updated history.
    pub async fn resume(&self, thread_id: &str, user_text: &str) -> Result<Outcome> {
        let checkpoint = {
            let mut checkpoints = self.checkpoints.write().await;
            checkpoints.remove(thread_id)
        }
        .ok_or_else(|| DispatchError::NoPendingSuspension(thread_id.to_string()))?;

        info!(thread_id, "Dispatcher: resuming from checkpoint");

        let state = resolve_clarification(checkpoint, user_text);
        self.advance(state, thread_id).await
    }

    /// Has `thread_id` an outstanding suspension?
    pub async fn is_suspended(&self, thread_id: &str) -> bool {
        self.checkpoints.read().await.contains_key(thread_id)
    }

    /// Drive the phase machine from Routing until terminal or suspension
    async fn advance(&self, mut state: SessionState, thread_id: &str) -> Result<Outcome> {
        let mut phase = Phase::Routing;

        loop {
            phase = match phase {
                Phase::Routing => match self.classifier.classify(&state).await {
                    RoutingDecision::Clarify { question } => Phase::Clarifying(question),
                    RoutingDecision::Dispatch(selection) => Phase::Dispatching(selection),
                },

                Phase::Clarifying(question) => {
                    debug!(thread_id, "Suspending for human clarification");

                    let checkpoint = Checkpoint::new(state, question.clone());
                    self.checkpoints
                        .write()
                        .await
                        .insert(thread_id.to_string(), checkpoint);

                    return Ok(Outcome::Suspended {
                        thread_id: thread_id.to_string(),
                        question,
                    });
                }

                Phase::Dispatching(selection) => {
                    let outputs = self.fan_out(&state, selection).await?;
                    Phase::Summarizing(outputs)
                }

                Phase::Summarizing(outputs) => {
                    state = merge(state, outputs);
                    info!(
                        thread_id,
                        messages = state.message_count(),
                        "Dispatcher: round complete"
                    );
                    return Ok(Outcome::Completed(state));
                }
            };
        }
    }

    /// Run every selected expert over the same pre-fan-out snapshot.
    ///
    /// AND-join: all handlers must succeed before anything is merged. A
    /// single fault fails the round and discards sibling results.
    async fn fan_out(
        &self,
        state: &SessionState,
        mut selection: Vec<ExpertKind>,
    ) -> Result<Vec<(ExpertKind, Message)>> {
        // Canonical order; the classifier already deduplicates
        selection.sort();
        selection.dedup();

        info!(experts = ?selection, "Dispatching expert fan-out");

        let mut handles = Vec::with_capacity(selection.len());
        for kind in &selection {
            let expert = Expert::for_kind(*kind, Arc::clone(&self.generator));
            let snapshot = state.clone();
            handles.push(tokio::spawn(async move { expert.run(&snapshot).await }));
        }

        let mut outputs = Vec::with_capacity(selection.len());
        for (kind, handle) in selection.iter().zip(handles) {
            let message = handle
                .await
                .map_err(|e| {
                    DispatchError::ExpertExecutionFault(format!(
                        "{} expert task failed: {}",
                        kind, e
                    ))
                })??;
            outputs.push((*kind, message));
        }

        Ok(outputs)
    }
}

/// Summary/merge step: append expert outputs to the state in the fixed
/// enumeration order, not arrival order, keeping runs reproducible.
fn merge(
    mut state: SessionState,
    mut outputs: Vec<(ExpertKind, Message)>,
) -> SessionState {
    outputs.sort_by_key(|(kind, _)| *kind);

    for (kind, message) in outputs {
        debug!(expert = %kind, "Merging expert output");
        state.push(message);
    }

    state
}

/// Apply caller-supplied clarification input to the checkpointed state.
///
/// Empty input after trimming appends nothing: the prior state is reused so
/// the classifier gets another pass over the same history.
fn resolve_clarification(checkpoint: Checkpoint, user_text: &str) -> SessionState {
    let mut state = checkpoint.state;
    let trimmed = user_text.trim();

    if trimmed.is_empty() {
        warn!("No clarification input received, reusing existing messages");
    } else {
        info!("User provided clarification");
        state.push(Message::user(trimmed));
    }

    state
}
