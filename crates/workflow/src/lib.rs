//! Workflow state — cross-step bookkeeping for multi-step agent sessions.
//!
//! State is a plain value threaded through the caller: every step consumes
//! the current state and returns an updated copy. Nothing is shared or
//! mutated behind the caller's back, so each intermediate state can be kept,
//! compared, or discarded.

pub mod audit;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use audit::{AuditState, ApprovalStatus, SecurityReport, Severity, SubmitReceipt};

/// Research and planning notes gathered across a research → plan workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    #[serde(default)]
    pub research_notes: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<String>,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one research note.
    #[must_use]
    pub fn with_research_note(mut self, note: impl Into<String>) -> Self {
        self.research_notes.push(note.into());
        debug!(notes = self.research_notes.len(), "Recorded research note");
        self
    }

    /// Replace the plan with `steps`.
    #[must_use]
    pub fn with_action_items<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.action_items = steps.into_iter().map(Into::into).collect();
        debug!(steps = self.action_items.len(), "Stored workflow plan");
        self
    }

    /// Plain-text dump of the captured state.
    pub fn render(&self) -> String {
        let mut out = String::from("- Research notes:\n");
        for note in &self.research_notes {
            out.push_str(&format!("  • {note}\n"));
        }
        out.push_str("- Action items:\n");
        for step in &self.action_items {
            out.push_str(&format!("  • {step}\n"));
        }
        out
    }
}

/// Fold `steps` over `initial`, handing each step the previous step's state.
pub fn run_steps<S, I>(initial: S, steps: I) -> S
where
    I: IntoIterator<Item = Box<dyn FnOnce(S) -> S>>,
{
    steps.into_iter().fold(initial, |state, step| step(state))
}
