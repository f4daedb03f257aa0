// src/engine/mod.rs

//! Workflow run engine.
//!
//! This module ties together:
//! - the confirmation gate (suspend / resume control point)
//! - the pure per-run state machine that drives the stream pipeline
//! - the async session that owns the transport and the live stream handle
//!
//! The pure core lives in [`core`] and can be unit tested without Tokio or
//! a transport; the async/IO shell is implemented in [`session`].

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::RunPhase;

pub mod core;
pub mod gate;
pub mod session;

pub use self::core::{CoreStep, SessionCore, WorkflowRun};
pub use gate::{ConfirmationGate, GateState};
pub use session::WorkflowSession;

/// Identifier of one execution attempt.
pub type RunId = Uuid;

/// One outstanding pause waiting for a human yes/no decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl ConfirmationRequest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            created_at: Utc::now(),
        }
    }
}

/// Observable changes of a run, in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    PhaseChanged {
        run_id: RunId,
        from: RunPhase,
        to: RunPhase,
    },
    /// A plain log line was appended (without its trailing newline).
    LogLine { run_id: RunId, line: String },
    ConfirmationRequested {
        run_id: RunId,
        request: ConfirmationRequest,
    },
}
