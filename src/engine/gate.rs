// src/engine/gate.rs

//! Suspend/resume control point for confirmation requests.
//!
//! ```text
//!   armed ──request──▶ paused ──decision──▶ armed
//!     │                  │
//!     └──end / cancel──▶ closed ◀──cancel──┘
//! ```
//!
//! `closed` is terminal.

use tracing::debug;

use crate::engine::ConfirmationRequest;
use crate::errors::{Result, RunnerError};
use crate::protocol::ConfirmAnswer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Lines are being consumed.
    Armed,
    /// A confirmation is outstanding; nothing is consumed.
    Paused,
    /// Stream ended or run abandoned.
    Closed,
}

#[derive(Debug)]
pub struct ConfirmationGate {
    state: GateState,
    pending: Option<ConfirmationRequest>,
}

impl Default for ConfirmationGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfirmationGate {
    pub fn new() -> Self {
        Self {
            state: GateState::Armed,
            pending: None,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state == GateState::Armed
    }

    pub fn pending(&self) -> Option<&ConfirmationRequest> {
        self.pending.as_ref()
    }

    /// `armed → paused`.
    ///
    /// At most one request may be outstanding; a second one while paused is
    /// a desynchronised session. The session core never hits the `Paused`
    /// arm: lines behind a pending request wait in its backlog unclassified.
    pub fn pause(&mut self, request: ConfirmationRequest) -> Result<()> {
        match self.state {
            GateState::Armed => {
                debug!(description = %request.description, "gate paused for confirmation");
                self.state = GateState::Paused;
                self.pending = Some(request);
                Ok(())
            }
            GateState::Paused => {
                let outstanding = self
                    .pending
                    .as_ref()
                    .map(|r| r.description.as_str())
                    .unwrap_or_default();
                Err(RunnerError::ProtocolViolation(format!(
                    "confirmation request {:?} arrived while {:?} is still pending",
                    request.description, outstanding
                )))
            }
            GateState::Closed => Err(RunnerError::ProtocolViolation(format!(
                "confirmation request {:?} arrived after the stream was closed",
                request.description
            ))),
        }
    }

    /// The answer that resolving with `decision` would send, without
    /// changing state.
    pub fn answer_for(&self, decision: bool) -> Result<ConfirmAnswer> {
        match self.state {
            GateState::Paused => Ok(ConfirmAnswer { ok: decision }),
            GateState::Armed | GateState::Closed => Err(RunnerError::NoPendingConfirmation),
        }
    }

    /// `paused → armed`. Returns the resolved request together with the
    /// answer for the remote service.
    pub fn resolve(&mut self, decision: bool) -> Result<(ConfirmationRequest, ConfirmAnswer)> {
        let answer = self.answer_for(decision)?;
        let request = self
            .pending
            .take()
            .ok_or(RunnerError::NoPendingConfirmation)?;
        self.state = GateState::Armed;
        debug!(description = %request.description, ok = decision, "gate re-armed");
        Ok((request, answer))
    }

    /// Move to `closed`, discarding any pending request (returned so the
    /// caller can log it). Closing twice is a no-op.
    pub fn close(&mut self) -> Option<ConfirmationRequest> {
        self.state = GateState::Closed;
        self.pending.take()
    }
}
