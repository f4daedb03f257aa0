// src/engine/core.rs

//! Pure per-run state machine.
//!
//! `SessionCore` consumes raw byte chunks and control inputs (start, stream
//! end, decision, cancel, failure) and produces:
//! - an updated `WorkflowRun` (phase + accumulated log)
//! - the list of `SessionEvent`s describing what changed
//! - whether the shell should keep reading from the stream
//!
//! It owns no channels, no Tokio types and no transport, so every
//! suspension and resumption point can be tested by feeding bytes directly.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::gate::ConfirmationGate;
use crate::engine::{ConfirmationRequest, RunId, SessionEvent};
use crate::errors::{Result, RunnerError};
use crate::protocol::{ConfirmAnswer, RunPayload};
use crate::stream::{LineAssembler, LineKind, SentinelClassifier, StreamDecoder};
use crate::types::RunPhase;

/// Prefix of the explanatory line appended when a run fails.
pub const FAILURE_MARKER: &str = "❌";

/// One execution attempt of a submitted configuration.
#[derive(Debug, Clone)]
pub struct WorkflowRun {
    pub id: RunId,
    pub endpoint: String,
    pub payload: RunPayload,
    pub phase: RunPhase,
    /// Rendered log: every plain line followed by exactly one `\n`.
    pub log: String,
    pub started_at: DateTime<Utc>,
}

/// Result of feeding one input into the core.
#[derive(Debug, Default)]
pub struct CoreStep {
    pub events: Vec<SessionEvent>,
    /// Whether the shell should read the next chunk.
    pub keep_reading: bool,
    /// Set when this input ended the run in `failed`.
    pub failure: Option<RunnerError>,
}

/// Decoded input waiting to be classified, in stream order.
#[derive(Debug)]
enum Backlogged {
    Line(String),
    /// Undecodable bytes at this point of the stream; fails the run once
    /// everything before it has been consumed.
    Malformed(RunnerError),
}

#[derive(Debug)]
pub struct SessionCore {
    classifier: SentinelClassifier,
    run: Option<WorkflowRun>,
    decoder: StreamDecoder,
    assembler: LineAssembler,
    gate: ConfirmationGate,
    /// Input not yet classified because the gate is paused.
    backlog: VecDeque<Backlogged>,
}

impl SessionCore {
    pub fn new(classifier: SentinelClassifier) -> Self {
        Self {
            classifier,
            run: None,
            decoder: StreamDecoder::new(),
            assembler: LineAssembler::new(),
            gate: ConfirmationGate::new(),
            backlog: VecDeque::new(),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.run.as_ref().map(|r| r.phase).unwrap_or_default()
    }

    pub fn run(&self) -> Option<&WorkflowRun> {
        self.run.as_ref()
    }

    pub fn log(&self) -> &str {
        self.run.as_ref().map(|r| r.log.as_str()).unwrap_or_default()
    }

    pub fn pending_confirmation(&self) -> Option<&ConfirmationRequest> {
        self.gate.pending()
    }

    pub fn gate(&self) -> &ConfirmationGate {
        &self.gate
    }

    /// Entries received but held back behind a pending confirmation.
    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// Discard the previous run (if any) and begin a new one in `running`.
    pub fn begin(&mut self, endpoint: &str, payload: RunPayload) -> Result<CoreStep> {
        let phase = self.phase();
        if phase.is_active() {
            return Err(RunnerError::InvalidState {
                operation: "start",
                phase,
            });
        }

        self.decoder.reset();
        self.assembler.reset();
        self.gate = ConfirmationGate::new();
        self.backlog.clear();

        let run = WorkflowRun {
            id: Uuid::new_v4(),
            endpoint: endpoint.to_string(),
            payload,
            phase: RunPhase::Idle,
            log: String::new(),
            started_at: Utc::now(),
        };
        info!(run_id = %run.id, endpoint = %run.endpoint, "new workflow run");
        self.run = Some(run);

        let mut step = CoreStep::default();
        self.set_phase(RunPhase::Running, &mut step);
        step.keep_reading = true;
        Ok(step)
    }

    /// Feed one raw chunk from the stream.
    ///
    /// Bytes that arrive for a run that is no longer active are ignored.
    /// Malformed bytes fail the run only when consumption reaches them, so
    /// a confirmation request earlier in the stream still pauses first.
    pub fn ingest(&mut self, chunk: &[u8]) -> CoreStep {
        let mut step = CoreStep::default();
        if !self.phase().is_active() {
            debug!(bytes = chunk.len(), "ignoring chunk for inactive run");
            return step;
        }

        match self.decoder.decode(chunk) {
            Ok(text) => self.assemble(&text),
            Err(malformed) => {
                self.assemble(&malformed.decoded);
                self.backlog.push_back(Backlogged::Malformed(RunnerError::Decoding {
                    position: malformed.position,
                    invalid_len: malformed.invalid_len,
                }));
            }
        }

        self.drain_backlog(&mut step);
        step.keep_reading = self.phase() == RunPhase::Running;
        step
    }

    /// The stream ended gracefully.
    pub fn end_of_stream(&mut self) -> CoreStep {
        let mut step = CoreStep::default();
        if !self.phase().is_active() {
            return step;
        }

        let dropped = self.decoder.finish();
        if dropped > 0 {
            debug!(bytes = dropped, "dropping incomplete trailing byte sequence");
        }
        if let Some(tail) = self.assembler.finish() {
            debug!(len = tail.len(), "dropping unterminated final line");
        }

        self.drain_backlog(&mut step);

        match self.phase() {
            RunPhase::Running => {
                self.gate.close();
                self.set_phase(RunPhase::Completed, &mut step);
            }
            RunPhase::AwaitingConfirmation => {
                warn!("stream ended while a confirmation is pending");
            }
            _ => {}
        }
        step
    }

    /// Validate that a decision can be delivered and build its answer.
    pub fn prepare_confirmation(&self, decision: bool) -> Result<ConfirmAnswer> {
        if self.phase() != RunPhase::AwaitingConfirmation {
            return Err(RunnerError::NoPendingConfirmation);
        }
        self.gate.answer_for(decision)
    }

    /// The decision reached the service: re-arm and continue with any lines
    /// that were held back.
    pub fn confirmation_sent(&mut self, decision: bool) -> Result<CoreStep> {
        if self.phase() != RunPhase::AwaitingConfirmation {
            return Err(RunnerError::NoPendingConfirmation);
        }
        let (request, _answer) = self.gate.resolve(decision)?;
        info!(
            description = %request.description,
            ok = decision,
            backlog = self.backlog.len(),
            "confirmation resolved; resuming"
        );

        let mut step = CoreStep::default();
        self.set_phase(RunPhase::Running, &mut step);
        self.drain_backlog(&mut step);
        step.keep_reading = self.phase() == RunPhase::Running;
        Ok(step)
    }

    /// Abandon the active run. A pending confirmation is discarded and no
    /// answer is produced for it.
    pub fn cancel(&mut self) -> Result<CoreStep> {
        let phase = self.phase();
        if !phase.is_active() {
            return Err(RunnerError::InvalidState {
                operation: "cancel",
                phase,
            });
        }

        if let Some(discarded) = self.gate.close() {
            info!(description = %discarded.description, "discarding pending confirmation");
        }
        self.clear_pipeline();

        let mut step = CoreStep::default();
        self.set_phase(RunPhase::Cancelled, &mut step);
        Ok(step)
    }

    /// End the active run in `failed` with an explanatory log line.
    pub fn fail(&mut self, err: &RunnerError) -> CoreStep {
        let mut step = CoreStep::default();
        self.fail_into(err, &mut step);
        step
    }

    fn fail_into(&mut self, err: &RunnerError, step: &mut CoreStep) {
        if !self.phase().is_active() {
            return;
        }
        warn!(error = %err, "workflow run failed");

        let line = format!("{FAILURE_MARKER} {err}");
        if let Some(run) = self.run.as_mut() {
            run.log.push_str(&line);
            run.log.push('\n');
            step.events.push(SessionEvent::LogLine {
                run_id: run.id,
                line,
            });
        }

        self.gate.close();
        self.clear_pipeline();
        self.set_phase(RunPhase::Failed, step);
        step.keep_reading = false;
    }

    fn assemble(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.backlog
            .extend(self.assembler.feed(text).into_iter().map(Backlogged::Line));
    }

    /// Classify held-back lines until the backlog is empty, the gate
    /// pauses or a malformed entry fails the run.
    fn drain_backlog(&mut self, step: &mut CoreStep) {
        while self.gate.is_armed() && self.phase() == RunPhase::Running {
            let line = match self.backlog.pop_front() {
                None => break,
                Some(Backlogged::Line(line)) => line,
                Some(Backlogged::Malformed(err)) => {
                    self.fail_into(&err, step);
                    step.failure = Some(err);
                    return;
                }
            };

            match self.classifier.classify(line) {
                LineKind::Log(line) => self.append_log(line, step),
                LineKind::ConfirmationRequest { description } => {
                    let request = ConfirmationRequest::new(description);
                    if let Err(err) = self.gate.pause(request.clone()) {
                        self.fail_into(&err, step);
                        step.failure = Some(err);
                        return;
                    }
                    self.set_phase(RunPhase::AwaitingConfirmation, step);
                    if let Some(run) = self.run.as_ref() {
                        step.events.push(SessionEvent::ConfirmationRequested {
                            run_id: run.id,
                            request,
                        });
                    }
                }
            }
        }
    }

    fn append_log(&mut self, line: String, step: &mut CoreStep) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        run.log.push_str(&line);
        run.log.push('\n');
        step.events.push(SessionEvent::LogLine {
            run_id: run.id,
            line,
        });
    }

    fn clear_pipeline(&mut self) {
        self.backlog.clear();
        self.assembler.reset();
        self.decoder.reset();
    }

    fn set_phase(&mut self, to: RunPhase, step: &mut CoreStep) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        let from = run.phase;
        if from == to {
            return;
        }
        run.phase = to;
        debug!(run_id = %run.id, %from, %to, "phase changed");
        step.events.push(SessionEvent::PhaseChanged {
            run_id: run.id,
            from,
            to,
        });
    }
}
