// src/engine/session.rs

use std::fmt;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::engine::core::{CoreStep, SessionCore, WorkflowRun};
use crate::engine::{ConfirmationRequest, SessionEvent};
use crate::errors::{Result, RunnerError};
use crate::protocol::RunPayload;
use crate::stream::SentinelClassifier;
use crate::transport::{ByteStream, WorkflowTransport};
use crate::types::RunPhase;

/// Drives one workflow run at a time against a `WorkflowTransport`.
///
/// This is the async IO shell around `SessionCore`, which holds all run
/// semantics. The session owns the live stream handle exclusively and drops
/// it on every exit path (completion, failure, cancellation).
///
/// Consumption is a single cooperative loop: [`pump`](Self::pump) reads one
/// chunk at a time and returns as soon as the run pauses for confirmation or
/// leaves the `running` phase.
pub struct WorkflowSession<T: WorkflowTransport> {
    core: SessionCore,
    transport: T,
    stream: Option<ByteStream>,
    cancel: CancellationToken,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl<T: WorkflowTransport> fmt::Debug for WorkflowSession<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowSession")
            .field("core", &self.core)
            .field("has_stream", &self.stream.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: WorkflowTransport> WorkflowSession<T> {
    pub fn new(transport: T) -> Self {
        Self::with_classifier(transport, SentinelClassifier::default())
    }

    pub fn with_classifier(transport: T, classifier: SentinelClassifier) -> Self {
        Self {
            core: SessionCore::new(classifier),
            transport,
            stream: None,
            cancel: CancellationToken::new(),
            events: None,
        }
    }

    /// Publish every `SessionEvent` on `tx`.
    pub fn with_event_sink(mut self, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn phase(&self) -> RunPhase {
        self.core.phase()
    }

    pub fn log(&self) -> &str {
        self.core.log()
    }

    pub fn run(&self) -> Option<&WorkflowRun> {
        self.core.run()
    }

    pub fn pending_confirmation(&self) -> Option<&ConfirmationRequest> {
        self.core.pending_confirmation()
    }

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Handle for cancelling from another task (e.g. a Ctrl-C listener).
    ///
    /// The token stays valid across runs until it is used; once a run has
    /// been cancelled the next `start` installs a fresh token.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Begin a new run and open its stream.
    ///
    /// Fails with `InvalidState` while another run is active. If the
    /// execution request itself fails, the run ends in `failed` and the
    /// transport error is returned.
    pub async fn start(&mut self, payload: RunPayload) -> Result<()> {
        let step = self
            .core
            .begin(self.transport.endpoint(), payload.clone())?;
        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }
        self.stream = None;
        self.publish(step);

        let opened = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            res = self.transport.open_run(payload) => Some(res),
        };

        match opened {
            None => {
                self.apply_cancel();
                Ok(())
            }
            Some(Ok(stream)) => {
                debug!(endpoint = %self.transport.endpoint(), "workflow stream opened");
                self.stream = Some(stream);
                Ok(())
            }
            Some(Err(err)) => {
                self.fail_run(&err);
                Err(err)
            }
        }
    }

    /// Consume the stream until the run pauses or settles.
    ///
    /// Returns the phase reached: `awaiting-confirmation`, `completed` or
    /// `cancelled`. Run-level failures end the run in `failed` and are
    /// returned as errors.
    pub async fn pump(&mut self) -> Result<RunPhase> {
        while self.core.phase() == RunPhase::Running {
            if self.cancel.is_cancelled() {
                self.apply_cancel();
                break;
            }

            let Some(stream) = self.stream.as_mut() else {
                let err = RunnerError::Transport("no stream returned".to_string());
                self.fail_run(&err);
                return Err(err);
            };

            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                item = stream.next() => Some(item),
            };

            match next {
                None => {
                    self.apply_cancel();
                    break;
                }
                Some(Some(Ok(bytes))) => {
                    trace!(bytes = bytes.len(), "chunk received");
                    let step = self.core.ingest(&bytes);
                    self.publish_step(step)?;
                }
                Some(None) => {
                    let step = self.core.end_of_stream();
                    self.publish_step(step)?;
                }
                Some(Some(Err(err))) => {
                    self.fail_run(&err);
                    return Err(err);
                }
            }
        }

        if self.core.phase().is_terminal() {
            self.release_stream();
        }
        Ok(self.core.phase())
    }

    /// Deliver the user's decision and re-arm consumption.
    ///
    /// Fails with `NoPendingConfirmation` unless the run is
    /// `awaiting-confirmation`. The answer is sent before the gate re-arms;
    /// lines that arrived behind the request are classified next, then the
    /// caller resumes reading with [`pump`](Self::pump).
    pub async fn resolve_confirmation(&mut self, decision: bool) -> Result<()> {
        let answer = self.core.prepare_confirmation(decision)?;
        info!(ok = decision, "sending confirmation answer");

        let sent = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            res = self.transport.send_confirmation(answer) => Some(res),
        };

        match sent {
            None => {
                self.apply_cancel();
                return Ok(());
            }
            Some(Err(err)) => {
                self.fail_run(&err);
                return Err(err);
            }
            Some(Ok(())) => {}
        }

        let step = self.core.confirmation_sent(decision)?;
        self.publish_step(step)?;
        if self.core.phase().is_terminal() {
            self.release_stream();
        }
        Ok(())
    }

    /// Abandon the active run.
    ///
    /// Valid from `running` or `awaiting-confirmation`. No confirmation
    /// answer is sent and no further events are published for the run.
    pub fn cancel(&mut self) -> Result<()> {
        let step = self.core.cancel()?;
        self.cancel.cancel();
        self.release_stream();
        info!("workflow run cancelled");
        self.publish(step);
        Ok(())
    }

    fn apply_cancel(&mut self) {
        match self.core.cancel() {
            Ok(step) => {
                info!("workflow run cancelled");
                self.publish(step);
            }
            Err(err) => debug!(error = %err, "cancellation observed for inactive run"),
        }
        self.release_stream();
    }

    fn fail_run(&mut self, err: &RunnerError) {
        let step = self.core.fail(err);
        self.publish(step);
        self.release_stream();
    }

    /// Publish a step produced while running; a failure carried by the step
    /// releases the stream and is handed back to the caller.
    fn publish_step(&mut self, mut step: CoreStep) -> Result<()> {
        let failure = step.failure.take();
        self.publish(step);
        match failure {
            Some(err) => {
                self.release_stream();
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn release_stream(&mut self) {
        if self.stream.take().is_some() {
            debug!("stream handle released");
        }
    }

    fn publish(&self, step: CoreStep) {
        let Some(tx) = self.events.as_ref() else {
            return;
        };
        for event in step.events {
            // A dropped receiver only means nobody is watching.
            let _ = tx.send(event);
        }
    }
}
