use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures::StreamExt;
use futures::stream;
use tokio::sync::mpsc;
use tracing::debug;

use runwatch::errors::{Result, RunnerError};
use runwatch::protocol::{ConfirmAnswer, RunPayload};
use runwatch::transport::{ByteStream, TransportFuture, WorkflowTransport};

pub const FAKE_ENDPOINT: &str = "http://fake.local";

/// A call the session made against a fake transport.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    OpenRun(RunPayload),
    Confirm(bool),
}

pub type CallLog = Arc<Mutex<Vec<RecordedCall>>>;

/// Snapshot of the recorded calls.
pub fn recorded(calls: &CallLog) -> Vec<RecordedCall> {
    calls.lock().unwrap().clone()
}

#[derive(Debug, Clone)]
enum ScriptItem {
    Chunk(Bytes),
    Fail(String),
}

/// Scripted response body for one `open_run`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRun {
    items: Vec<ScriptItem>,
    hang: bool,
}

impl ScriptedRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chunks of text, delivered one per poll.
    pub fn texts<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        chunks
            .into_iter()
            .fold(Self::new(), |run, chunk| run.text(chunk.as_ref()))
    }

    pub fn text(self, chunk: &str) -> Self {
        self.bytes(chunk.as_bytes())
    }

    pub fn bytes(mut self, chunk: &[u8]) -> Self {
        self.items
            .push(ScriptItem::Chunk(Bytes::copy_from_slice(chunk)));
        self
    }

    /// The body read fails at this point (abrupt end).
    pub fn fail(mut self, message: &str) -> Self {
        self.items.push(ScriptItem::Fail(message.to_string()));
        self
    }

    /// Instead of ending, stay open forever after the scripted items.
    pub fn hang(mut self) -> Self {
        self.hang = true;
        self
    }

    fn into_stream(self) -> ByteStream {
        let items = stream::iter(self.items.into_iter().map(|item| match item {
            ScriptItem::Chunk(bytes) => Ok(bytes),
            ScriptItem::Fail(message) => Err(RunnerError::Transport(message)),
        }));
        if self.hang {
            Box::pin(items.chain(stream::pending()))
        } else {
            Box::pin(items)
        }
    }
}

/// A fake transport that:
/// - records every request the session makes
/// - replays one scripted body per `open_run`
pub struct ScriptedTransport {
    runs: VecDeque<ScriptedRun>,
    calls: CallLog,
    fail_open: Option<String>,
    fail_confirm: Option<String>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            runs: VecDeque::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_open: None,
            fail_confirm: None,
        }
    }

    pub fn with_run(mut self, run: ScriptedRun) -> Self {
        self.runs.push_back(run);
        self
    }

    pub fn with_chunks<I, S>(self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.with_run(ScriptedRun::texts(chunks))
    }

    pub fn failing_open(mut self, message: &str) -> Self {
        self.fail_open = Some(message.to_string());
        self
    }

    pub fn failing_confirm(mut self, message: &str) -> Self {
        self.fail_confirm = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> CallLog {
        Arc::clone(&self.calls)
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowTransport for ScriptedTransport {
    fn endpoint(&self) -> &str {
        FAKE_ENDPOINT
    }

    fn open_run(&mut self, payload: RunPayload) -> TransportFuture<'_, ByteStream> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall::OpenRun(payload));
        let fail = self.fail_open.clone();
        let run = self.runs.pop_front().unwrap_or_default();
        debug!(items = run.items.len(), hang = run.hang, "fake transport: opening scripted run");

        Box::pin(async move {
            match fail {
                Some(message) => Err(RunnerError::Transport(message)),
                None => Ok(run.into_stream()),
            }
        })
    }

    fn send_confirmation(&mut self, answer: ConfirmAnswer) -> TransportFuture<'_, ()> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall::Confirm(answer.ok));
        let fail = self.fail_confirm.clone();

        Box::pin(async move {
            match fail {
                Some(message) => Err(RunnerError::Transport(message)),
                None => Ok(()),
            }
        })
    }
}

/// Test-side handle pushing chunks into a [`ChannelTransport`] body.
///
/// Dropping the feeder ends the stream gracefully.
#[derive(Clone)]
pub struct ChunkFeeder {
    tx: mpsc::UnboundedSender<Result<Bytes>>,
}

impl ChunkFeeder {
    pub fn text(&self, chunk: &str) {
        self.bytes(chunk.as_bytes());
    }

    pub fn bytes(&self, chunk: &[u8]) {
        let _ = self.tx.send(Ok(Bytes::copy_from_slice(chunk)));
    }

    pub fn fail(&self, message: &str) {
        let _ = self.tx.send(Err(RunnerError::Transport(message.to_string())));
    }
}

/// A fake transport whose single response body is fed live by the test.
pub struct ChannelTransport {
    rx: Option<mpsc::UnboundedReceiver<Result<Bytes>>>,
    calls: CallLog,
}

impl ChannelTransport {
    pub fn new() -> (Self, ChunkFeeder) {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Self {
            rx: Some(rx),
            calls: Arc::new(Mutex::new(Vec::new())),
        };
        (transport, ChunkFeeder { tx })
    }

    pub fn calls(&self) -> CallLog {
        Arc::clone(&self.calls)
    }
}

impl WorkflowTransport for ChannelTransport {
    fn endpoint(&self) -> &str {
        FAKE_ENDPOINT
    }

    fn open_run(&mut self, payload: RunPayload) -> TransportFuture<'_, ByteStream> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall::OpenRun(payload));
        let rx = self.rx.take();

        Box::pin(async move {
            let rx = rx.ok_or_else(|| {
                RunnerError::Transport("channel body already consumed".to_string())
            })?;
            let body = stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|item| (item, rx))
            });
            Ok(Box::pin(body) as ByteStream)
        })
    }

    fn send_confirmation(&mut self, answer: ConfirmAnswer) -> TransportFuture<'_, ()> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall::Confirm(answer.ok));
        Box::pin(async { Ok(()) })
    }
}
