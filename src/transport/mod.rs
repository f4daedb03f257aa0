// src/transport/mod.rs

//! Pluggable transport to the remote execution service.
//!
//! The session talks to a `WorkflowTransport` instead of an HTTP client
//! directly. This keeps the stream pipeline testable with scripted chunk
//! sequences while production uses [`HttpTransport`].
//!
//! - `open_run` issues the execution request and returns the open response
//!   body as a stream of raw byte chunks.
//! - `send_confirmation` delivers the user's decision for a paused run.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;

use crate::errors::Result;
use crate::protocol::{ConfirmAnswer, RunPayload};

pub mod http;

pub use http::{HttpTransport, HttpTransportOptions};

/// Live response body of a run: raw chunks with arbitrary boundaries.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Boxed future returned by transport operations.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Trait abstracting the wire contract with the execution service.
///
/// Production code uses [`HttpTransport`]; tests can provide their own
/// implementation that replays scripted chunks.
pub trait WorkflowTransport: Send {
    /// Base endpoint of the service, for logging and run bookkeeping.
    fn endpoint(&self) -> &str;

    /// Issue the execution request and hand back its streaming body.
    fn open_run(&mut self, payload: RunPayload) -> TransportFuture<'_, ByteStream>;

    /// Deliver a confirmation decision. The response body is not
    /// interpreted.
    fn send_confirmation(&mut self, answer: ConfirmAnswer) -> TransportFuture<'_, ()>;
}
