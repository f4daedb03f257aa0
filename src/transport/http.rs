// src/transport/http.rs

//! `reqwest`-backed implementation of the wire contract.

use std::time::Duration;

use futures::StreamExt;
use tracing::{debug, warn};

use crate::config::ServiceSection;
use crate::errors::{Result, RunnerError};
use crate::protocol::{
    CONFIRM_RESPONSE_PATH, ConfirmAnswer, RUN_WORKFLOW_PATH, RunPayload, endpoint_url,
};
use crate::transport::{ByteStream, TransportFuture, WorkflowTransport};

/// Client-side knobs for the HTTP transport.
///
/// Only connection establishment is bounded; an open stream is never timed
/// out here.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransportOptions {
    pub connect_timeout: Option<Duration>,
}

impl From<&ServiceSection> for HttpTransportOptions {
    fn from(service: &ServiceSection) -> Self {
        Self {
            connect_timeout: service.connect_timeout_ms.map(Duration::from_millis),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_options(base_url, HttpTransportOptions::default())
    }

    pub fn with_options(base_url: impl Into<String>, options: HttpTransportOptions) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = options.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl WorkflowTransport for HttpTransport {
    fn endpoint(&self) -> &str {
        &self.base_url
    }

    fn open_run(&mut self, payload: RunPayload) -> TransportFuture<'_, ByteStream> {
        // Clone so the future doesn't borrow `self` across `await`.
        let client = self.client.clone();
        let url = endpoint_url(&self.base_url, RUN_WORKFLOW_PATH);

        Box::pin(async move {
            debug!(%url, dsl_len = payload.dsl.len(), "posting workflow");
            let response = client.post(&url).json(&payload).send().await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(RunnerError::Transport(format!(
                    "no stream returned: {url} responded {status}: {}",
                    body.trim()
                )));
            }

            let stream = response.bytes_stream().map(|item| {
                item.map_err(|err| RunnerError::Transport(format!("stream ended abruptly: {err}")))
            });
            Ok(Box::pin(stream) as ByteStream)
        })
    }

    fn send_confirmation(&mut self, answer: ConfirmAnswer) -> TransportFuture<'_, ()> {
        let client = self.client.clone();
        let url = endpoint_url(&self.base_url, CONFIRM_RESPONSE_PATH);

        Box::pin(async move {
            debug!(%url, ok = answer.ok, "posting confirmation answer");
            let response = client.post(&url).json(&answer).send().await?;

            let status = response.status();
            if !status.is_success() {
                warn!(%url, %status, "confirmation endpoint returned non-success status");
            }
            Ok(())
        })
    }
}
