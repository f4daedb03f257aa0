// src/stream/sentinel.rs

use std::borrow::Cow;

use crate::protocol::CONFIRM_SENTINEL;

/// What a complete line turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Ordinary output, kept exactly as received.
    Log(String),
    /// The service is waiting for a yes/no decision.
    ConfirmationRequest { description: String },
}

/// Splits lines into log output and confirmation requests.
///
/// A line is a request if and only if it starts with the sentinel prefix.
/// The rest of the line is the description, verbatim. There is no escaping:
/// a log line that happens to start with the prefix is read as a request.
#[derive(Debug, Clone)]
pub struct SentinelClassifier {
    prefix: Cow<'static, str>,
}

impl Default for SentinelClassifier {
    fn default() -> Self {
        Self {
            prefix: Cow::Borrowed(CONFIRM_SENTINEL),
        }
    }
}

impl SentinelClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a non-default prefix (from `[protocol].sentinel_prefix`).
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Cow::Owned(prefix.into()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn classify(&self, line: String) -> LineKind {
        match line.strip_prefix(self.prefix.as_ref()) {
            Some(description) => LineKind::ConfirmationRequest {
                description: description.to_owned(),
            },
            None => LineKind::Log(line),
        }
    }
}
