// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Run-level failures (`Transport`, `ProtocolViolation`, `Decoding`) end the
//! active run in the `failed` phase. Call-level failures (`InvalidState`,
//! `NoPendingConfirmation`) are returned to the caller and leave the run as
//! it was.

use thiserror::Error;

use crate::types::RunPhase;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Decoding error: {invalid_len} malformed byte(s) at stream offset {position}")]
    Decoding { position: u64, invalid_len: usize },

    #[error("Invalid state: cannot {operation} while run is {phase}")]
    InvalidState {
        operation: &'static str,
        phase: RunPhase,
    },

    #[error("No pending confirmation to resolve")]
    NoPendingConfirmation,

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RunnerError {
    /// Whether this error ends the run it occurred in.
    pub fn is_run_fatal(&self) -> bool {
        matches!(
            self,
            RunnerError::Transport(_)
                | RunnerError::ProtocolViolation(_)
                | RunnerError::Decoding { .. }
        )
    }
}

impl From<reqwest::Error> for RunnerError {
    fn from(err: reqwest::Error) -> Self {
        RunnerError::Transport(err.to_string())
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, RunnerError>;
