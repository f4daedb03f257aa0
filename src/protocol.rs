// src/protocol.rs

//! Wire contract with the remote execution service.
//!
//! ```text
//! POST {api_url}/run_workflow      {"dsl": "...", "screwHoles": {...}}
//!   -> chunked UTF-8 text, newline-delimited, open until the run ends
//! POST {api_url}/confirm_response  {"ok": true}
//!   -> body ignored
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const RUN_WORKFLOW_PATH: &str = "/run_workflow";
pub const CONFIRM_RESPONSE_PATH: &str = "/confirm_response";

/// Prefix marking a confirmation request line (trailing space included).
pub const CONFIRM_SENTINEL: &str = "▶️ NEED_CONFIRM ";

/// Body of `POST /run_workflow`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunPayload {
    pub dsl: String,

    /// Domain-specific auxiliary data; omitted from the body when absent.
    #[serde(
        rename = "screwHoles",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub screw_holes: Option<Value>,
}

impl RunPayload {
    pub fn new(dsl: impl Into<String>) -> Self {
        Self {
            dsl: dsl.into(),
            screw_holes: None,
        }
    }

    pub fn with_screw_holes(mut self, screw_holes: Value) -> Self {
        self.screw_holes = Some(screw_holes);
        self
    }
}

/// Body of `POST /confirm_response`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmAnswer {
    pub ok: bool,
}

/// Join a base URL and an absolute path without doubling the slash.
pub fn endpoint_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
