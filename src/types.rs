use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Lifecycle phase of a single workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    AwaitingConfirmation,
    Completed,
    Failed,
    Cancelled,
}

impl RunPhase {
    /// `running` or `awaiting-confirmation`.
    pub fn is_active(self) -> bool {
        matches!(self, RunPhase::Running | RunPhase::AwaitingConfirmation)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunPhase::Completed | RunPhase::Failed | RunPhase::Cancelled
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunPhase::Idle => "idle",
            RunPhase::Running => "running",
            RunPhase::AwaitingConfirmation => "awaiting-confirmation",
            RunPhase::Completed => "completed",
            RunPhase::Failed => "failed",
            RunPhase::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How confirmation requests are answered when running from the CLI.
///
/// - `Ask`: prompt on the terminal and wait for the user (default).
/// - `Yes` / `No`: answer every request automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnswerPolicy {
    #[default]
    Ask,
    Yes,
    No,
}

impl FromStr for AnswerPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ask" => Ok(AnswerPolicy::Ask),
            "yes" => Ok(AnswerPolicy::Yes),
            "no" => Ok(AnswerPolicy::No),
            other => Err(format!(
                "invalid confirm policy: {other} (expected \"ask\", \"yes\" or \"no\")"
            )),
        }
    }
}
