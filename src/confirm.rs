// src/confirm.rs

//! Where confirmation decisions come from.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use crate::engine::ConfirmationRequest;
use crate::errors::Result;
use crate::types::AnswerPolicy;

/// Turns a pending confirmation request into a decision.
///
/// With `AnswerPolicy::Ask` the user is prompted on stderr and the answer is
/// read line by line from `input` until it parses as yes or no.
#[derive(Debug)]
pub struct ConfirmationPrompt<R> {
    policy: AnswerPolicy,
    input: R,
}

impl<R: AsyncBufRead + Unpin> ConfirmationPrompt<R> {
    pub fn new(policy: AnswerPolicy, input: R) -> Self {
        Self { policy, input }
    }

    pub fn policy(&self) -> AnswerPolicy {
        self.policy
    }

    /// `Ok(None)` when input ended before a decision was given.
    pub async fn decide(&mut self, request: &ConfirmationRequest) -> Result<Option<bool>> {
        match self.policy {
            AnswerPolicy::Yes => {
                info!(description = %request.description, "auto-confirming");
                Ok(Some(true))
            }
            AnswerPolicy::No => {
                info!(description = %request.description, "auto-declining");
                Ok(Some(false))
            }
            AnswerPolicy::Ask => self.ask(request).await,
        }
    }

    async fn ask(&mut self, request: &ConfirmationRequest) -> Result<Option<bool>> {
        let mut line = String::new();
        loop {
            eprint!("Confirm: {} [y/n] ", request.description);
            std::io::stderr().flush()?;

            line.clear();
            if self.input.read_line(&mut line).await? == 0 {
                debug!("input closed while waiting for a decision");
                return Ok(None);
            }

            match parse_decision(&line) {
                Some(decision) => return Ok(Some(decision)),
                None => eprintln!("please answer 'y' or 'n'"),
            }
        }
    }
}

pub fn parse_decision(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
