// src/stream/mod.rs

//! Byte stream → classified line pipeline.
//!
//! - [`decoder`] turns arbitrarily split byte chunks into UTF-8 text,
//!   carrying incomplete multi-byte sequences between chunks.
//! - [`lines`] assembles text into complete `\n`-terminated lines and keeps
//!   the unterminated tail for the next chunk.
//! - [`sentinel`] tells plain log lines apart from confirmation requests.
//!
//! None of these types do IO; the session feeds them and decides what to do
//! with the results.

pub mod decoder;
pub mod lines;
pub mod sentinel;

pub use decoder::{MalformedBytes, StreamDecoder};
pub use lines::LineAssembler;
pub use sentinel::{LineKind, SentinelClassifier};
