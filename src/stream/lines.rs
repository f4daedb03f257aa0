// src/stream/lines.rs

//! Line assembly over decoded text chunks.

/// Accumulates text and yields only complete lines.
///
/// A line ends at `\n`; a `\r` immediately before it is treated as part of
/// the terminator. The unterminated tail is kept until a later chunk
/// completes it. Feeding the same text in any chunking yields the same
/// lines in the same order.
#[derive(Debug, Default)]
pub struct LineAssembler {
    partial: String,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `chunk` and return every line it completed, in order.
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        self.partial.push_str(chunk);

        let Some(last_newline) = self.partial.rfind('\n') else {
            return Vec::new();
        };

        let tail = self.partial.split_off(last_newline + 1);
        let mut complete = std::mem::replace(&mut self.partial, tail);
        complete.pop(); // final '\n'

        complete.split('\n').map(strip_carriage_return).collect()
    }

    /// Text received since the last newline.
    pub fn partial(&self) -> &str {
        &self.partial
    }

    /// End of stream. The unterminated tail is never a line; it is dropped
    /// and returned only so the caller can report it.
    pub fn finish(&mut self) -> Option<String> {
        if self.partial.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.partial))
        }
    }

    pub fn reset(&mut self) {
        self.partial.clear();
    }
}

fn strip_carriage_return(line: &str) -> String {
    line.strip_suffix('\r').unwrap_or(line).to_owned()
}
