// src/stream/decoder.rs

//! Incremental UTF-8 decoding of a chunked byte stream.

use std::str;

/// Bytes that could not be decoded as UTF-8.
///
/// `decoded` holds the text that preceded the malformed sequence in the same
/// call, so callers can still deliver it before failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedBytes {
    pub decoded: String,
    /// Absolute offset of the first malformed byte in the stream.
    pub position: u64,
    pub invalid_len: usize,
}

/// Lossless chunk-boundary-independent UTF-8 decoder.
///
/// A character whose encoding straddles two chunks is held back until the
/// chunk that completes it arrives.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    carry: Vec<u8>,
    /// Stream offset of the first byte in `carry`.
    offset: u64,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk.
    ///
    /// On malformed input the offending bytes are dropped and reported; any
    /// bytes after them stay buffered for the next call.
    pub fn decode(&mut self, chunk: &[u8]) -> Result<String, MalformedBytes> {
        self.carry.extend_from_slice(chunk);
        let bytes = std::mem::take(&mut self.carry);

        let err = match str::from_utf8(&bytes) {
            Ok(text) => {
                self.offset += bytes.len() as u64;
                return Ok(text.to_owned());
            }
            Err(err) => err,
        };

        let valid = err.valid_up_to();
        let decoded = String::from_utf8_lossy(&bytes[..valid]).into_owned();

        match err.error_len() {
            // Incomplete sequence at the end: wait for more bytes.
            None => {
                self.carry = bytes[valid..].to_vec();
                self.offset += valid as u64;
                Ok(decoded)
            }
            Some(invalid_len) => {
                let position = self.offset + valid as u64;
                let resume_at = valid + invalid_len;
                self.carry = bytes[resume_at..].to_vec();
                self.offset += resume_at as u64;
                Err(MalformedBytes {
                    decoded,
                    position,
                    invalid_len,
                })
            }
        }
    }

    /// Number of bytes currently held back waiting for completion.
    pub fn pending_len(&self) -> usize {
        self.carry.len()
    }

    /// End of stream: discard any incomplete trailing sequence and return
    /// how many bytes were dropped.
    pub fn finish(&mut self) -> usize {
        let dropped = self.carry.len();
        self.offset += dropped as u64;
        self.carry.clear();
        dropped
    }

    pub fn reset(&mut self) {
        self.carry.clear();
        self.offset = 0;
    }
}
