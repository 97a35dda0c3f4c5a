//! SSE wire decoding for the streaming answer endpoint
//!
//! The response body is UTF-8 text framed as `data: <json-or-[DONE]>\n`
//! lines, delivered in arbitrarily sized chunks. Chunks may split both
//! multi-byte characters and lines; both carries live here so the decoded
//! output is identical however the body is sliced.

use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, warn};

/// A decoded frame from the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// A chunk of answer text to append
    Text(String),
    /// End-of-stream sentinel (`[DONE]`)
    Done,
    /// The backend reported a fatal error inside the stream
    Upstream(String),
}

/// Incremental decoder for the SSE-framed body
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Trailing bytes of an incomplete UTF-8 sequence from the last chunk
    partial_utf8: Vec<u8>,
    /// Accumulated partial line from previous chunks
    partial_line: String,
    /// Event counter for logging
    event_count: usize,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk of bytes into zero or more frames
    pub fn feed(&mut self, bytes: Bytes) -> Vec<SseFrame> {
        let text = self.decode_utf8(&bytes);
        let combined = format!("{}{}", std::mem::take(&mut self.partial_line), text);

        let mut lines: Vec<&str> = combined.split('\n').collect();
        // A chunk rarely ends exactly on a line boundary; carry the tail
        if !combined.ends_with('\n') {
            if let Some(tail) = lines.pop() {
                self.partial_line = tail.to_string();
            }
        }

        let mut frames = Vec::new();
        for line in lines {
            if let Some(frame) = self.parse_line(line) {
                let done = frame == SseFrame::Done;
                frames.push(frame);
                if done {
                    break;
                }
            }
        }
        frames
    }

    /// Flush the unterminated final line, if any, at end of body
    pub fn finish(&mut self) -> Vec<SseFrame> {
        self.partial_utf8.clear();
        let line = std::mem::take(&mut self.partial_line);
        self.parse_line(&line).into_iter().collect()
    }

    /// Decode bytes, carrying incomplete trailing sequences to the next call
    fn decode_utf8(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.partial_utf8);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();
        while !rest.is_empty() {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let valid_up_to = err.valid_up_to();
                    out.push_str(std::str::from_utf8(&rest[..valid_up_to]).unwrap_or(""));
                    match err.error_len() {
                        // Invalid sequence: substitute and keep going
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &rest[valid_up_to + bad..];
                        }
                        // Incomplete sequence at the chunk boundary: carry it
                        None => {
                            self.partial_utf8 = rest[valid_up_to..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Parse one complete line into a frame
    fn parse_line(&mut self, line: &str) -> Option<SseFrame> {
        // Skip empty lines and SSE comments
        if line.is_empty() || line.starts_with(':') {
            return None;
        }
        let data = line.strip_prefix("data: ")?.trim();

        self.event_count += 1;
        if data == "[DONE]" {
            debug!("SSE [DONE] marker after {} events", self.event_count);
            return Some(SseFrame::Done);
        }

        match serde_json::from_str::<Value>(data) {
            Ok(json) => {
                if let Some(message) = json.get("error").and_then(|e| e.as_str()) {
                    return Some(SseFrame::Upstream(message.to_string()));
                }
                json.get("text")
                    .and_then(|t| t.as_str())
                    .map(|t| SseFrame::Text(t.to_string()))
            }
            Err(_) => {
                // A single bad line is not fatal for the session
                warn!(
                    "Failed to parse SSE JSON (event #{}): {}",
                    self.event_count, data
                );
                None
            }
        }
    }
}
