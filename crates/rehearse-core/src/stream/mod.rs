//! Streaming-response consumer
//!
//! Handles the backend's SSE-framed answer stream: incremental decoding,
//! reassembly into one logical answer, and word-by-word display pacing
//! that reacts to page/terminal visibility.

mod pacer;
mod session;
mod sse;
mod visibility;

pub use session::{ChatStream, ImageAttachment, SessionPhase, StreamCallbacks};
pub use sse::{SseDecoder, SseFrame};
pub use visibility::Visibility;
