//! Streaming chat sessions
//!
//! `ChatStream` owns at most one in-flight exchange with the backend's
//! streaming answer endpoint. Starting a new session supersedes (cancels)
//! the previous one; `reset` cancels and clears. A cancelled session never
//! writes into a newer session's state.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use parking_lot::Mutex;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::pacer::PacerHandle;
use super::sse::{SseDecoder, SseFrame};
use super::visibility::Visibility;
use crate::config::Config;
use crate::error::StreamError;

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Streaming,
    Complete,
    Errored,
}

/// State shared between the session driver, the pacing worker and accessors
#[derive(Debug, Default)]
pub(crate) struct SessionInner {
    pub phase: SessionPhase,
    /// Full answer text in arrival order; append-only within a session
    pub accumulated: String,
    /// Paced display text; always a prefix of `accumulated`
    pub response: String,
    pub error: Option<String>,
}

pub(crate) type SharedState = Arc<Mutex<SessionInner>>;

/// Optional observer callbacks for one consumer
///
/// `on_token` receives every display increment: paced tokens while visible,
/// plus a single catch-up chunk after a hidden stretch. Concatenating its
/// arguments always reproduces the displayed text.
#[derive(Default)]
pub struct StreamCallbacks {
    pub on_token: Option<Box<dyn Fn(&str) + Send + Sync>>,
    pub on_complete: Option<Box<dyn Fn(&str) + Send + Sync>>,
    pub on_error: Option<Box<dyn Fn(&StreamError) + Send + Sync>>,
}

/// An image sent along with the question
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub base64data: String,
    pub mime_type: String,
}

impl ImageAttachment {
    pub fn from_bytes(data: &[u8], mime_type: &str) -> Self {
        use base64::Engine;
        Self {
            base64data: base64::engine::general_purpose::STANDARD.encode(data),
            mime_type: mime_type.to_string(),
        }
    }
}

/// Consumer for the streaming answer endpoint
pub struct ChatStream {
    http: reqwest::Client,
    endpoint: String,
    word_delay: Duration,
    visibility: Visibility,
    callbacks: Arc<StreamCallbacks>,
    state: SharedState,
    cancel: Mutex<CancellationToken>,
}

impl ChatStream {
    pub fn new(config: &Config) -> Result<Self, StreamError> {
        Self::with_callbacks(config, StreamCallbacks::default())
    }

    pub fn with_callbacks(
        config: &Config,
        callbacks: StreamCallbacks,
    ) -> Result<Self, StreamError> {
        // No overall timeout: answers legitimately stream for a while
        let http = reqwest::Client::builder()
            .connect_timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/voice/stream", config.base()),
            word_delay: config.word_delay(),
            visibility: Visibility::new(),
            callbacks: Arc::new(callbacks),
            state: SharedState::default(),
            cancel: Mutex::new(CancellationToken::new()),
        })
    }

    /// The visibility handle driving this consumer's pacing policy
    pub fn visibility(&self) -> Visibility {
        self.visibility.clone()
    }

    /// Currently displayed text
    pub fn response(&self) -> String {
        self.state.lock().response.clone()
    }

    pub fn is_streaming(&self) -> bool {
        self.state.lock().phase == SessionPhase::Streaming
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.lock().phase
    }

    /// Message of the last terminal error, if the session failed
    pub fn last_error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// Run one session to completion and return the full answer.
    ///
    /// Fails on a non-OK status, a transport error, or an in-stream `error`
    /// payload; the error is stored, handed to `on_error` once, and
    /// returned. Starting while another session is in flight cancels it.
    pub async fn start(
        &self,
        question: &str,
        image: Option<ImageAttachment>,
    ) -> Result<String, StreamError> {
        let cancel = self.renew_session();
        match self.run_session(question, image, cancel.clone()).await {
            Ok(full) if !cancel.is_cancelled() => {
                {
                    let mut state = self.state.lock();
                    if cancel.is_cancelled() {
                        return Err(StreamError::Cancelled);
                    }
                    state.phase = SessionPhase::Complete;
                }
                if let Some(on_complete) = &self.callbacks.on_complete {
                    on_complete(&full);
                }
                Ok(full)
            }
            Err(err) if !cancel.is_cancelled() => {
                {
                    let mut state = self.state.lock();
                    if cancel.is_cancelled() {
                        return Err(StreamError::Cancelled);
                    }
                    state.phase = SessionPhase::Errored;
                    state.error = Some(err.to_string());
                }
                // Stop the pacer; nothing more gets displayed after a failure
                cancel.cancel();
                if let Some(on_error) = &self.callbacks.on_error {
                    on_error(&err);
                }
                Err(err)
            }
            // Superseded by reset() or a newer start(); the state is no
            // longer ours to touch and no callbacks fire
            _ => Err(StreamError::Cancelled),
        }
    }

    /// Clear the answer, error and phase, and cancel anything in flight
    pub fn reset(&self) {
        self.cancel.lock().cancel();
        let mut state = self.state.lock();
        state.phase = SessionPhase::Idle;
        state.accumulated.clear();
        state.response.clear();
        state.error = None;
    }

    /// Cancel the previous session and arm state for a fresh one
    fn renew_session(&self) -> CancellationToken {
        let fresh = CancellationToken::new();
        let old = {
            let mut slot = self.cancel.lock();
            std::mem::replace(&mut *slot, fresh.clone())
        };
        old.cancel();
        let mut state = self.state.lock();
        state.phase = SessionPhase::Streaming;
        state.accumulated.clear();
        state.response.clear();
        state.error = None;
        fresh
    }

    async fn run_session(
        &self,
        question: &str,
        image: Option<ImageAttachment>,
        cancel: CancellationToken,
    ) -> Result<String, StreamError> {
        let pacer = PacerHandle::spawn(
            self.word_delay,
            self.visibility.clone(),
            self.state.clone(),
            self.callbacks.clone(),
            cancel.clone(),
        );

        let mut body = serde_json::json!({ "question": question });
        if let Some(image) = image {
            body["base64data"] = Value::String(image.base64data);
            body["mimeType"] = Value::String(image.mime_type);
        }

        debug!("POST {}", self.endpoint);
        let request = self.http.post(&self.endpoint).json(&body);
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(StreamError::Cancelled),
            result = request.send() => result?,
        };
        if !response.status().is_success() {
            return Err(StreamError::Status(response.status()));
        }

        let mut decoder = SseDecoder::new();
        let mut chunks = response.bytes_stream();
        loop {
            let chunk = tokio::select! {
                _ = cancel.cancelled() => return Err(StreamError::Cancelled),
                chunk = chunks.next() => chunk,
            };
            let (frames, at_end) = match chunk {
                Some(Ok(bytes)) => (decoder.feed(bytes), false),
                Some(Err(err)) => return Err(StreamError::Transport(err)),
                None => (decoder.finish(), true),
            };
            for frame in frames {
                match frame {
                    SseFrame::Text(text) => pacer.push(text),
                    // Stop reading; drain the queue, then resolve
                    SseFrame::Done => {
                        return pacer.flush().await.ok_or(StreamError::Cancelled);
                    }
                    SseFrame::Upstream(message) => {
                        return Err(StreamError::Upstream(message));
                    }
                }
            }
            if at_end {
                return pacer.flush().await.ok_or(StreamError::Cancelled);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_restores_initial_state() {
        let stream = ChatStream::new(&Config::default()).unwrap();
        stream.reset();
        assert_eq!(stream.phase(), SessionPhase::Idle);
        assert_eq!(stream.response(), "");
        assert!(stream.last_error().is_none());
        assert!(!stream.is_streaming());
    }

    #[test]
    fn test_image_attachment_encodes_base64() {
        let image = ImageAttachment::from_bytes(b"\x89PNG", "image/png");
        assert_eq!(image.base64data, "iVBORw==");
        assert_eq!(image.mime_type, "image/png");
    }
}
