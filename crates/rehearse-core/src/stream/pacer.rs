//! Word pacing for streamed answers
//!
//! Incoming text is split into word-and-whitespace tokens and replayed to
//! the display one token at a time, with a fixed delay between tokens, so
//! long as the page is visible. While hidden, text bypasses pacing and is
//! appended to the accumulated answer immediately; the display catches up
//! in one step on the next hidden-to-visible edge.
//!
//! A single worker task consumes the token queue, so at most one drain can
//! ever be in flight per session and tokens reach the display in strict
//! arrival order.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::session::{SharedState, StreamCallbacks};
use super::visibility::Visibility;

/// Split text into word and whitespace tokens, preserving whitespace runs
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_space = None;
    for ch in text.chars() {
        let is_space = ch.is_whitespace();
        if in_space != Some(is_space) && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        in_space = Some(is_space);
        current.push(ch);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

enum PacerMsg {
    /// Text received from the wire, not yet tokenized
    Text(String),
    /// Drain whatever is pending, then reply with the full accumulated text
    Flush(oneshot::Sender<String>),
}

/// Handle feeding one session's pacing worker
pub(crate) struct PacerHandle {
    tx: mpsc::UnboundedSender<PacerMsg>,
}

impl PacerHandle {
    pub fn spawn(
        delay: Duration,
        visibility: Visibility,
        state: SharedState,
        callbacks: Arc<StreamCallbacks>,
        cancel: CancellationToken,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = PacerWorker {
            rx,
            delay,
            vis_rx: visibility.subscribe(),
            visibility,
            state,
            callbacks,
            cancel,
            queue: VecDeque::new(),
            pending_flush: None,
        };
        tokio::spawn(worker.run());
        Self { tx }
    }

    pub fn push(&self, text: String) {
        let _ = self.tx.send(PacerMsg::Text(text));
    }

    /// Wait for the queue to drain and return the full accumulated text.
    /// Returns `None` if the worker was cancelled out from under us.
    pub async fn flush(&self) -> Option<String> {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(PacerMsg::Flush(ack_tx)).is_err() {
            return None;
        }
        ack_rx.await.ok()
    }
}

/// The single consumer of the pending-token queue
struct PacerWorker {
    rx: mpsc::UnboundedReceiver<PacerMsg>,
    delay: Duration,
    vis_rx: watch::Receiver<bool>,
    // Held so the watch sender outlives the worker
    visibility: Visibility,
    state: SharedState,
    callbacks: Arc<StreamCallbacks>,
    cancel: CancellationToken,
    queue: VecDeque<String>,
    pending_flush: Option<oneshot::Sender<String>>,
}

impl PacerWorker {
    async fn run(mut self) {
        let mut was_visible = self.visibility.is_visible();
        loop {
            if let Some(token) = self.queue.pop_front() {
                self.emit(&token);
                if !self.queue.is_empty() {
                    tokio::select! {
                        _ = self.cancel.cancelled() => return,
                        _ = tokio::time::sleep(self.delay) => {}
                    }
                }
                self.absorb_pending();
                if !self.visible() {
                    // Went hidden mid-drain: no point animating to nobody
                    self.dump_queue();
                    was_visible = false;
                }
                if self.queue.is_empty() {
                    self.ack_flush();
                }
            } else {
                tokio::select! {
                    _ = self.cancel.cancelled() => return,
                    changed = self.vis_rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        let visible = self.visible();
                        if visible && !was_visible {
                            self.sync_display();
                        }
                        was_visible = visible;
                    }
                    msg = self.rx.recv() => match msg {
                        Some(msg) => self.on_msg(msg),
                        None => return,
                    }
                }
            }
        }
    }

    fn on_msg(&mut self, msg: PacerMsg) {
        match msg {
            PacerMsg::Text(text) => {
                if self.visible() {
                    self.queue.extend(tokenize(&text));
                } else {
                    // Hidden: bypass the queue, keeping arrival order
                    self.dump_queue();
                    let mut state = self.state.lock();
                    if !self.cancel.is_cancelled() {
                        state.accumulated.push_str(&text);
                        trace!("appended {} hidden chars", text.len());
                    }
                }
            }
            PacerMsg::Flush(ack) => {
                self.pending_flush = Some(ack);
                if self.queue.is_empty() {
                    self.ack_flush();
                }
            }
        }
    }

    /// Pull in everything that arrived while we were pacing, without blocking
    fn absorb_pending(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            self.on_msg(msg);
        }
    }

    fn visible(&self) -> bool {
        *self.vis_rx.borrow()
    }

    /// Append one token to both the answer and the display, then notify.
    /// A cancelled worker must not write into a newer session's state.
    fn emit(&mut self, token: &str) {
        {
            let mut state = self.state.lock();
            if self.cancel.is_cancelled() {
                return;
            }
            state.accumulated.push_str(token);
            state.response.push_str(token);
        }
        if let Some(on_token) = &self.callbacks.on_token {
            on_token(token);
        }
    }

    /// Move all queued tokens straight into the accumulated answer
    fn dump_queue(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        let mut state = self.state.lock();
        if self.cancel.is_cancelled() {
            self.queue.clear();
            return;
        }
        for token in self.queue.drain(..) {
            state.accumulated.push_str(&token);
        }
    }

    /// Push text withheld from the display out in one step
    fn sync_display(&mut self) {
        let suffix = {
            let mut state = self.state.lock();
            if self.cancel.is_cancelled() {
                return;
            }
            // The display is always a prefix of the accumulated answer
            let suffix = state.accumulated[state.response.len()..].to_string();
            state.response = state.accumulated.clone();
            suffix
        };
        if !suffix.is_empty() {
            if let Some(on_token) = &self.callbacks.on_token {
                on_token(&suffix);
            }
        }
    }

    fn ack_flush(&mut self) {
        if let Some(ack) = self.pending_flush.take() {
            self.sync_display();
            let full = self.state.lock().accumulated.clone();
            let _ = ack.send(full);
        }
    }
}
