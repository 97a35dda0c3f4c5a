//! Page/terminal visibility signal
//!
//! Read-only input to a streaming session: while hidden, display pacing is
//! bypassed; on the hidden-to-visible edge the withheld text is pushed to
//! the display in one step. The CLI maps terminal focus events onto this.

use std::sync::Arc;

use tokio::sync::watch;

/// Cloneable visibility handle shared between the environment and sessions
#[derive(Clone, Debug)]
pub struct Visibility {
    tx: Arc<watch::Sender<bool>>,
}

impl Visibility {
    /// New handle, initially visible
    pub fn new() -> Self {
        Self {
            tx: Arc::new(watch::Sender::new(true)),
        }
    }

    /// Record a visibility change from the environment
    pub fn set_visible(&self, visible: bool) {
        self.tx.send_replace(visible);
    }

    pub fn is_visible(&self) -> bool {
        *self.tx.borrow()
    }

    /// Subscribe to visibility changes
    pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::new()
    }
}
