//! Quick-toggle click disambiguation
//!
//! One click marks a task complete, a double click marks it incomplete
//! again. Both arrive through the same handler, so the first click only
//! arms a timer: if a second click lands inside the window the timer is
//! cancelled and the pair counts as a double click; if the window expires
//! untouched the single click wins. This trades up to one window of
//! latency for click-count disambiguation.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

/// Mutation the toggle decided to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    MarkComplete,
    MarkIncomplete,
}

/// Single/double-click disambiguator. One instance per toggleable task
/// control.
pub struct StatusToggle {
    window: Duration,
    pending: Arc<Mutex<Option<AbortHandle>>>,
    tx: mpsc::UnboundedSender<ToggleAction>,
}

impl StatusToggle {
    pub const DEFAULT_WINDOW: Duration = Duration::from_millis(300);

    /// Returns the toggle plus the receiver the decided actions arrive on.
    pub fn new(window: Duration) -> (Self, mpsc::UnboundedReceiver<ToggleAction>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                window,
                pending: Arc::new(Mutex::new(None)),
                tx,
            },
            rx,
        )
    }

    /// Feed one click event. Must run inside a tokio runtime.
    pub fn click(&self) {
        let mut pending = self.pending.lock();

        // Second click inside the window: cancel the timer, double click
        if let Some(handle) = pending.take() {
            handle.abort();
            let _ = self.tx.send(ToggleAction::MarkIncomplete);
            return;
        }

        // First click: arm the window timer
        let tx = self.tx.clone();
        let slot = Arc::clone(&self.pending);
        let window = self.window;
        let task = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            // Only emit if the slot is still ours; a concurrent second
            // click may have claimed it between wakeup and here
            if slot.lock().take().is_some() {
                let _ = tx.send(ToggleAction::MarkComplete);
            }
        });
        *pending = Some(task.abort_handle());
    }
}
