//! Search input debouncing
//!
//! Raw keystrokes arrive faster than we want to query. The debouncer
//! holds the latest text and only publishes it after the input has been
//! quiet for the configured delay, so typing "abc" yields one effective
//! search, not three.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::AbortHandle;

/// Debounces raw search text into an effective search key.
pub struct SearchDebouncer {
    delay: Duration,
    latest: Arc<Mutex<String>>,
    pending: Arc<Mutex<Option<AbortHandle>>>,
    tx: Arc<watch::Sender<String>>,
}

impl SearchDebouncer {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(800);

    /// Returns the debouncer plus the receiver of effective search text.
    /// The receiver starts at the empty string.
    pub fn new(delay: Duration) -> (Self, watch::Receiver<String>) {
        let (tx, rx) = watch::channel(String::new());
        (
            Self {
                delay,
                latest: Arc::new(Mutex::new(String::new())),
                pending: Arc::new(Mutex::new(None)),
                tx: Arc::new(tx),
            },
            rx,
        )
    }

    /// Feed one raw input change. Must run inside a tokio runtime.
    pub fn input(&self, text: impl Into<String>) {
        *self.latest.lock() = text.into();

        let mut pending = self.pending.lock();
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let latest = Arc::clone(&self.latest);
        let slot = Arc::clone(&self.pending);
        let tx = Arc::clone(&self.tx);
        let delay = self.delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            slot.lock().take();
            let _ = tx.send(latest.lock().clone());
        });
        *pending = Some(task.abort_handle());
    }
}
