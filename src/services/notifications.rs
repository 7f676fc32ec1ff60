//! Due-task notification scheduler
//!
//! Polls the store once per interval and raises a user-facing alert for
//! every task that has gone overdue, at most once per task per session.
//! The host environment decides whether alerts may be shown at all; a
//! denied permission keeps the loop running with alerts suppressed.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::domain::tasks::Task;
use crate::services::store::TaskStore;

/// Host-environment seam for alert delivery.
///
/// Implementations wrap whatever the embedding runtime offers (desktop
/// notifications, a terminal bell, a test recorder).
pub trait AlertSink: Send + Sync {
    /// One-time permission grant. Called once before any alert.
    fn request_permission(&self) -> bool;

    /// Show an alert for an overdue task.
    fn alert(&self, task: &Task);
}

/// Polls for overdue tasks and alerts through an [`AlertSink`].
pub struct DueTaskNotifier {
    store: TaskStore,
    sink: Arc<dyn AlertSink>,
    poll_interval: Duration,
    notified: HashSet<i64>,
}

impl DueTaskNotifier {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

    pub fn new(store: TaskStore, sink: Arc<dyn AlertSink>, poll_interval: Duration) -> Self {
        Self {
            store,
            sink,
            poll_interval,
            notified: HashSet::new(),
        }
    }

    /// Run the polling loop until the shutdown signal flips to `true` (or
    /// its sender is dropped). The first check happens immediately.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let permitted = self.sink.request_permission();
        if !permitted {
            info!("alert permission denied; notifications suppressed");
        }

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => self.check_due_tasks(permitted, Utc::now()),
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("due-task notifier stopping");
                        return;
                    }
                }
            }
        }
    }

    fn check_due_tasks(&mut self, permitted: bool, now: DateTime<Utc>) {
        let tasks = self.store.snapshot().tasks;

        for task in &tasks {
            // Completing a task resets its notified state for the session
            if task.status == crate::domain::tasks::TaskStatus::Completed {
                self.notified.remove(&task.id);
                continue;
            }

            if !permitted || self.notified.contains(&task.id) {
                continue;
            }

            if task.is_overdue(now) {
                debug!(task_id = task.id, "task overdue, alerting");
                self.sink.alert(task);
                self.notified.insert(task.id);
            }
        }
    }
}
