//! Client-side task store
//!
//! Holds the last known task list, the current selection, the active
//! filters, and modal visibility. The store is an owned, injectable
//! container rather than ambient global state: every mutation swaps in a
//! complete new snapshot under one lock and publishes it to subscribers,
//! so readers never observe a half-applied update.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

use crate::domain::labels::Label;
use crate::domain::tasks::{SortKey, SortOrder, Task, TaskPriority, TaskQuery, TaskStatus};

/// Filter state held client-side only, never persisted server-side.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFilters {
    pub search: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub label_ids: Vec<i64>,
    pub overdue_only: bool,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

impl Default for TaskFilters {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: None,
            priority: None,
            label_ids: Vec::new(),
            overdue_only: false,
            sort_by: SortKey::CreatedAt,
            sort_order: SortOrder::Desc,
        }
    }
}

impl TaskFilters {
    /// The list query these filters translate into.
    pub fn to_query(&self) -> TaskQuery {
        TaskQuery {
            search: if self.search.is_empty() {
                None
            } else {
                Some(self.search.clone())
            },
            status: self.status,
            priority: self.priority,
            label_ids: self.label_ids.clone(),
            overdue: self.overdue_only,
            page: None,
            page_size: None,
            sort_by: Some(self.sort_by),
            sort_order: Some(self.sort_order),
        }
    }
}

/// Partial filter update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct FilterPatch {
    pub search: Option<String>,
    pub status: Option<Option<TaskStatus>>,
    pub priority: Option<Option<TaskPriority>>,
    pub label_ids: Option<Vec<i64>>,
    pub overdue_only: Option<bool>,
    pub sort_by: Option<SortKey>,
    pub sort_order: Option<SortOrder>,
}

/// Mergeable subset of task fields for local updates.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub is_deleted: Option<bool>,
    pub labels: Option<Vec<Label>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Patch carrying every mergeable field of a server-confirmed task.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: Some(task.title.clone()),
            description: Some(task.description.clone()),
            status: Some(task.status),
            priority: Some(task.priority),
            due_date: Some(task.due_date),
            is_deleted: Some(task.is_deleted),
            labels: Some(task.labels.clone()),
            updated_at: Some(task.updated_at),
        }
    }

    fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(is_deleted) = self.is_deleted {
            task.is_deleted = is_deleted;
        }
        if let Some(labels) = &self.labels {
            task.labels = labels.clone();
        }
        if let Some(updated_at) = self.updated_at {
            task.updated_at = updated_at;
        }
    }
}

/// One immutable view of the store.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub tasks: Vec<Task>,
    pub selected_task: Option<Task>,
    pub filters: TaskFilters,
    pub is_task_modal_open: bool,
}

/// Shared store handle. Clones observe the same state.
#[derive(Clone)]
pub struct TaskStore {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<StoreSnapshot>,
    tx: watch::Sender<StoreSnapshot>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        let snapshot = StoreSnapshot::default();
        let (tx, _) = watch::channel(snapshot.clone());
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(snapshot),
                tx,
            }),
        }
    }

    /// Current state, cloned out.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.inner.state.lock().clone()
    }

    /// Receive every published snapshot, starting from the current one.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.inner.tx.subscribe()
    }

    fn mutate(&self, f: impl FnOnce(&mut StoreSnapshot)) {
        let mut state = self.inner.state.lock();
        let mut next = state.clone();
        f(&mut next);
        *state = next.clone();
        // Subscribers may all be gone; that's fine
        let _ = self.inner.tx.send(next);
    }

    pub fn set_tasks(&self, tasks: Vec<Task>) {
        self.mutate(|s| s.tasks = tasks);
    }

    /// Prepend: newest task shows first.
    pub fn add_task(&self, task: Task) {
        self.mutate(|s| s.tasks.insert(0, task));
    }

    /// Merge `patch` into the matching list entry and, when it is the
    /// same task, into the selection. Never changes ids or introduces
    /// duplicates.
    pub fn update_task(&self, task_id: i64, patch: &TaskPatch) {
        self.mutate(|s| {
            if let Some(task) = s.tasks.iter_mut().find(|t| t.id == task_id) {
                patch.apply(task);
            }
            if let Some(selected) = s.selected_task.as_mut() {
                if selected.id == task_id {
                    patch.apply(selected);
                }
            }
        });
    }

    pub fn remove_task(&self, task_id: i64) {
        self.mutate(|s| s.tasks.retain(|t| t.id != task_id));
    }

    /// Open the modal, optionally selecting a task (none means "create").
    pub fn open_task_modal(&self, task: Option<Task>) {
        self.mutate(|s| {
            s.selected_task = task;
            s.is_task_modal_open = true;
        });
    }

    pub fn close_task_modal(&self) {
        self.mutate(|s| {
            s.selected_task = None;
            s.is_task_modal_open = false;
        });
    }

    pub fn set_filters(&self, patch: FilterPatch) {
        self.mutate(|s| {
            if let Some(search) = patch.search {
                s.filters.search = search;
            }
            if let Some(status) = patch.status {
                s.filters.status = status;
            }
            if let Some(priority) = patch.priority {
                s.filters.priority = priority;
            }
            if let Some(label_ids) = patch.label_ids {
                s.filters.label_ids = label_ids;
            }
            if let Some(overdue_only) = patch.overdue_only {
                s.filters.overdue_only = overdue_only;
            }
            if let Some(sort_by) = patch.sort_by {
                s.filters.sort_by = sort_by;
            }
            if let Some(sort_order) = patch.sort_order {
                s.filters.sort_order = sort_order;
            }
        });
    }

    pub fn reset_filters(&self) {
        self.mutate(|s| s.filters = TaskFilters::default());
    }
}
