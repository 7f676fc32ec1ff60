//! Client facade
//!
//! Wires the HTTP adapter, resource clients, query cache, and store into
//! one handle and enforces the read/mutate data flow: reads go through
//! the cache, mutations hit the backend first and only then touch local
//! state and invalidate the affected cache keys.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, watch};

use crate::api::{ActivityApi, AuthApi, CommentsApi, LabelsApi, TasksApi};
use crate::config::Settings;
use crate::domain::activity::ActivityLog;
use crate::domain::comments::{Comment, CreateCommentRequest};
use crate::domain::labels::{CreateLabelRequest, Label, UpdateLabelRequest};
use crate::domain::tasks::{
    CreateTaskRequest, Task, TaskListResponse, TaskQuery, TaskStatus, UpdateTaskRequest,
};
use crate::error::ApiResult;
use crate::http::{HttpClient, SessionStore};
use crate::services::cache::{keys, QueryCache};
use crate::services::debounce::SearchDebouncer;
use crate::services::notifications::{AlertSink, DueTaskNotifier};
use crate::services::store::{TaskPatch, TaskStore};
use crate::services::toggle::{StatusToggle, ToggleAction};

/// One handle over the whole client stack. Cheap to clone.
#[derive(Clone)]
pub struct TaskmanClient {
    http: HttpClient,
    tasks: TasksApi,
    labels: LabelsApi,
    comments: CommentsApi,
    activity: ActivityApi,
    auth: AuthApi,
    cache: QueryCache,
    store: TaskStore,
    task_list_ttl: Duration,
    detail_ttl: Duration,
    search_debounce: Duration,
    toggle_window: Duration,
    notify_poll_interval: Duration,
}

impl TaskmanClient {
    /// Build a client with the session loaded from the configured
    /// directory.
    pub fn new(settings: &Settings) -> Result<Self> {
        let session = SessionStore::open(&settings.session_dir);
        Self::with_session(settings, session)
    }

    /// Build a client around an explicit session store (tests inject a
    /// temp-dir store here).
    pub fn with_session(settings: &Settings, session: SessionStore) -> Result<Self> {
        let http = HttpClient::new(settings, session)?;
        Ok(Self {
            tasks: TasksApi::new(http.clone()),
            labels: LabelsApi::new(http.clone()),
            comments: CommentsApi::new(http.clone()),
            activity: ActivityApi::new(http.clone()),
            auth: AuthApi::new(http.clone()),
            http,
            cache: QueryCache::new(),
            store: TaskStore::new(),
            task_list_ttl: settings.task_list_ttl,
            detail_ttl: settings.detail_ttl,
            search_debounce: settings.search_debounce,
            toggle_window: settings.toggle_window,
            notify_poll_interval: settings.notify_poll_interval,
        })
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }

    pub async fn health_check(&self) -> Result<()> {
        self.http.health_check().await
    }

    /// Debouncer for a search input, armed with the configured delay.
    pub fn search_debouncer(&self) -> (SearchDebouncer, watch::Receiver<String>) {
        SearchDebouncer::new(self.search_debounce)
    }

    /// Click disambiguator for one task control, armed with the
    /// configured window.
    pub fn status_toggle(&self) -> (StatusToggle, mpsc::UnboundedReceiver<ToggleAction>) {
        StatusToggle::new(self.toggle_window)
    }

    // =========================================================================
    // Cached reads
    // =========================================================================

    /// Filtered/sorted/paged task list, served from cache while fresh.
    pub async fn list_tasks(&self, query: &TaskQuery) -> ApiResult<TaskListResponse> {
        let api = self.tasks.clone();
        let query_owned = query.clone();
        self.cache
            .fetch_with(&keys::task_list(query), self.task_list_ttl, move || {
                async move { api.list(&query_owned).await }
            })
            .await
    }

    pub async fn get_task(&self, task_id: i64) -> ApiResult<Task> {
        let api = self.tasks.clone();
        self.cache
            .fetch_with(&keys::task(task_id), self.detail_ttl, move || async move {
                api.get(task_id).await
            })
            .await
    }

    pub async fn list_labels(&self) -> ApiResult<Vec<Label>> {
        let api = self.labels.clone();
        self.cache
            .fetch_with(&keys::labels(), self.detail_ttl, move || async move {
                api.list().await
            })
            .await
    }

    pub async fn comments_for(&self, task_id: i64) -> ApiResult<Vec<Comment>> {
        let api = self.comments.clone();
        self.cache
            .fetch_with(&keys::comments(task_id), self.detail_ttl, move || {
                async move { api.for_task(task_id).await }
            })
            .await
    }

    pub async fn list_activity(&self) -> ApiResult<Vec<ActivityLog>> {
        let api = self.activity.clone();
        self.cache
            .fetch_with(&keys::activity(), self.detail_ttl, move || async move {
                api.list().await
            })
            .await
    }

    // =========================================================================
    // Task mutations
    //
    // Local state changes and cache invalidation happen strictly after
    // the backend confirms the mutation; a failed request leaves both
    // untouched.
    // =========================================================================

    pub async fn create_task(&self, req: &CreateTaskRequest) -> ApiResult<Task> {
        let task = self.tasks.create(req).await?;
        self.store.add_task(task.clone());
        self.cache.invalidate_prefix(keys::tasks_prefix());
        Ok(task)
    }

    pub async fn update_task(&self, task_id: i64, req: &UpdateTaskRequest) -> ApiResult<Task> {
        let task = self.tasks.update(task_id, req).await?;
        self.store.update_task(task_id, &TaskPatch::from_task(&task));
        self.cache.invalidate_prefix(keys::tasks_prefix());
        Ok(task)
    }

    pub async fn delete_task(&self, task_id: i64) -> ApiResult<Task> {
        let task = self.tasks.delete(task_id).await?;
        self.store.remove_task(task_id);
        self.cache.invalidate_prefix(keys::tasks_prefix());
        Ok(task)
    }

    pub async fn restore_task(&self, task_id: i64) -> ApiResult<Task> {
        let task = self.tasks.restore(task_id).await?;
        self.store.add_task(task.clone());
        self.cache.invalidate_prefix(keys::tasks_prefix());
        Ok(task)
    }

    /// Apply a decided quick-toggle action as a status mutation.
    pub async fn apply_toggle(&self, task_id: i64, action: ToggleAction) -> ApiResult<Task> {
        let status = match action {
            ToggleAction::MarkComplete => TaskStatus::Completed,
            ToggleAction::MarkIncomplete => TaskStatus::Todo,
        };
        self.update_task(task_id, &UpdateTaskRequest::status(status))
            .await
    }

    // =========================================================================
    // Label mutations (tasks embed labels, so task caches go stale too)
    // =========================================================================

    pub async fn create_label(&self, req: &CreateLabelRequest) -> ApiResult<Label> {
        let label = self.labels.create(req).await?;
        self.cache.invalidate_prefix(keys::labels_prefix());
        Ok(label)
    }

    pub async fn update_label(&self, label_id: i64, req: &UpdateLabelRequest) -> ApiResult<Label> {
        let label = self.labels.update(label_id, req).await?;
        self.cache.invalidate_prefix(keys::labels_prefix());
        self.cache.invalidate_prefix(keys::tasks_prefix());
        Ok(label)
    }

    pub async fn delete_label(&self, label_id: i64) -> ApiResult<()> {
        self.labels.delete(label_id).await?;
        self.cache.invalidate_prefix(keys::labels_prefix());
        self.cache.invalidate_prefix(keys::tasks_prefix());
        Ok(())
    }

    // =========================================================================
    // Comment mutations (tasks embed comments; only the owning task's
    // detail goes stale, never its other fields)
    // =========================================================================

    pub async fn add_comment(&self, req: &CreateCommentRequest) -> ApiResult<Comment> {
        let comment = self.comments.create(req).await?;
        self.cache.invalidate_prefix(&keys::comments(comment.task_id));
        self.cache.invalidate_prefix(&keys::task(comment.task_id));
        Ok(comment)
    }

    pub async fn delete_comment(&self, task_id: i64, comment_id: i64) -> ApiResult<()> {
        self.comments.delete(comment_id).await?;
        self.cache.invalidate_prefix(&keys::comments(task_id));
        self.cache.invalidate_prefix(&keys::task(task_id));
        Ok(())
    }

    // =========================================================================
    // Activity mutations
    // =========================================================================

    pub async fn delete_activity(&self, activity_id: i64) -> ApiResult<()> {
        self.activity.delete(activity_id).await?;
        self.cache.invalidate_prefix(keys::activity_prefix());
        Ok(())
    }

    // =========================================================================
    // Background services
    // =========================================================================

    /// Spawn the due-task notification loop against this client's store.
    /// Returns the shutdown switch; flip it to `true` to stop the loop.
    pub fn spawn_due_task_notifier(&self, sink: Arc<dyn AlertSink>) -> watch::Sender<bool> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let notifier =
            DueTaskNotifier::new(self.store.clone(), sink, self.notify_poll_interval);
        tokio::spawn(notifier.run(shutdown_rx));
        shutdown_tx
    }
}
