//! Task resource client

use tracing::instrument;

use crate::domain::tasks::{
    CreateTaskRequest, Task, TaskListResponse, TaskQuery, UpdateTaskRequest,
};
use crate::error::ApiResult;
use crate::http::HttpClient;

#[derive(Clone)]
pub struct TasksApi {
    http: HttpClient,
}

impl TasksApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// GET /tasks/ with filter, sort, and paging parameters.
    #[instrument(skip(self, query))]
    pub async fn list(&self, query: &TaskQuery) -> ApiResult<TaskListResponse> {
        self.http
            .get_with_query("/tasks/", &query.to_query_pairs())
            .await
    }

    pub async fn get(&self, task_id: i64) -> ApiResult<Task> {
        self.http.get(&format!("/tasks/{task_id}")).await
    }

    #[instrument(skip(self, req), fields(title = %req.title))]
    pub async fn create(&self, req: &CreateTaskRequest) -> ApiResult<Task> {
        self.http.post("/tasks/", req).await
    }

    #[instrument(skip(self, req))]
    pub async fn update(&self, task_id: i64, req: &UpdateTaskRequest) -> ApiResult<Task> {
        self.http.put(&format!("/tasks/{task_id}"), req).await
    }

    /// Soft delete; the backend echoes the deleted task.
    #[instrument(skip(self))]
    pub async fn delete(&self, task_id: i64) -> ApiResult<Task> {
        self.http.delete(&format!("/tasks/{task_id}")).await
    }

    #[instrument(skip(self))]
    pub async fn restore(&self, task_id: i64) -> ApiResult<Task> {
        self.http
            .post_empty(&format!("/tasks/{task_id}/restore"))
            .await
    }
}
