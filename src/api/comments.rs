//! Comment resource client

use tracing::instrument;

use crate::domain::comments::{Comment, CreateCommentRequest};
use crate::error::ApiResult;
use crate::http::HttpClient;

#[derive(Clone)]
pub struct CommentsApi {
    http: HttpClient,
}

impl CommentsApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn for_task(&self, task_id: i64) -> ApiResult<Vec<Comment>> {
        self.http.get(&format!("/comments/task/{task_id}")).await
    }

    #[instrument(skip(self, req), fields(task_id = req.task_id))]
    pub async fn create(&self, req: &CreateCommentRequest) -> ApiResult<Comment> {
        self.http.post("/comments", req).await
    }

    /// The backend answers 204 on comment deletion.
    #[instrument(skip(self))]
    pub async fn delete(&self, comment_id: i64) -> ApiResult<()> {
        self.http
            .delete_no_content(&format!("/comments/{comment_id}"))
            .await
    }
}
