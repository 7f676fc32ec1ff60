//! Activity log resource client

use tracing::instrument;

use crate::domain::activity::ActivityLog;
use crate::error::ApiResult;
use crate::http::HttpClient;

#[derive(Clone)]
pub struct ActivityApi {
    http: HttpClient,
}

impl ActivityApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> ApiResult<Vec<ActivityLog>> {
        self.http.get("/activity/").await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, activity_id: i64) -> ApiResult<()> {
        self.http
            .delete_no_content(&format!("/activity/{activity_id}"))
            .await
    }
}
