//! Label resource client

use tracing::instrument;

use crate::domain::labels::{CreateLabelRequest, Label, UpdateLabelRequest};
use crate::error::ApiResult;
use crate::http::HttpClient;

#[derive(Clone)]
pub struct LabelsApi {
    http: HttpClient,
}

impl LabelsApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> ApiResult<Vec<Label>> {
        self.http.get("/labels/").await
    }

    #[instrument(skip(self, req), fields(name = %req.name))]
    pub async fn create(&self, req: &CreateLabelRequest) -> ApiResult<Label> {
        self.http.post("/labels/", req).await
    }

    #[instrument(skip(self, req))]
    pub async fn update(&self, label_id: i64, req: &UpdateLabelRequest) -> ApiResult<Label> {
        self.http.put(&format!("/labels/{label_id}"), req).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, label_id: i64) -> ApiResult<()> {
        self.http
            .delete_no_content(&format!("/labels/{label_id}"))
            .await
    }
}
