//! Comment domain types
//!
//! Comments are immutable once created; the API offers create and delete
//! only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub task_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for creating a comment
#[derive(Debug, Clone, Serialize)]
pub struct CreateCommentRequest {
    pub content: String,
    pub task_id: i64,
}
