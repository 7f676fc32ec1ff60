//! Label domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label entity. Name uniqueness per owner is enforced server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Label {
    pub id: i64,
    pub name: String,
    /// Color as a string encoding (e.g. "#ef4444")
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for creating a label
#[derive(Debug, Clone, Serialize)]
pub struct CreateLabelRequest {
    pub name: String,
    pub color: String,
}

/// Request DTO for updating a label
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateLabelRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}
