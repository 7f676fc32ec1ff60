//! Activity log domain types
//!
//! Append-only records generated server-side as task mutations happen.
//! The client only lists and deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activity log entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityLog {
    pub id: i64,
    pub action: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
}
