//! Domain types and DTOs
//!
//! Wire-level data structures for taskman entities, matching the backend's
//! JSON contract exactly.

pub mod activity;
pub mod auth;
pub mod comments;
pub mod labels;
pub mod tasks;

// Re-export commonly used types
pub use activity::ActivityLog;
pub use auth::{AuthResponse, SignupRequest, User};
pub use comments::{Comment, CreateCommentRequest};
pub use labels::{CreateLabelRequest, Label, UpdateLabelRequest};
pub use tasks::{
    CreateTaskRequest, SortKey, SortOrder, Task, TaskListResponse, TaskPriority, TaskQuery,
    TaskStatus, UpdateTaskRequest,
};
