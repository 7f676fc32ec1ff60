//! Resource clients
//!
//! Typed request builders, one per backend resource. These map methods to
//! endpoints and shapes and nothing else; caching, state, and sequencing
//! live above them.

pub mod activity;
pub mod auth;
pub mod comments;
pub mod labels;
pub mod tasks;

pub use activity::ActivityApi;
pub use auth::AuthApi;
pub use comments::CommentsApi;
pub use labels::LabelsApi;
pub use tasks::TasksApi;
