//! taskman-client
//!
//! Typed async client for the taskman REST API. The crate covers the
//! whole stack below the view layer:
//!
//! - [`http::HttpClient`]: bearer auth, https enforcement, and the
//!   refresh-on-401 retry-once cycle
//! - [`api`]: typed resource clients for tasks, labels, comments,
//!   activity, and auth
//! - [`services::QueryCache`]: TTL cache with prefix invalidation and
//!   stale-while-revalidate
//! - [`services::TaskStore`]: snapshot state container with subscriber
//!   notification
//! - [`services::StatusToggle`] / [`services::SearchDebouncer`]:
//!   interaction timers
//! - [`services::DueTaskNotifier`]: overdue-task alert scheduler
//! - [`TaskmanClient`]: one facade sequencing reads through the cache
//!   and mutations ahead of invalidation

pub mod api;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod logging;
pub mod services;

pub use client::TaskmanClient;
pub use config::{Environment, Settings};
pub use error::{ApiError, ApiResult};
