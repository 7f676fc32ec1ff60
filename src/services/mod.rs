//! Client-side service layer
//!
//! The query cache, the state store, the interaction timers, and the
//! due-task notification scheduler.

pub mod cache;
pub mod debounce;
pub mod notifications;
pub mod store;
pub mod toggle;

pub use cache::QueryCache;
pub use debounce::SearchDebouncer;
pub use notifications::{AlertSink, DueTaskNotifier};
pub use store::{FilterPatch, StoreSnapshot, TaskFilters, TaskPatch, TaskStore};
pub use toggle::{StatusToggle, ToggleAction};
