//! HTTP transport layer
//!
//! `SessionStore` persists the token pair and user between runs;
//! `HttpClient` is the adapter every resource client goes through.

pub mod client;
pub mod session;

pub use client::HttpClient;
pub use session::{Session, SessionStore};
