//! Shared fixtures for the wiremock-backed tests.

#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use serde_json::{json, Value};
use taskman_client::http::{Session, SessionStore};
use taskman_client::{Environment, Settings};

pub fn settings(base_url: &str, session_dir: &Path) -> Settings {
    Settings {
        env: Environment::Dev,
        api_base_url: base_url.to_string(),
        request_timeout: Duration::from_secs(5),
        session_dir: session_dir.to_path_buf(),
        task_list_ttl: Duration::from_secs(300),
        detail_ttl: Duration::from_secs(60),
        search_debounce: Duration::from_millis(800),
        toggle_window: Duration::from_millis(300),
        notify_poll_interval: Duration::from_secs(60),
    }
}

pub fn seeded_session(dir: &Path, access: &str, refresh: &str) -> SessionStore {
    let store = SessionStore::open(dir);
    store
        .store(Session {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
            user: None,
        })
        .unwrap();
    store
}

pub fn user_json() -> Value {
    json!({
        "id": 1,
        "email": "alice@example.com",
        "username": "alice",
        "full_name": "Alice Doe",
        "role": "user",
        "is_active": true
    })
}

pub fn auth_json(access: &str, refresh: &str) -> Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "token_type": "bearer",
        "user": user_json()
    })
}

pub fn task_json(id: i64, title: &str, status: &str, priority: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": null,
        "status": status,
        "priority": priority,
        "due_date": null,
        "is_deleted": false,
        "created_at": "2026-08-01T12:00:00Z",
        "updated_at": "2026-08-01T12:00:00Z",
        "owner_id": 1,
        "labels": [],
        "comments": [],
        "activity_logs": []
    })
}

pub fn task_list_json(tasks: Vec<Value>) -> Value {
    let total = tasks.len();
    json!({
        "tasks": tasks,
        "total": total,
        "page": 1,
        "page_size": 20,
        "total_pages": 1
    })
}

pub fn comment_json(id: i64, task_id: i64, content: &str) -> Value {
    json!({
        "id": id,
        "content": content,
        "task_id": task_id,
        "user_id": 1,
        "created_at": "2026-08-01T12:00:00Z"
    })
}
