//! Facade-level flows: cache invalidation after mutations, prepend
//! behavior, and comment deletion leaving the task intact.

mod common;

use std::time::Duration;

use common::*;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskman_client::domain::{
    CreateCommentRequest, CreateTaskRequest, TaskPriority, TaskQuery, TaskStatus,
};
use taskman_client::http::SessionStore;
use taskman_client::services::ToggleAction;
use taskman_client::TaskmanClient;

async fn client_for(server: &MockServer) -> TaskmanClient {
    let dir = tempfile::tempdir().unwrap();
    let session = seeded_session(dir.path(), "access-1", "refresh-1");
    TaskmanClient::with_session(&settings(&server.uri(), dir.path()), session).unwrap()
}

#[tokio::test]
async fn task_mutation_invalidates_cached_lists() {
    let server = MockServer::start().await;
    let client = client_for(&server).await;

    // Pre-mutation list, served exactly once; repeat reads must come
    // from cache
    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_list_json(vec![task_json(
            1, "existing", "todo", "medium",
        )])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    let query = TaskQuery::default();
    let first = client.list_tasks(&query).await.unwrap();
    let cached = client.list_tasks(&query).await.unwrap();
    assert_eq!(first.total, 1);
    assert_eq!(cached.total, 1);

    Mock::given(method("POST"))
        .and(path("/tasks/"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(task_json(2, "new task", "todo", "high")),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Post-mutation list
    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_list_json(vec![
            task_json(2, "new task", "todo", "high"),
            task_json(1, "existing", "todo", "medium"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    client
        .create_task(&CreateTaskRequest {
            title: "new task".into(),
            priority: Some(TaskPriority::High),
            ..Default::default()
        })
        .await
        .unwrap();

    // The same key now refetches instead of serving the stale value
    let refetched = client.list_tasks(&query).await.unwrap();
    assert_eq!(refetched.total, 2);
    assert_eq!(refetched.tasks[0].id, 2);
}

#[tokio::test]
async fn created_task_shows_first_unfiltered_and_in_matching_filter() {
    let server = MockServer::start().await;
    let client = client_for(&server).await;

    Mock::given(method("POST"))
        .and(path("/tasks/"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(task_json(7, "Ship release", "todo", "high")),
        )
        .mount(&server)
        .await;

    client.store().set_tasks(vec![
        serde_json::from_value(task_json(1, "older", "todo", "low")).unwrap(),
    ]);

    let created = client
        .create_task(&CreateTaskRequest {
            title: "Ship release".into(),
            status: Some(TaskStatus::Todo),
            priority: Some(TaskPriority::High),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.title, "Ship release");

    // Prepend: first in the store's unfiltered view
    let snapshot = client.store().snapshot();
    assert_eq!(snapshot.tasks.first().map(|t| t.id), Some(7));
    assert_eq!(snapshot.tasks.len(), 2);

    // And the backend's priority=high listing includes it
    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .and(query_param("priority", "high"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_list_json(vec![task_json(
            7,
            "Ship release",
            "todo",
            "high",
        )])))
        .expect(1)
        .mount(&server)
        .await;

    let filtered = client
        .list_tasks(&TaskQuery::with_priority(TaskPriority::High))
        .await
        .unwrap();
    assert_eq!(filtered.tasks.len(), 1);
    assert_eq!(filtered.tasks[0].title, "Ship release");
}

#[tokio::test]
async fn deleting_a_comment_refreshes_comments_but_not_task_fields() {
    let server = MockServer::start().await;
    let client = client_for(&server).await;

    // Initial comment list for task 1, served once
    Mock::given(method("GET"))
        .and(path("/comments/task/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            comment_json(5, 1, "first"),
            comment_json(6, 1, "second"),
        ])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    // Task detail is stable across the deletion
    Mock::given(method("GET"))
        .and(path("/tasks/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(task_json(1, "stable", "todo", "medium")),
        )
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/comments/5"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let before = client.comments_for(1).await.unwrap();
    let task_before = client.get_task(1).await.unwrap();
    assert_eq!(before.len(), 2);

    client.delete_comment(1, 5).await.unwrap();

    // Remaining comments after deletion
    Mock::given(method("GET"))
        .and(path("/comments/task/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([comment_json(6, 1, "second")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let after = client.comments_for(1).await.unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].id, 6);

    // Task detail was invalidated (refetched) but its fields are unchanged
    let task_after = client.get_task(1).await.unwrap();
    assert_eq!(task_after.title, task_before.title);
    assert_eq!(task_after.status, task_before.status);
    assert_eq!(task_after.updated_at, task_before.updated_at);
}

#[tokio::test]
async fn adding_a_comment_invalidates_the_owning_task_only() {
    let server = MockServer::start().await;
    let client = client_for(&server).await;

    Mock::given(method("GET"))
        .and(path("/comments/task/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    // Other task's cached comments must survive the mutation
    Mock::given(method("GET"))
        .and(path("/comments/task/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let _ = client.comments_for(2).await.unwrap();
    let _ = client.comments_for(3).await.unwrap();

    Mock::given(method("POST"))
        .and(path("/comments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(comment_json(9, 2, "hello")))
        .expect(1)
        .mount(&server)
        .await;

    client
        .add_comment(&CreateCommentRequest {
            content: "hello".into(),
            task_id: 2,
        })
        .await
        .unwrap();

    // Task 3's comments still come from cache (its GET mock expects 1 call)
    let _ = client.comments_for(3).await.unwrap();

    // Task 2's comments refetch
    Mock::given(method("GET"))
        .and(path("/comments/task/2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([comment_json(9, 2, "hello")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let comments = client.comments_for(2).await.unwrap();
    assert_eq!(comments.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn interaction_timers_use_the_configured_windows() {
    // No requests are issued; the constructor never touches the network
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = settings("http://127.0.0.1:9", dir.path());
    cfg.search_debounce = Duration::from_millis(100);
    cfg.toggle_window = Duration::from_millis(50);
    let client = TaskmanClient::with_session(&cfg, SessionStore::open(dir.path())).unwrap();

    // Well under the defaults, well over the configured windows
    let (debouncer, mut search_rx) = client.search_debouncer();
    debouncer.input("abc");
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(*search_rx.borrow_and_update(), "abc");

    let (toggle, mut toggle_rx) = client.status_toggle();
    toggle.click();
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(toggle_rx.try_recv().unwrap(), ToggleAction::MarkComplete);
}

#[tokio::test]
async fn failed_mutation_leaves_store_and_cache_untouched() {
    let server = MockServer::start().await;
    let client = client_for(&server).await;

    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_list_json(vec![task_json(
            1, "only", "todo", "low",
        )])))
        .expect(1)
        .mount(&server)
        .await;

    let query = TaskQuery::default();
    let _ = client.list_tasks(&query).await.unwrap();

    Mock::given(method("POST"))
        .and(path("/tasks/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({"detail": "bad title"})),
        )
        .mount(&server)
        .await;

    let err = client
        .create_task(&CreateTaskRequest {
            title: String::new(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));

    // No local write, no invalidation: the list still serves from cache
    // (the GET mock expects exactly one call)
    assert!(client.store().snapshot().tasks.is_empty());
    let cached = client.list_tasks(&query).await.unwrap();
    assert_eq!(cached.total, 1);
}
