//! Mock fitness backend shared by the integration tests.
//!
//! An Axum server on a random port that mimics the backend's routes with
//! in-memory storage.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Maximum time any test is allowed to run before we consider it hung.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

pub const TOKEN: &str = "test-token";
pub const USER_ID: &str = "user-1";

/// In-memory stand-in for the backend's storage.
#[derive(Default)]
pub struct Backend {
    pub requests: AtomicU32,
    pub goals: Mutex<Vec<Value>>,
    /// Task-list calls per goal before generated tasks appear. Zero: never.
    pub tasks_after_calls: AtomicU32,
    pub task_list_calls: AtomicU32,
    pub profile: Mutex<Option<Value>>,
    pub last_chat: Mutex<Option<Value>>,
    pub last_history_query: Mutex<Option<HashMap<String, String>>>,
    /// When set, `GET /goals` answers 200 with `GARBLED_BODY`.
    pub garble_goals: AtomicBool,
}

/// A 2xx body that is not valid JSON.
pub const GARBLED_BODY: &str = r#"[{"id": "goal-1", "type": "#;

pub type Shared = Arc<Backend>;

fn authorized(state: &Backend, headers: &HeaderMap) -> Result<(), Response> {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let expected = format!("Bearer {TOKEN}");
    let ok = headers.get("authorization").and_then(|v| v.to_str().ok()) == Some(expected.as_str());
    if ok {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, r#"{"detail":"Missing bearer token"}"#).into_response())
    }
}

async fn list_goals(State(s): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(r) = authorized(&s, &headers) {
        return r;
    }
    if s.garble_goals.load(Ordering::SeqCst) {
        return (StatusCode::OK, GARBLED_BODY).into_response();
    }
    Json(Value::Array(s.goals.lock().unwrap().clone())).into_response()
}

async fn create_goal(State(s): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = authorized(&s, &headers) {
        return r;
    }
    let mut goals = s.goals.lock().unwrap();
    let goal = json!({
        "id": format!("goal-{}", goals.len() + 1),
        "user_id": USER_ID,
        "type": body["type"],
        "target_value": body.get("target_value").cloned().unwrap_or(Value::Null),
        "target_date": body.get("target_date").cloned().unwrap_or(Value::Null),
        "status": "active",
        // naive timestamp, as the backend's in-memory fallback emits
        "created_at": "2025-08-13T10:00:00.123456"
    });
    goals.push(goal.clone());
    Json(goal).into_response()
}

async fn delete_goal(State(s): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Err(r) = authorized(&s, &headers) {
        return r;
    }
    let mut goals = s.goals.lock().unwrap();
    let before = goals.len();
    goals.retain(|g| g["id"] != id.as_str());
    if goals.len() == before {
        return (StatusCode::NOT_FOUND, r#"{"detail":"Goal not found"}"#).into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn goal_tasks(State(s): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Err(r) = authorized(&s, &headers) {
        return r;
    }
    let call = s.task_list_calls.fetch_add(1, Ordering::SeqCst) + 1;
    let after = s.tasks_after_calls.load(Ordering::SeqCst);
    if after == 0 || call < after {
        return Json(json!([])).into_response();
    }
    Json(json!([
        {
            "id": "task-1",
            "user_id": USER_ID,
            "goal_id": id,
            "title": "Easy 20 minute run",
            "due_at": "2025-08-14T07:00:00+00:00",
            "status": "pending",
            "created_at": "2025-08-13T10:00:01+00:00"
        }
    ]))
    .into_response()
}

async fn create_task(State(s): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = authorized(&s, &headers) {
        return r;
    }
    Json(json!({
        "id": "task-manual",
        "user_id": USER_ID,
        "goal_id": body.get("goal_id").cloned().unwrap_or(Value::Null),
        "title": body["title"],
        "description": body.get("description").cloned().unwrap_or(Value::Null),
        "due_at": body.get("due_at").cloned().unwrap_or(Value::Null),
        "created_at": "2025-08-13T10:05:00Z"
    }))
    .into_response()
}

async fn coach_chat(State(s): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = authorized(&s, &headers) {
        return r;
    }
    let reply = format!("You said: {}", body["message"].as_str().unwrap_or_default());
    *s.last_chat.lock().unwrap() = Some(body);
    Json(json!({"role": "assistant", "content": reply})).into_response()
}

async fn coach_history(
    State(s): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(r) = authorized(&s, &headers) {
        return r;
    }
    *s.last_history_query.lock().unwrap() = Some(query);
    Json(json!({
        "conversation_id": "conv-1",
        "messages": [
            {"role": "user", "content": {"text": "Plan my week"}, "created_at": "2025-08-13T09:00:00"},
            {"role": "system", "content": {"text": "internal"}},
            {"role": "assistant", "content": {"type": "text", "text": "Three runs and two rest days."}}
        ]
    }))
    .into_response()
}

async fn my_profile(State(s): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(r) = authorized(&s, &headers) {
        return r;
    }
    Json(s.profile.lock().unwrap().clone().unwrap_or(Value::Null)).into_response()
}

async fn upsert_profile(State(s): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = authorized(&s, &headers) {
        return r;
    }
    let mut profile = s.profile.lock().unwrap();
    let mut stored = profile.clone().unwrap_or_else(|| json!({"id": USER_ID}));
    if let (Some(stored), Some(update)) = (stored.as_object_mut(), body.as_object()) {
        for (k, v) in update {
            stored.insert(k.clone(), v.clone());
        }
    }
    *profile = Some(stored.clone());
    Json(stored).into_response()
}

/// Start the mock backend on a random port, return (base URL, state).
pub async fn start_server() -> (String, Shared) {
    let state: Shared = Arc::default();
    let app = Router::new()
        .route("/goals", get(list_goals).post(create_goal))
        .route("/goals/{id}", delete(delete_goal))
        .route("/goals/{id}/tasks", get(goal_tasks))
        .route("/tasks", post(create_task))
        .route("/coach/chat", post(coach_chat))
        .route("/coach/history", get(coach_history))
        .route("/profile/me", get(my_profile))
        .route("/profile", post(upsert_profile))
        .with_state(Arc::clone(&state));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://127.0.0.1:{port}"), state)
}
