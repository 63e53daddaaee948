//! Integration tests for the REST client against the mock backend.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::json;
use tokio::time::timeout;

use common::{GARBLED_BODY, TEST_TIMEOUT, TOKEN, USER_ID, start_server};
use fitness_agent::api::{ApiClient, FitnessBackend};
use fitness_agent::auth::{NoToken, StaticToken, TokenSource};
use fitness_agent::config::BackendConfig;
use fitness_agent::error::ApiError;
use fitness_agent::flows::submit_goal;
use fitness_agent::models::{GoalCreate, GoalType, ProfileUpsert, TaskCreate};
use fitness_agent::retry::RetryPolicy;

fn client_with(base: &str, tokens: Arc<dyn TokenSource>) -> ApiClient {
    ApiClient::new(&BackendConfig::with_base_url(base).unwrap(), tokens).unwrap()
}

fn client(base: &str) -> ApiClient {
    client_with(base, Arc::new(StaticToken::new(TOKEN, USER_ID)))
}

#[tokio::test]
async fn missing_token_fails_before_any_request() {
    timeout(TEST_TIMEOUT, async {
        let (base, state) = start_server().await;
        let client = client_with(&base, Arc::new(NoToken));

        assert!(matches!(client.list_goals().await, Err(ApiError::MissingToken)));
        assert!(matches!(client.coach_chat("hi", None).await, Err(ApiError::MissingToken)));
        assert!(matches!(client.fetch_my_profile().await, Err(ApiError::MissingToken)));
        assert_eq!(state.requests.load(Ordering::SeqCst), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rejected_token_surfaces_body_verbatim() {
    timeout(TEST_TIMEOUT, async {
        let (base, _state) = start_server().await;
        let client = client_with(&base, Arc::new(StaticToken::new("stale", USER_ID)));

        let err = client.list_goals().await.unwrap_err();
        assert_eq!(err.status(), Some(reqwest::StatusCode::UNAUTHORIZED));
        assert_eq!(err.to_string(), r#"{"detail":"Missing bearer token"}"#);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn malformed_success_body_is_decode_error_with_body() {
    timeout(TEST_TIMEOUT, async {
        let (base, state) = start_server().await;
        state.garble_goals.store(true, Ordering::SeqCst);

        let err = client(&base).list_goals().await.unwrap_err();
        match err {
            ApiError::Decode { body, .. } => assert_eq!(body, GARBLED_BODY),
            other => panic!("expected decode error, got {other:?}"),
        }
        assert_eq!(state.requests.load(Ordering::SeqCst), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    timeout(TEST_TIMEOUT, async {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = client(&format!("http://127.0.0.1:{port}")).list_goals().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
        assert_eq!(err.status(), None);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn goal_lifecycle() {
    timeout(TEST_TIMEOUT, async {
        let (base, _state) = start_server().await;
        let client = client(&base);

        assert!(client.list_goals().await.unwrap().is_empty());

        let create = GoalCreate::new(GoalType::WeightLoss)
            .with_target_value(70.0)
            .with_target_date(NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        let goal = client.create_goal(&create).await.unwrap();
        assert_eq!(goal.goal_type, GoalType::WeightLoss);
        assert_eq!(goal.target_value, Some(70.0));
        assert_eq!(goal.target_date, NaiveDate::from_ymd_opt(2025, 12, 1));
        assert_eq!(goal.user_id, USER_ID);

        let goals = client.list_goals().await.unwrap();
        assert_eq!(goals, vec![goal.clone()]);

        client.delete_goal(&goal.id).await.unwrap();
        assert!(client.list_goals().await.unwrap().is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn deleting_missing_goal_surfaces_body_verbatim() {
    timeout(TEST_TIMEOUT, async {
        let (base, _state) = start_server().await;
        let err = client(&base).delete_goal("nope").await.unwrap_err();

        assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
        assert_eq!(err.to_string(), r#"{"detail":"Goal not found"}"#);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn submit_goal_returns_tasks_generated_within_budget() {
    timeout(TEST_TIMEOUT, async {
        let (base, state) = start_server().await;
        state.tasks_after_calls.store(3, Ordering::SeqCst);
        let client = client(&base);

        let policy = RetryPolicy::new(10, Duration::from_millis(20));
        let setup = submit_goal(&client, &GoalCreate::new(GoalType::Endurance), policy)
            .await
            .unwrap();

        assert!(setup.tasks_generated);
        assert_eq!(setup.attempts, 3);
        assert_eq!(setup.tasks.len(), 1);
        assert_eq!(setup.tasks[0].goal_id.as_deref(), Some(setup.goal.id.as_str()));
        assert!(setup.tasks[0].due_at.is_some());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn submit_goal_gives_empty_tasks_when_budget_runs_out() {
    timeout(TEST_TIMEOUT, async {
        let (base, state) = start_server().await;
        let client = client(&base);

        let policy = RetryPolicy::new(4, Duration::from_millis(10));
        let setup = submit_goal(&client, &GoalCreate::new(GoalType::MuscleGain), policy)
            .await
            .unwrap();

        assert!(!setup.tasks_generated);
        assert!(setup.tasks.is_empty());
        assert_eq!(state.task_list_calls.load(Ordering::SeqCst), 4);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn manual_task_creation() {
    timeout(TEST_TIMEOUT, async {
        let (base, _state) = start_server().await;
        let task = client(&base)
            .create_task(
                &TaskCreate::new("Stretch")
                    .for_goal("goal-9")
                    .with_description("10 minutes"),
            )
            .await
            .unwrap();

        assert_eq!(task.title, "Stretch");
        assert_eq!(task.goal_id.as_deref(), Some("goal-9"));
        assert_eq!(task.description.as_deref(), Some("10 minutes"));
        assert_eq!(task.status, "pending");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn coach_chat_sends_user_id_and_goal() {
    timeout(TEST_TIMEOUT, async {
        let (base, state) = start_server().await;
        let reply = client(&base).coach_chat("Ready to run", Some("goal-1")).await.unwrap();

        assert_eq!(reply.content, "You said: Ready to run");
        let sent = state.last_chat.lock().unwrap().clone().unwrap();
        assert_eq!(sent, json!({"user_id": USER_ID, "message": "Ready to run", "goal_id": "goal-1"}));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn history_passes_query_and_flattens_content() {
    timeout(TEST_TIMEOUT, async {
        let (base, state) = start_server().await;
        let client = client(&base);

        let history = client.fetch_chat_history(200, Some("goal-1")).await.unwrap();
        let query = state.last_history_query.lock().unwrap().clone().unwrap();
        assert_eq!(query.get("limit").map(String::as_str), Some("200"));
        assert_eq!(query.get("goal_id").map(String::as_str), Some("goal-1"));

        let messages = history.to_chat_messages();
        let texts: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(texts, ["Plan my week", "Three runs and two rest days."]);

        client.fetch_chat_history(50, None).await.unwrap();
        let query = state.last_history_query.lock().unwrap().clone().unwrap();
        assert_eq!(query.get("limit").map(String::as_str), Some("50"));
        assert!(!query.contains_key("goal_id"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn profile_upsert_then_fetch_round_trips() {
    timeout(TEST_TIMEOUT, async {
        let (base, _state) = start_server().await;
        let client = client(&base);

        assert_eq!(client.fetch_my_profile().await.unwrap(), None);

        let upsert = ProfileUpsert {
            sex: Some("female".into()),
            dob: NaiveDate::from_ymd_opt(1992, 4, 9),
            height_cm: Some(168.0),
            weight_kg: Some(61.5),
            unit_pref: Some("metric".into()),
            activity_level: Some("active".into()),
            fitness_level: Some("intermediate".into()),
            timezone: Some("Europe/Lisbon".into()),
            ..ProfileUpsert::default()
        };
        let saved = client.upsert_profile(&upsert).await.unwrap();
        let fetched = client.fetch_my_profile().await.unwrap().unwrap();

        assert_eq!(fetched, saved);
        assert_eq!(fetched.to_upsert(), upsert);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn client_works_through_the_backend_trait() {
    timeout(TEST_TIMEOUT, async {
        let (base, _state) = start_server().await;
        let backend: Arc<dyn FitnessBackend> = Arc::new(client(&base));

        let goal = backend.create_goal(&GoalCreate::new(GoalType::Endurance)).await.unwrap();
        assert!(backend.list_goal_tasks(&goal.id).await.unwrap().is_empty());
        assert_eq!(backend.list_goals().await.unwrap().len(), 1);
    })
    .await
    .expect("test timed out");
}
