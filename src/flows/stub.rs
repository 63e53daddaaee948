//! Scripted in-memory backend for flow tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;

use crate::api::FitnessBackend;
use crate::error::ApiError;
use crate::models::{
    ChatHistory, CoachReply, Goal, GoalCreate, Profile, ProfileUpsert, TaskCreate, TaskItem,
};

pub(crate) fn status_error(status: StatusCode, body: &str) -> ApiError {
    ApiError::Status {
        status,
        body: body.to_string(),
    }
}

pub(crate) fn goal(id: &str, create: &GoalCreate) -> Goal {
    Goal {
        id: id.to_string(),
        user_id: "u-1".to_string(),
        goal_type: create.goal_type,
        target_value: create.target_value,
        target_date: create.target_date,
        status: "active".to_string(),
        created_at: Utc::now(),
    }
}

pub(crate) fn task(goal_id: &str, title: &str) -> TaskItem {
    TaskItem {
        id: format!("t-{title}"),
        user_id: "u-1".to_string(),
        goal_id: Some(goal_id.to_string()),
        title: title.to_string(),
        description: None,
        due_at: None,
        status: "pending".to_string(),
        calendar_event_id: None,
        created_at: Utc::now(),
    }
}

/// Each field scripts one endpoint; counters record how often it was hit.
#[derive(Default)]
pub(crate) struct StubBackend {
    pub profile: Mutex<Option<Profile>>,
    pub profile_fails: AtomicBool,
    pub goals: Mutex<Vec<Goal>>,
    pub goals_fail: AtomicBool,
    pub create_goal_fails: AtomicBool,
    /// Tasks show up from this list call on (1-based). Zero means never.
    pub tasks_ready_on_call: AtomicU32,
    /// List calls before this one (1-based) fail instead of returning empty.
    pub task_errors_until_call: AtomicU32,
    pub task_list_calls: AtomicU32,
    pub upserts: Mutex<Vec<ProfileUpsert>>,
    pub upsert_fails: AtomicBool,
    pub history: Mutex<ChatHistory>,
    pub history_limits: Mutex<Vec<u32>>,
    pub chat_fails: AtomicBool,
    pub chats: Mutex<Vec<(String, Option<String>)>>,
}

#[async_trait]
impl FitnessBackend for StubBackend {
    async fn list_goals(&self) -> Result<Vec<Goal>, ApiError> {
        if self.goals_fail.load(Ordering::SeqCst) {
            return Err(status_error(StatusCode::INTERNAL_SERVER_ERROR, "goals down"));
        }
        Ok(self.goals.lock().unwrap().clone())
    }

    async fn create_goal(&self, create: &GoalCreate) -> Result<Goal, ApiError> {
        if self.create_goal_fails.load(Ordering::SeqCst) {
            return Err(status_error(StatusCode::BAD_REQUEST, r#"{"detail":"bad goal"}"#));
        }
        let goal = goal("g-1", create);
        self.goals.lock().unwrap().push(goal.clone());
        Ok(goal)
    }

    async fn delete_goal(&self, goal_id: &str) -> Result<(), ApiError> {
        let mut goals = self.goals.lock().unwrap();
        let before = goals.len();
        goals.retain(|g| g.id != goal_id);
        if goals.len() == before {
            return Err(status_error(StatusCode::NOT_FOUND, r#"{"detail":"Goal not found"}"#));
        }
        Ok(())
    }

    async fn list_goal_tasks(&self, goal_id: &str) -> Result<Vec<TaskItem>, ApiError> {
        let call = self.task_list_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call < self.task_errors_until_call.load(Ordering::SeqCst) {
            return Err(status_error(StatusCode::SERVICE_UNAVAILABLE, "busy"));
        }
        let ready_on = self.tasks_ready_on_call.load(Ordering::SeqCst);
        if ready_on != 0 && call >= ready_on {
            Ok(vec![task(goal_id, "walk"), task(goal_id, "stretch")])
        } else {
            Ok(Vec::new())
        }
    }

    async fn create_task(&self, create: &TaskCreate) -> Result<TaskItem, ApiError> {
        let mut item = task(create.goal_id.as_deref().unwrap_or_default(), &create.title);
        item.goal_id = create.goal_id.clone();
        item.description = create.description.clone();
        item.due_at = create.due_at;
        Ok(item)
    }

    async fn coach_chat(&self, message: &str, goal_id: Option<&str>) -> Result<CoachReply, ApiError> {
        self.chats
            .lock()
            .unwrap()
            .push((message.to_string(), goal_id.map(str::to_string)));
        if self.chat_fails.load(Ordering::SeqCst) {
            return Err(status_error(StatusCode::BAD_GATEWAY, "coach unavailable"));
        }
        Ok(CoachReply {
            role: "assistant".to_string(),
            content: format!("echo: {message}"),
        })
    }

    async fn fetch_chat_history(&self, limit: u32, _goal_id: Option<&str>) -> Result<ChatHistory, ApiError> {
        self.history_limits.lock().unwrap().push(limit);
        Ok(self.history.lock().unwrap().clone())
    }

    async fn fetch_my_profile(&self) -> Result<Option<Profile>, ApiError> {
        if self.profile_fails.load(Ordering::SeqCst) {
            return Err(status_error(StatusCode::UNAUTHORIZED, "expired"));
        }
        Ok(self.profile.lock().unwrap().clone())
    }

    async fn upsert_profile(&self, upsert: &ProfileUpsert) -> Result<Profile, ApiError> {
        self.upserts.lock().unwrap().push(upsert.clone());
        if self.upsert_fails.load(Ordering::SeqCst) {
            return Err(status_error(StatusCode::UNPROCESSABLE_ENTITY, r#"{"detail":"invalid dob"}"#));
        }
        let base = self.profile.lock().unwrap().clone().unwrap_or_else(|| Profile::empty("u-1"));
        let saved = base.merged_with(upsert);
        *self.profile.lock().unwrap() = Some(saved.clone());
        Ok(saved)
    }
}
