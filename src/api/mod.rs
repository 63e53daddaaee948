//! Fitness backend REST client.
//!
//! `ApiClient` is the only concrete backend. Flows take `&dyn FitnessBackend`
//! so they can be driven by stubs in tests.

mod client;
mod coach;
mod goals;
mod profile;
mod tasks;

pub use client::ApiClient;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{ChatHistory, CoachReply, Goal, GoalCreate, Profile, ProfileUpsert, TaskCreate, TaskItem};

/// How many history turns are requested when the caller has no preference.
pub const DEFAULT_HISTORY_LIMIT: u32 = 200;

/// Every backend operation the client uses.
#[async_trait]
pub trait FitnessBackend: Send + Sync {
    // ── Goals ───────────────────────────────────────────────────────

    async fn list_goals(&self) -> Result<Vec<Goal>, ApiError>;

    /// Create a goal. Task generation runs on the backend afterwards.
    async fn create_goal(&self, goal: &GoalCreate) -> Result<Goal, ApiError>;

    async fn delete_goal(&self, goal_id: &str) -> Result<(), ApiError>;

    // ── Tasks ───────────────────────────────────────────────────────

    async fn list_goal_tasks(&self, goal_id: &str) -> Result<Vec<TaskItem>, ApiError>;

    async fn create_task(&self, task: &TaskCreate) -> Result<TaskItem, ApiError>;

    // ── Coach ───────────────────────────────────────────────────────

    async fn coach_chat(&self, message: &str, goal_id: Option<&str>) -> Result<CoachReply, ApiError>;

    async fn fetch_chat_history(&self, limit: u32, goal_id: Option<&str>) -> Result<ChatHistory, ApiError>;

    // ── Profile ─────────────────────────────────────────────────────

    /// The caller's profile, `None` before onboarding.
    async fn fetch_my_profile(&self) -> Result<Option<Profile>, ApiError>;

    async fn upsert_profile(&self, profile: &ProfileUpsert) -> Result<Profile, ApiError>;
}

#[async_trait]
impl FitnessBackend for ApiClient {
    async fn list_goals(&self) -> Result<Vec<Goal>, ApiError> {
        ApiClient::list_goals(self).await
    }

    async fn create_goal(&self, goal: &GoalCreate) -> Result<Goal, ApiError> {
        ApiClient::create_goal(self, goal).await
    }

    async fn delete_goal(&self, goal_id: &str) -> Result<(), ApiError> {
        ApiClient::delete_goal(self, goal_id).await
    }

    async fn list_goal_tasks(&self, goal_id: &str) -> Result<Vec<TaskItem>, ApiError> {
        ApiClient::list_goal_tasks(self, goal_id).await
    }

    async fn create_task(&self, task: &TaskCreate) -> Result<TaskItem, ApiError> {
        ApiClient::create_task(self, task).await
    }

    async fn coach_chat(&self, message: &str, goal_id: Option<&str>) -> Result<CoachReply, ApiError> {
        ApiClient::coach_chat(self, message, goal_id).await
    }

    async fn fetch_chat_history(&self, limit: u32, goal_id: Option<&str>) -> Result<ChatHistory, ApiError> {
        ApiClient::fetch_chat_history(self, limit, goal_id).await
    }

    async fn fetch_my_profile(&self) -> Result<Option<Profile>, ApiError> {
        ApiClient::fetch_my_profile(self).await
    }

    async fn upsert_profile(&self, profile: &ProfileUpsert) -> Result<Profile, ApiError> {
        ApiClient::upsert_profile(self, profile).await
    }
}
