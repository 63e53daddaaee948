use tracing::info;

use super::ApiClient;
use crate::error::ApiError;
use crate::models::{Goal, GoalCreate, TaskItem};

impl ApiClient {
    /// `GET /goals`
    pub async fn list_goals(&self) -> Result<Vec<Goal>, ApiError> {
        self.get(&["goals"], &[]).await
    }

    /// `POST /goals`
    pub async fn create_goal(&self, goal: &GoalCreate) -> Result<Goal, ApiError> {
        let created: Goal = self.post(&["goals"], goal).await?;
        info!(goal_id = %created.id, goal_type = %created.goal_type, "Goal created");
        Ok(created)
    }

    /// `DELETE /goals/{id}`
    pub async fn delete_goal(&self, goal_id: &str) -> Result<(), ApiError> {
        self.delete(&["goals", goal_id]).await?;
        info!(goal_id, "Goal deleted");
        Ok(())
    }

    /// `GET /goals/{id}/tasks`
    pub async fn list_goal_tasks(&self, goal_id: &str) -> Result<Vec<TaskItem>, ApiError> {
        self.get(&["goals", goal_id, "tasks"], &[]).await
    }
}
