use super::ApiClient;
use crate::error::ApiError;
use crate::models::{TaskCreate, TaskItem};

impl ApiClient {
    /// `POST /tasks`
    pub async fn create_task(&self, task: &TaskCreate) -> Result<TaskItem, ApiError> {
        self.post(&["tasks"], task).await
    }
}
