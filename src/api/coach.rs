use super::ApiClient;
use crate::error::ApiError;
use crate::models::{ChatHistory, CoachChatRequest, CoachReply};

impl ApiClient {
    /// `POST /coach/chat`, on behalf of the signed-in user.
    pub async fn coach_chat(&self, message: &str, goal_id: Option<&str>) -> Result<CoachReply, ApiError> {
        let user_id = self.user_id()?;
        let body = CoachChatRequest {
            user_id: &user_id,
            message,
            goal_id,
        };
        self.post(&["coach", "chat"], &body).await
    }

    /// `GET /coach/history?limit=&goal_id=`
    pub async fn fetch_chat_history(&self, limit: u32, goal_id: Option<&str>) -> Result<ChatHistory, ApiError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(goal_id) = goal_id {
            query.push(("goal_id", goal_id.to_string()));
        }
        self.get(&["coach", "history"], &query).await
    }
}
