use tracing::info;

use super::ApiClient;
use crate::error::ApiError;
use crate::models::{Profile, ProfileUpsert};

impl ApiClient {
    /// `GET /profile/me`. The backend answers `null` until onboarding is done.
    pub async fn fetch_my_profile(&self) -> Result<Option<Profile>, ApiError> {
        self.get(&["profile", "me"], &[]).await
    }

    /// `POST /profile`
    pub async fn upsert_profile(&self, profile: &ProfileUpsert) -> Result<Profile, ApiError> {
        let saved: Profile = self.post(&["profile"], profile).await?;
        info!(profile_id = %saved.id, "Profile saved");
        Ok(saved)
    }
}
