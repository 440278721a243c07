// Derived statistics and achievements endpoints

use reqwest::Method;

use crate::auth::AuthStrategy;
use crate::client::BackendClient;
use crate::error::Error;
use crate::models::{Achievement, AchievementsPayload, StatsSnapshot};

impl BackendClient {
    /// `GET /api/stats`
    pub async fn stats(&self) -> Result<StatsSnapshot, Error> {
        let url = self.url(&["api", "stats"])?;
        self.send(self.request(Method::GET, url, AuthStrategy::Bearer)?)
            .await
    }

    /// Unlocked achievements (plus visible locked ones).
    ///
    /// `GET /api/achievements`
    pub async fn achievements(&self) -> Result<Vec<Achievement>, Error> {
        let url = self.url(&["api", "achievements"])?;
        let payload: AchievementsPayload = self
            .send(self.request(Method::GET, url, AuthStrategy::Bearer)?)
            .await?;
        Ok(payload.achievements)
    }
}
