//! Remote authority for the settings record.

use std::time::Duration;

use async_trait::async_trait;
use livestream_auth::AuthContext;
use livestream_config::ApiConfig;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{SettingsError, SettingsResult};
use crate::model::Settings;

pub const SETTINGS_PATH: &str = "/api/admin/settings";

#[async_trait]
pub trait SettingsApi: Send + Sync {
    async fn fetch(&self, auth: &AuthContext) -> SettingsResult<Settings>;
    async fn save(&self, auth: &AuthContext, settings: &Settings) -> SettingsResult<()>;
}

/// `reqwest` implementation talking to `GET`/`PUT /api/admin/settings`.
#[derive(Debug, Clone)]
pub struct HttpSettingsClient {
    client: Client,
    endpoint: String,
}

impl HttpSettingsClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> SettingsResult<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|err| SettingsError::ClientInit(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), SETTINGS_PATH),
        })
    }

    pub fn from_config(config: &ApiConfig) -> SettingsResult<Self> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.request_timeout_seconds),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SettingsApi for HttpSettingsClient {
    async fn fetch(&self, auth: &AuthContext) -> SettingsResult<Settings> {
        debug!(endpoint = %self.endpoint, "fetching settings");

        let response = self
            .client
            .get(&self.endpoint)
            .bearer_auth(auth.token())
            .send()
            .await
            .map_err(|err| SettingsError::FetchFailed(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "settings fetch rejected");
            return Err(SettingsError::FetchFailed(format!(
                "server responded with {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| SettingsError::FetchFailed(err.to_string()))?;

        serde_json::from_slice(&body).map_err(|err| SettingsError::ParseFailed(err.to_string()))
    }

    async fn save(&self, auth: &AuthContext, settings: &Settings) -> SettingsResult<()> {
        debug!(endpoint = %self.endpoint, "saving settings");

        let response = self
            .client
            .put(&self.endpoint)
            .bearer_auth(auth.token())
            .json(settings)
            .send()
            .await
            .map_err(|err| SettingsError::SaveFailed(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "settings save rejected");
            return Err(SettingsError::SaveFailed(format!(
                "server responded with {status}"
            )));
        }

        Ok(())
    }
}
