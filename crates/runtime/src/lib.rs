use std::sync::Arc;

use anyhow::{Context, Result};
use livestream_auth::{resolve_credential, AuthContext, AuthError, FileCredentialStore};
use livestream_config::{AppConfig, StorageConfig};
use livestream_media::{PresignResult, Presigner};
use livestream_settings::HttpSettingsClient;
use tracing::info;

pub mod certs;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::TRACE)
            .with_env_filter(env_filter)
            .with_target(false)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Clients shared by the CLI commands that talk to the admin backend.
#[derive(Clone)]
pub struct AdminServices {
    pub settings_api: Arc<HttpSettingsClient>,
    pub credentials: Arc<FileCredentialStore>,
    storage: StorageConfig,
}

impl AdminServices {
    pub fn initialise(config: &AppConfig) -> Result<Self> {
        let settings_api = HttpSettingsClient::from_config(&config.api)
            .context("failed to build settings client")?;
        let credentials = FileCredentialStore::new(&config.api.token_path);

        info!(
            endpoint = settings_api.endpoint(),
            token_path = %credentials.path().display(),
            "admin services ready"
        );

        Ok(Self {
            settings_api: Arc::new(settings_api),
            credentials: Arc::new(credentials),
            storage: config.storage.clone(),
        })
    }

    /// Credential for a single request: `explicit` wins, otherwise the
    /// token file is read again.
    pub fn credential(&self, explicit: Option<&str>) -> Result<AuthContext, AuthError> {
        resolve_credential(explicit, self.credentials.as_ref())
    }

    pub fn presigner(&self) -> PresignResult<Presigner> {
        Presigner::from_config(&self.storage)
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
