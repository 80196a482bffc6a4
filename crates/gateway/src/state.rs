//! Shared state for the dev server

use std::sync::Arc;
use std::time::Duration;

use livestream_auth::{Authenticator, PlaceholderAuthenticator};
use livestream_config::AppConfig;

use crate::error::{GatewayError, GatewayResult};

#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<AppConfig>,
    /// Client used to forward proxied HTTP requests. Never follows redirects,
    /// so the browser sees the upstream's own `Location` headers.
    pub upstream: reqwest::Client,
    pub authenticator: Arc<dyn Authenticator>,
}

impl GatewayState {
    pub fn new(config: AppConfig) -> GatewayResult<Self> {
        let upstream = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(config.api.request_timeout_seconds))
            .build()
            .map_err(|error| {
                GatewayError::InternalError(format!("failed to build proxy client: {error}"))
            })?;

        Ok(Self {
            config: Arc::new(config),
            upstream,
            authenticator: Arc::new(PlaceholderAuthenticator),
        })
    }

    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }
}
