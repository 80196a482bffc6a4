//! Error types for the dev server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use livestream_auth::AuthError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::UpstreamUnavailable(_) | GatewayError::WebSocketError(_) => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = json!({
            "error": status.as_str(),
            "message": self.to_string(),
        });

        (status, Json(error_response)).into_response()
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<AuthError> for GatewayError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => {
                GatewayError::AuthenticationFailed("Invalid credentials".to_string())
            }
            AuthError::MissingCredential | AuthError::EmptyCredential => {
                GatewayError::InvalidRequest(error.to_string())
            }
            AuthError::Backend(message) => GatewayError::UpstreamUnavailable(message),
            AuthError::Store(error) => GatewayError::InternalError(error.to_string()),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        GatewayError::UpstreamUnavailable(error.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for GatewayError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        GatewayError::WebSocketError(error.to_string())
    }
}
