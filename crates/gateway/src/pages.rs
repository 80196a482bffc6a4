//! Server-rendered pages and the health check.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::{DateTime, Utc};
use livestream_auth::{AuthError, AuthSession, Credentials, LoginForm, POST_LOGIN_PATH};
use livestream_site::{render_landing_page, render_login_page};
use serde::Serialize;
use tracing::warn;

use crate::error::GatewayError;
use crate::state::GatewayState;

pub const SESSION_COOKIE: &str = "livestream_session";
const INVALID_CREDENTIALS_NOTICE: &str = "Invalid email or password.";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

pub async fn landing_page() -> Html<String> {
    Html(render_landing_page())
}

pub async fn login_page() -> Html<String> {
    Html(render_login_page("", None))
}

/// Hand the submitted credentials to the configured authenticator and
/// follow wherever it sends the user.
pub async fn submit_login(
    State(state): State<Arc<GatewayState>>,
    Form(credentials): Form<Credentials>,
) -> Response {
    let form = LoginForm::from(credentials);

    match form.submit(state.authenticator.as_ref()).await {
        Ok(outcome) => {
            let mut response = Redirect::to(redirect_target(&outcome.redirect_to)).into_response();
            if let Some(session) = outcome.session {
                match HeaderValue::from_str(&session_cookie(&session, Utc::now())) {
                    Ok(value) => {
                        response.headers_mut().insert(header::SET_COOKIE, value);
                    }
                    Err(error) => warn!(%error, "session token is not a valid cookie value"),
                }
            }
            response
        }
        Err(AuthError::InvalidCredentials) => (
            StatusCode::UNAUTHORIZED,
            Html(render_login_page(form.email(), Some(INVALID_CREDENTIALS_NOTICE))),
        )
            .into_response(),
        Err(error) => {
            warn!(%error, "login failed");
            GatewayError::from(error).into_response()
        }
    }
}

/// Authenticator-supplied paths that cannot be sent as a `Location` header
/// fall back to the dashboard.
fn redirect_target(path: &str) -> &str {
    if HeaderValue::from_str(path).is_ok() {
        path
    } else {
        warn!(path, "authenticator returned an unusable redirect");
        POST_LOGIN_PATH
    }
}

fn session_cookie(session: &AuthSession, now: DateTime<Utc>) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
        session.context.token()
    );
    if let Some(expires_at) = session.expires_at {
        let max_age = (expires_at - now).num_seconds().max(0);
        cookie.push_str(&format!(
            "; Max-Age={max_age}; Expires={}",
            expires_at.format("%a, %d %b %Y %H:%M:%S GMT")
        ));
    }
    cookie
}
