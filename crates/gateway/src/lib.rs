//! # LiveStream Gateway Crate
//!
//! Local dev server for the LiveStream site. It renders the public pages,
//! serves the built front end from `http.static_dir`, and forwards backend
//! traffic to `proxy.target`:
//!
//! - **Pages**: `/`, `/login` (form post goes through the configured
//!   [`livestream_auth::Authenticator`]) and `/healthz`
//! - **Proxy**: everything under `proxy.api_prefix` over HTTP, everything
//!   under `proxy.socket_prefix` as a WebSocket bridge or plain HTTP
//! - **Static**: any other path is looked up in the static directory,
//!   falling back to `index.html` for client-side routes
//!
//! ```rust,no_run
//! use livestream_gateway::{serve, GatewayState};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = livestream_config::load()?;
//! let state = GatewayState::new(config)?;
//! serve(state, async { let _ = tokio::signal::ctrl_c().await; }).await
//! # }
//! ```

pub mod error;
pub mod middleware;
pub mod pages;
pub mod proxy;
mod server;
pub mod state;

pub use error::{GatewayError, GatewayResult};
pub use server::serve;
pub use state::GatewayState;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{any, get},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

/// Build the dev server router.
pub fn build_router(state: GatewayState) -> Router {
    let config = state.config.clone();
    let proxy_config = &config.proxy;
    let static_dir = &config.http.static_dir;

    let mut router = Router::new()
        .route("/", get(pages::landing_page))
        .route("/login", get(pages::login_page).post(pages::submit_login))
        .route("/healthz", get(pages::health_check));

    match mount_prefix(&proxy_config.api_prefix) {
        Some(prefix) => {
            router = router
                .route(prefix, any(proxy::proxy_http))
                .route(&format!("{prefix}/"), any(proxy::proxy_http))
                .route(&format!("{prefix}/*path"), any(proxy::proxy_http));
        }
        None => tracing::warn!(prefix = %proxy_config.api_prefix, "api proxy disabled: invalid prefix"),
    }

    match mount_prefix(&proxy_config.socket_prefix) {
        Some(prefix) => {
            router = router
                .route(prefix, any(proxy::proxy_socket))
                .route(&format!("{prefix}/"), any(proxy::proxy_socket))
                .route(&format!("{prefix}/*path"), any(proxy::proxy_socket));
        }
        None => {
            tracing::warn!(prefix = %proxy_config.socket_prefix, "socket proxy disabled: invalid prefix")
        }
    }

    router
        .fallback_service(
            ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html"))),
        )
        .with_state(Arc::new(state))
        .layer(middleware::create_cors_layer(&config))
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}

/// Route prefix without trailing slash, or `None` when it cannot be mounted.
fn mount_prefix(prefix: &str) -> Option<&str> {
    let prefix = prefix.trim_end_matches('/');
    let valid = prefix.starts_with('/') && !prefix.contains(['*', ':', '{', '}']);
    valid.then_some(prefix)
}
