//! Cross-cutting request handling

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use livestream_config::AppConfig;
use tower_http::cors::CorsLayer;

/// Logs method, path, status and latency of every request.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let start = std::time::Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status(),
        duration_ms = duration.as_millis(),
        "request completed"
    );

    response
}

/// CORS for the origins the dev server is reachable under: the LAN origin
/// and `localhost` on the same port.
pub fn create_cors_layer(config: &AppConfig) -> CorsLayer {
    let protocol = config.http.protocol(config.tls_active());
    let origins = [
        config.public_origin(),
        format!("{protocol}://localhost:{}", config.http.port),
    ]
    .iter()
    .filter_map(|origin| HeaderValue::from_str(origin).ok())
    .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
        .allow_credentials(true)
}
