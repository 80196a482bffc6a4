use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::header,
    response::Response,
};
use tracing::{debug, warn};

use super::{forwardable_headers, upstream_url, HOP_BY_HOP};
use crate::error::{GatewayError, GatewayResult};
use crate::state::GatewayState;

/// Largest request body buffered before forwarding.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

pub async fn proxy_http(
    State(state): State<Arc<GatewayState>>,
    request: Request,
) -> GatewayResult<Response> {
    forward(&state, request).await
}

/// Replay `request` against the proxy target and relay the answer.
pub async fn forward(state: &GatewayState, request: Request) -> GatewayResult<Response> {
    let proxy = &state.config.proxy;
    let (parts, body) = request.into_parts();
    let url = upstream_url(proxy, parts.uri.path(), parts.uri.query());

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| GatewayError::PayloadTooLarge)?;

    debug!(method = %parts.method, %url, "forwarding request");

    let upstream = state
        .upstream
        .request(parts.method.clone(), &url)
        .headers(forwardable_headers(&parts.headers, proxy.change_origin))
        .body(body)
        .send()
        .await
        .map_err(|error| {
            warn!(%url, %error, "upstream request failed");
            GatewayError::UpstreamUnavailable(error.to_string())
        })?;

    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
    headers.remove(header::CONTENT_LENGTH);

    let bytes = upstream.bytes().await?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
