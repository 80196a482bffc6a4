//! Forwarding of `/api` and `/socket.io` traffic to the backend origin.

mod request;
mod websocket;

pub use request::{forward, proxy_http, MAX_BODY_BYTES};
pub use websocket::proxy_socket;

use axum::http::{header, HeaderMap};
use livestream_config::ProxyConfig;

/// Headers scoped to a single connection; never forwarded.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Upstream URL for a request path. The API prefix is removed only when
/// `strip_api_prefix` is set and the path is under it.
pub fn upstream_url(config: &ProxyConfig, path: &str, query: Option<&str>) -> String {
    let mut path = path;
    if config.strip_api_prefix {
        if let Some(rest) = strip_prefix(path, &config.api_prefix) {
            path = rest;
        }
    }
    let path = if path.is_empty() { "/" } else { path };

    let mut url = format!("{}{}", config.target.trim_end_matches('/'), path);
    if let Some(query) = query.filter(|query| !query.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}

/// `ws://`/`wss://` form of an `http://`/`https://` upstream URL.
pub fn websocket_url(http_url: &str) -> String {
    if let Some(rest) = http_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = http_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        http_url.to_string()
    }
}

fn strip_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return None;
    }
    let rest = path.strip_prefix(prefix)?;
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}

/// Copy of `headers` without hop-by-hop headers. `Host` is dropped too when
/// the upstream should see its own origin.
pub fn forwardable_headers(headers: &HeaderMap, change_origin: bool) -> HeaderMap {
    let mut forwarded = headers.clone();
    for name in HOP_BY_HOP {
        forwarded.remove(name);
    }
    forwarded.remove(header::CONTENT_LENGTH);
    if change_origin {
        forwarded.remove(header::HOST);
    }
    forwarded
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn proxy(strip: bool) -> ProxyConfig {
        ProxyConfig {
            target: "http://localhost:5000/".into(),
            strip_api_prefix: strip,
            ..ProxyConfig::default()
        }
    }

    #[test]
    fn keeps_prefix_by_default() {
        assert_eq!(
            upstream_url(&proxy(false), "/api/admin/settings", Some("a=1")),
            "http://localhost:5000/api/admin/settings?a=1"
        );
    }

    #[test]
    fn strips_prefix_when_configured() {
        let config = proxy(true);
        assert_eq!(
            upstream_url(&config, "/api/admin/settings", None),
            "http://localhost:5000/admin/settings"
        );
        assert_eq!(upstream_url(&config, "/api", None), "http://localhost:5000/");
        assert_eq!(
            upstream_url(&config, "/apiary", None),
            "http://localhost:5000/apiary"
        );
    }

    #[test]
    fn socket_paths_are_never_stripped() {
        assert_eq!(
            upstream_url(&proxy(true), "/socket.io/", Some("EIO=4&transport=polling")),
            "http://localhost:5000/socket.io/?EIO=4&transport=polling"
        );
    }

    #[test]
    fn websocket_scheme_follows_http_scheme() {
        assert_eq!(websocket_url("http://h:1/socket.io/"), "ws://h:1/socket.io/");
        assert_eq!(websocket_url("https://h/socket.io/"), "wss://h/socket.io/");
    }

    #[test]
    fn drops_hop_by_hop_and_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("192.168.1.10:3000"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer t"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("12"));

        let forwarded = forwardable_headers(&headers, true);
        assert!(forwarded.get(header::HOST).is_none());
        assert!(forwarded.get(header::CONNECTION).is_none());
        assert!(forwarded.get(header::CONTENT_LENGTH).is_none());
        assert_eq!(forwarded.get(header::AUTHORIZATION).unwrap(), "Bearer t");

        let preserved = forwardable_headers(&headers, false);
        assert_eq!(preserved.get(header::HOST).unwrap(), "192.168.1.10:3000");
    }
}
