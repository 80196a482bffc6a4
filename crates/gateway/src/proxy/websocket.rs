//! WebSocket bridge for the realtime channel.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Request, State,
    },
    http::{HeaderMap, Uri},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        client::IntoClientRequest,
        http::HeaderValue as UpstreamHeaderValue,
        protocol::{frame::coding::CloseCode, CloseFrame as UpstreamCloseFrame},
        Message as UpstreamMessage,
    },
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};

use super::{forward, upstream_url, websocket_url};
use crate::error::{GatewayError, GatewayResult};
use crate::state::GatewayState;

type UpstreamSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Request headers carried over to the upstream handshake.
const FORWARDED_HANDSHAKE_HEADERS: [&str; 3] = ["authorization", "cookie", "origin"];

/// Upgrade requests are bridged frame by frame to the upstream socket;
/// anything else (long-polling) goes through the HTTP proxy.
pub async fn proxy_socket(
    State(state): State<Arc<GatewayState>>,
    upgrade: Option<WebSocketUpgrade>,
    request: Request,
) -> Response {
    let result = match upgrade {
        Some(upgrade) => {
            let (parts, _) = request.into_parts();
            open_bridge(&state, upgrade, &parts.uri, &parts.headers).await
        }
        None => forward(&state, request).await,
    };

    result.unwrap_or_else(IntoResponse::into_response)
}

async fn open_bridge(
    state: &GatewayState,
    upgrade: WebSocketUpgrade,
    uri: &Uri,
    headers: &HeaderMap,
) -> GatewayResult<Response> {
    let url = websocket_url(&upstream_url(&state.config.proxy, uri.path(), uri.query()));

    let upstream = connect_upstream(&url, headers, state.config.proxy.change_origin)
        .await
        .map_err(|error| {
            warn!(%url, %error, "upstream websocket handshake failed");
            error
        })?;

    info!(%url, "websocket bridge opened");
    Ok(upgrade.on_upgrade(move |client| bridge(client, upstream)))
}

async fn connect_upstream(
    url: &str,
    headers: &HeaderMap,
    change_origin: bool,
) -> GatewayResult<UpstreamSocket> {
    let mut handshake = url.into_client_request()?;

    for name in FORWARDED_HANDSHAKE_HEADERS {
        if name == "origin" && change_origin {
            continue;
        }
        if let Some(value) = headers.get(name) {
            let value = UpstreamHeaderValue::from_bytes(value.as_bytes())
                .map_err(|error| GatewayError::InvalidRequest(error.to_string()))?;
            handshake.headers_mut().insert(name, value);
        }
    }

    let (socket, _response) = connect_async(handshake).await?;
    Ok(socket)
}

async fn bridge(client: WebSocket, upstream: UpstreamSocket) {
    let (mut client_tx, mut client_rx) = client.split();
    let (mut upstream_tx, mut upstream_rx) = upstream.split();

    let client_to_upstream = async {
        while let Some(Ok(message)) = client_rx.next().await {
            let closing = matches!(message, Message::Close(_));
            if upstream_tx.send(to_upstream(message)).await.is_err() || closing {
                break;
            }
        }
    };

    let upstream_to_client = async {
        while let Some(Ok(message)) = upstream_rx.next().await {
            let Some(message) = to_client(message) else {
                continue;
            };
            let closing = matches!(message, Message::Close(_));
            if client_tx.send(message).await.is_err() || closing {
                break;
            }
        }
    };

    tokio::select! {
        _ = client_to_upstream => debug!("client side of websocket bridge ended"),
        _ = upstream_to_client => debug!("upstream side of websocket bridge ended"),
    }
    info!("websocket bridge closed");
}

fn to_upstream(message: Message) -> UpstreamMessage {
    match message {
        Message::Text(text) => UpstreamMessage::Text(text),
        Message::Binary(data) => UpstreamMessage::Binary(data),
        Message::Ping(data) => UpstreamMessage::Ping(data),
        Message::Pong(data) => UpstreamMessage::Pong(data),
        Message::Close(frame) => UpstreamMessage::Close(frame.map(|frame| UpstreamCloseFrame {
            code: CloseCode::from(frame.code),
            reason: frame.reason,
        })),
    }
}

/// Raw frames never surface from a reading socket and are skipped.
fn to_client(message: UpstreamMessage) -> Option<Message> {
    match message {
        UpstreamMessage::Text(text) => Some(Message::Text(text)),
        UpstreamMessage::Binary(data) => Some(Message::Binary(data)),
        UpstreamMessage::Ping(data) => Some(Message::Ping(data)),
        UpstreamMessage::Pong(data) => Some(Message::Pong(data)),
        UpstreamMessage::Close(frame) => Some(Message::Close(frame.map(|frame| CloseFrame {
            code: u16::from(frame.code),
            reason: frame.reason,
        }))),
        UpstreamMessage::Frame(_) => None,
    }
}
