//! HTTP surface: WebSocket upgrades and the liveness probe share one path.

use crate::gateway::SessionGateway;
use crate::protocol::{ClientEvent, decode, encode};
use axum::{Json, Router};
use axum::body::Body;
use axum::extract::State;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tracing::{debug, info, instrument, warn};

/// Body returned by a plain GET on the socket path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liveness {
    /// Status line.
    pub message: String,
}

impl Liveness {
    /// The one status this server reports.
    pub fn running() -> Self {
        Self {
            message: "Socket server is running".to_string(),
        }
    }
}

/// Builds the router serving `path`.
#[instrument(skip(gateway))]
pub fn router(gateway: SessionGateway, path: &str) -> Router {
    Router::new()
        .route(path, get(socket_endpoint))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(gateway)
}

/// Serves `path` on an already-bound listener until it fails.
#[instrument(skip(listener, gateway))]
pub async fn serve(listener: TcpListener, gateway: SessionGateway, path: &str) -> std::io::Result<()> {
    let app = router(gateway, path);
    info!(addr = ?listener.local_addr().ok(), path, "Serving sockets");
    axum::serve(listener, app).await
}

async fn socket_endpoint(
    State(gateway): State<SessionGateway>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    match upgrade {
        Ok(ws) => ws.on_upgrade(move |socket| serve_socket(gateway, socket)),
        Err(rejection) => {
            debug!(?rejection, "No upgrade requested, answering liveness");
            Json(Liveness::running()).into_response()
        }
    }
}

/// Pumps one socket: inbound frames to the gateway, the connection's outbox
/// back to the socket.
async fn serve_socket(gateway: SessionGateway, socket: WebSocket) {
    let (conn, mut outbox) = gateway.connect();
    let (mut sink, mut stream) = socket.split();

    let writer_conn = conn.clone();
    let writer = tokio::spawn(async move {
        while let Some(event) = outbox.recv().await {
            let text = match encode(&event) {
                Ok(text) => text,
                Err(e) => {
                    warn!(conn = %writer_conn, error = %e, "Failed to encode event");
                    continue;
                }
            };
            if let Err(e) = sink.send(Message::Text(text.into())).await {
                debug!(conn = %writer_conn, error = %e, "Socket write failed");
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match decode::<ClientEvent>(text.as_str()) {
                Ok(event) => gateway.dispatch(&conn, event),
                Err(e) => warn!(conn = %conn, error = %e, "Dropping malformed frame"),
            },
            Ok(Message::Binary(_)) => warn!(conn = %conn, "Dropping binary frame"),
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(conn = %conn, error = %e, "Socket read failed");
                break;
            }
        }
    }

    gateway.disconnect(&conn);
    writer.abort();
}
