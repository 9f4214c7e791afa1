use axum::{
    extract::{ws::Message, ws::WebSocket, State, WebSocketUpgrade},
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use jobdeck_core::types::ConnId;
use jobdeck_protocol::JobsFrame;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::app::AppState;
use crate::snapshot::SnapshotSource;

/// Axum handler: upgrades HTTP to WebSocket at GET /ws.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| run_connection(socket, state))
}

/// Per-observer event loop, lives for the entire WS session.
///
/// Inbound frames are read only to notice the peer going away. Outbound
/// frames come from the observer's bounded queue, which the broadcast loop
/// fills; once the registry drops the queue's sender the loop ends and the
/// socket closes.
async fn run_connection(socket: WebSocket, state: Arc<AppState>) {
    let conn_id = ConnId::new();
    let (mut tx, mut rx) = socket.split();

    let (queue_tx, mut queue_rx) = mpsc::channel::<String>(state.config.broadcast.queue_depth.max(1));
    state.observers.add(conn_id.clone(), queue_tx);
    info!(conn_id = %conn_id, observers = state.observers.count(), "observer connected");

    // initial full list; a failure here is logged and the session continues
    match JobsFrame::new(state.snapshots.snapshot().await).to_text() {
        Ok(text) => {
            if let Err(e) = tx.send(Message::Text(text.into())).await {
                warn!(conn_id = %conn_id, error = %e, "failed to send initial jobs frame");
            }
        }
        Err(e) => warn!(conn_id = %conn_id, error = %e, "failed to serialize initial jobs frame"),
    }

    loop {
        tokio::select! {
            msg = rx.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(conn_id = %conn_id, error = %e, "read error");
                        break;
                    }
                    // pings are answered by the transport; content is ignored
                    Some(Ok(_)) => {}
                }
            }

            outbound = queue_rx.recv() => {
                match outbound {
                    Some(text) => {
                        if let Err(e) = tx.send(Message::Text(text.into())).await {
                            warn!(conn_id = %conn_id, error = %e, "push failed");
                            break;
                        }
                    }
                    // dropped from the registry by the broadcast loop
                    None => break,
                }
            }
        }
    }

    if let Err(e) = tx.close().await {
        debug!(conn_id = %conn_id, error = %e, "websocket close failed");
    }
    if state.observers.remove(&conn_id) {
        info!(conn_id = %conn_id, observers = state.observers.count(), "observer disconnected");
    } else {
        info!(conn_id = %conn_id, observers = state.observers.count(), "observer dropped");
    }
}
