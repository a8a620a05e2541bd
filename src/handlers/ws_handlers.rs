//! Websocket endpoint broadcasting registry change notifications.
//!
//! Subscribers connect to `/ws/notifications` and receive one text frame
//! per mutation anywhere in the registry. The stream is one-way: inbound
//! frames are ignored except for close.

use crate::services::AppState;
use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use tokio::sync::broadcast::{self, error::RecvError};

/// `GET /ws/notifications` — upgrade and start relaying notifications.
pub async fn notifications(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let rx = state.notifier.subscribe();
    ws.on_upgrade(move |socket| relay(socket, rx))
}

async fn relay(mut socket: WebSocket, mut rx: broadcast::Receiver<String>) {
    loop {
        tokio::select! {
            broadcast = rx.recv() => match broadcast {
                Ok(text) => {
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                // a slow consumer missed messages; resume from the current
                // position rather than dropping the connection
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("websocket subscriber lagged, skipped {skipped} notifications");
                }
                Err(RecvError::Closed) => break,
            },
            inbound = socket.recv() => match inbound {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::debug!("websocket receive error: {err}");
                    break;
                }
            },
        }
    }
}
