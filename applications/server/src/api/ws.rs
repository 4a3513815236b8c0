//! WebSocket stream of wallet updates
//!
//! Regular users receive their own `walletUpdate` events; admins receive
//! every user's.

use crate::{
    error::{Result, ServerError},
    services::{Principal, WalletEvent},
    state::AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::{self, error::RecvError};

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: String,
}

/// Whether a connection authenticated as `principal` should see `event`
pub fn should_forward(principal: &Principal, event: &WalletEvent) -> bool {
    principal.is_admin || principal.user_id == event.user_id
}

/// GET /api/ws?token=<jwt>
pub async fn wallet_updates(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(app_state): State<AppState>,
) -> Result<Response> {
    let principal = app_state.auth_service.authenticate(&query.token).map_err(|e| {
        tracing::warn!("WebSocket token rejected: {}", e);
        ServerError::Auth("Session expired or not authenticated.".to_string())
    })?;

    // Subscribe before the upgrade so no event published in between is lost
    let events = app_state.events.subscribe();

    tracing::info!(
        user_id = %principal.user_id,
        is_admin = principal.is_admin,
        "WebSocket connection accepted"
    );

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, principal, events)))
}

async fn handle_socket(
    socket: WebSocket,
    principal: Principal,
    mut events: broadcast::Receiver<WalletEvent>,
) {
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if !should_forward(&principal, &event) {
                        continue;
                    }
                    let text = match serde_json::to_string(&event.frame()) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to serialize walletUpdate");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, user_id = %principal.user_id, "WebSocket client lagging");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(Message::Ping(payload))) => {
                    if sender.send(Message::Pong(payload)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::info!(user_id = %principal.user_id, "WebSocket connection closed");
}
