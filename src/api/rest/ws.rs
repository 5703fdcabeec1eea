use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use chrono::Utc;
use futures::SinkExt;
use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use crate::models::driver::DriverPoolEntry;
use crate::models::user::UserRole;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct WsQuery {
    /// When this resolves to a registered driver, the connection also joins
    /// the driver pool for its lifetime.
    pub public_id: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.public_id))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, public_id: Option<String>) {
    let connection_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::channel::<String>(state.ws_buffer_size);
    state.hub.subscribe(connection_id, tx);
    state.metrics.ws_subscribers.inc();

    let driver_id = public_id
        .as_deref()
        .and_then(|pid| state.users.find_by_public_id(pid))
        .filter(|user| user.role == UserRole::Driver)
        .map(|user| {
            state.drivers.insert(
                user.id,
                DriverPoolEntry {
                    driver_id: user.id,
                    public_id: user.public_id.clone(),
                    location: None,
                    connection_id,
                    connected_at: Utc::now(),
                },
            );
            info!(driver_id = %user.id, %connection_id, "driver joined the pool");
            user.id
        });

    info!(%connection_id, "websocket client connected");

    let (mut sender, mut receiver) = socket.split();

    let send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    let relay_state = state.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Text(text) = msg {
                relay_state.hub.relay(connection_id, &text);
            }
        }
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    state.hub.unsubscribe(connection_id);
    state.metrics.ws_subscribers.dec();
    if let Some(id) = driver_id {
        state.drivers.remove(&id);
        info!(driver_id = %id, "driver left the pool");
    }

    info!(%connection_id, "websocket client disconnected");
}
