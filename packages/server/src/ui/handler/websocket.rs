//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, Username},
    ui::state::AppState,
    usecase::{ConnectError, DisconnectParticipantUseCase},
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub username: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> impl IntoResponse {
    let username = Username::from_query(query.username);
    ws.on_upgrade(move |socket| handle_socket(socket, state, username))
}

/// Runs the disconnect use case when the connection task ends.
///
/// The normal path calls [`DisconnectGuard::disconnect`]; if the task is
/// cancelled or unwinds first, `Drop` spawns the same cleanup.
struct DisconnectGuard {
    usecase: Arc<DisconnectParticipantUseCase>,
    connection_id: Option<ConnectionId>,
}

impl DisconnectGuard {
    fn new(usecase: Arc<DisconnectParticipantUseCase>, connection_id: ConnectionId) -> Self {
        Self {
            usecase,
            connection_id: Some(connection_id),
        }
    }

    async fn disconnect(mut self) -> Option<Username> {
        let connection_id = self.connection_id.take()?;
        self.usecase.execute(connection_id).await
    }
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let Some(connection_id) = self.connection_id.take() else {
            return;
        };
        let usecase = self.usecase.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Some(username) = usecase.execute(connection_id).await {
                        tracing::info!("Cleaned up '{}' after aborted connection", username);
                    }
                });
            }
            Err(_) => {
                tracing::warn!(
                    "No runtime to clean up connection '{}'; it will be dropped lazily",
                    connection_id
                );
            }
        }
    }
}

/// Spawns a task that drains the outbound channel into the WebSocket sink.
///
/// Ends when every sender is dropped (the registry forgot the connection) or
/// when a socket write fails.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, username: Username) {
    let connection_id = ConnectionId::generate();
    let (sender, mut receiver) = socket.split();

    // Outbound frames go through this channel so registry pushes never wait on the socket
    let (tx, rx) = mpsc::unbounded_channel();
    let mut send_task = pusher_loop(rx, sender);

    match state
        .connect_participant_usecase
        .execute(connection_id, username.clone(), tx)
        .await
    {
        Ok(session) => {
            tracing::info!(
                "'{}' connected as '{}' ({} online)",
                username,
                connection_id,
                session.online_count
            );
        }
        Err(ConnectError::DuplicateConnection(id)) => {
            tracing::error!("Connection id '{}' is already registered, closing", id);
            send_task.abort();
            return;
        }
        Err(ConnectError::Delivery(e)) => {
            tracing::warn!("'{}' went away during welcome: {}", username, e);
            send_task.abort();
            return;
        }
    }

    let guard = DisconnectGuard::new(state.disconnect_participant_usecase.clone(), connection_id);

    // Spawn a task to receive messages from this client
    let state_for_recv = state.clone();
    let username_for_recv = username.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error from '{}': {}", username_for_recv, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received text from '{}': {}", username_for_recv, text);
                    let outcome = state_for_recv
                        .send_message_usecase
                        .execute(username_for_recv.clone(), text.to_string())
                        .await;
                    tracing::debug!(
                        "Message from '{}' delivered to {} connection(s)",
                        username_for_recv,
                        outcome.delivered
                    );
                }
                Message::Binary(data) => {
                    tracing::debug!(
                        "Ignoring {} byte binary frame from '{}'",
                        data.len(),
                        username_for_recv
                    );
                }
                Message::Close(_) => {
                    tracing::info!("'{}' requested close", username_for_recv);
                    break;
                }
                // Ping/pong is handled by the WebSocket protocol layer
                Message::Ping(_) | Message::Pong(_) => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        result = &mut recv_task => {
            if let Err(e) = result
                && e.is_panic()
            {
                tracing::error!("Receive loop for '{}' panicked", username);
            }
            send_task.abort();
        }
        _ = &mut send_task => recv_task.abort(),
    };

    match guard.disconnect().await {
        Some(left) => tracing::info!("'{}' disconnected and was announced as left", left),
        None => tracing::info!("'{}' disconnected after lazy cleanup", username),
    }
}
