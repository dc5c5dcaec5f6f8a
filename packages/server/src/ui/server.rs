//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use roundtable_shared::time::{Clock, SystemClock};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ChatConfig,
    domain::SessionRegistry,
    infrastructure::registry::InMemorySessionRegistry,
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, GetChatStateUseCase,
        GetOnlineUsersUseCase, SendMessageUseCase,
    },
};

use super::{
    handler::{debug_chat_state, health_check, online_users, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Errors that stop the server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Roundtable live chat server
///
/// # Example
///
/// ```ignore
/// let server = Server::from_config(ChatConfig::default());
/// server.run("127.0.0.1", 8080).await?;
/// ```
pub struct Server {
    /// Brings new connections online
    connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// Cleans up after closed connections
    disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// Records and fans out chat messages
    send_message_usecase: Arc<SendMessageUseCase>,
    get_online_users_usecase: Arc<GetOnlineUsersUseCase>,
    get_chat_state_usecase: Arc<GetChatStateUseCase>,
}

impl Server {
    pub fn new(
        connect_participant_usecase: Arc<ConnectParticipantUseCase>,
        disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        get_online_users_usecase: Arc<GetOnlineUsersUseCase>,
        get_chat_state_usecase: Arc<GetChatStateUseCase>,
    ) -> Self {
        Self {
            connect_participant_usecase,
            disconnect_participant_usecase,
            send_message_usecase,
            get_online_users_usecase,
            get_chat_state_usecase,
        }
    }

    /// Wire up the default dependency graph for the given settings
    pub fn from_config(config: ChatConfig) -> Self {
        // Initialize dependencies in order:
        // 1. Clock
        // 2. Registry
        // 3. UseCases
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let registry: Arc<dyn SessionRegistry> =
            Arc::new(InMemorySessionRegistry::new(config, clock.clone()));
        tracing::info!(
            "Session registry ready (history capacity {}, replay limit {})",
            config.history_capacity,
            config.replay_limit
        );

        Self::new(
            Arc::new(ConnectParticipantUseCase::new(registry.clone())),
            Arc::new(DisconnectParticipantUseCase::new(
                registry.clone(),
                clock.clone(),
            )),
            Arc::new(SendMessageUseCase::new(registry.clone(), clock)),
            Arc::new(GetOnlineUsersUseCase::new(registry.clone())),
            Arc::new(GetChatStateUseCase::new(registry)),
        )
    }

    fn router(self) -> Router {
        let app_state = Arc::new(AppState {
            connect_participant_usecase: self.connect_participant_usecase,
            disconnect_participant_usecase: self.disconnect_participant_usecase,
            send_message_usecase: self.send_message_usecase,
            get_online_users_usecase: self.get_online_users_usecase,
            get_chat_state_usecase: self.get_chat_state_usecase,
        });

        Router::new()
            // WebSocket
            .route("/ws/chat", get(websocket_handler))
            // HTTP API
            .route("/api/chat/online", get(online_users))
            .route("/api/health", get(health_check))
            .route("/debug/chat", get(debug_chat_state))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Bind to `host:port` and serve until a shutdown signal arrives
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: &str, port: u16) -> Result<(), ServerError> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_addr.clone(),
                source,
            })?;

        self.serve(listener).await
    }

    /// Serve on an already bound listener until a shutdown signal arrives
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        tracing::info!("Roundtable chat server listening on {}", local_addr);
        tracing::info!("Connect to: ws://{}/ws/chat?username=<name>", local_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
