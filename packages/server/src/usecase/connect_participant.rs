//! UseCase: participant connect.
//!
//! Registers the connection, which queues the history replay for the
//! newcomer and announces the join to everyone else, then sends the newcomer
//! a roster snapshot.

use std::sync::Arc;

use crate::domain::{
    ChatEvent, ConnectionId, PusherChannel, RegisteredSession, SessionRegistry, Username,
};

use super::error::ConnectError;

/// Brings a participant online
pub struct ConnectParticipantUseCase {
    registry: Arc<dyn SessionRegistry>,
}

impl ConnectParticipantUseCase {
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Bring a freshly accepted connection online
    ///
    /// # Arguments
    ///
    /// * `connection_id` - Identifier generated by the transport for this socket
    /// * `username` - Display name chosen by the client
    /// * `channel` - Outbound channel drained by the connection's writer task
    ///
    /// # Returns
    ///
    /// * `Ok(RegisteredSession)` - the session is live and has been welcomed
    /// * `Err(ConnectError)` - duplicate id, or the socket died during the welcome
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        username: Username,
        channel: PusherChannel,
    ) -> Result<RegisteredSession, ConnectError> {
        let session = self
            .registry
            .register(connection_id, username, channel)
            .await?;

        let users = self.registry.list_online_usernames().await;
        self.registry
            .send_to(connection_id, &ChatEvent::OnlineUsers(users))
            .await?;

        Ok(session)
    }
}
