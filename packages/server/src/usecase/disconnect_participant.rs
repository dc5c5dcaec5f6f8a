//! UseCase: participant disconnect.
//!
//! Removes the connection and, when it was still registered, tells the
//! remaining participants who left and how many are still online. A
//! connection already dropped by lazy cleanup is not announced again.

use std::sync::Arc;

use roundtable_shared::time::Clock;

use crate::domain::{ChatEvent, ConnectionId, SessionRegistry, Timestamp, Username};

/// Takes a participant offline and announces the leave
pub struct DisconnectParticipantUseCase {
    registry: Arc<dyn SessionRegistry>,
    clock: Arc<dyn Clock>,
}

impl DisconnectParticipantUseCase {
    pub fn new(registry: Arc<dyn SessionRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// Take a connection offline
    ///
    /// # Returns
    ///
    /// The username of the removed connection, or `None` if it was not
    /// registered (already removed, or never registered).
    pub async fn execute(&self, connection_id: ConnectionId) -> Option<Username> {
        let username = self.registry.unregister(connection_id).await?;

        let online_count = self.registry.online_count().await;
        let left = ChatEvent::left(
            &username,
            Timestamp::new(self.clock.now_millis()),
            online_count,
        );
        self.registry.broadcast(&left, None).await;

        Some(username)
    }
}
