//! UseCase: chat message send.
//!
//! Every inbound text frame becomes one chat message: it is recorded to
//! history first and then broadcast to every participant, sender included.
//! The two steps take the registry lock separately.

use std::sync::Arc;

use roundtable_shared::time::Clock;

use crate::domain::{
    BroadcastOutcome, ChatEvent, ChatMessage, SessionRegistry, Timestamp, Username,
};

/// Turns inbound text into a recorded, broadcast chat message
pub struct SendMessageUseCase {
    registry: Arc<dyn SessionRegistry>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(registry: Arc<dyn SessionRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// Record and broadcast a chat message
    ///
    /// # Arguments
    ///
    /// * `username` - Connect-time username of the sender
    /// * `text` - Raw frame text, taken verbatim
    pub async fn execute(&self, username: Username, text: String) -> BroadcastOutcome {
        let message = ChatMessage::new(username, text, Timestamp::new(self.clock.now_millis()));

        self.registry.record_history(message.clone()).await;
        self.registry
            .broadcast(&ChatEvent::Message(message), None)
            .await
    }
}
