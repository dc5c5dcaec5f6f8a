//! UseCase: chat state snapshot for debugging.

use std::sync::Arc;

use crate::domain::{ChatMessage, SessionRegistry, Username};

/// Online users and stored history at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSnapshot {
    pub users: Vec<Username>,
    pub history: Vec<ChatMessage>,
}

/// Read-only view of the registry for debugging
pub struct GetChatStateUseCase {
    registry: Arc<dyn SessionRegistry>,
}

impl GetChatStateUseCase {
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self) -> ChatSnapshot {
        ChatSnapshot {
            users: self.registry.list_online_usernames().await,
            history: self.registry.history().await,
        }
    }
}
