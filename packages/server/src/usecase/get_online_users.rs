//! UseCase: online user listing.

use std::sync::Arc;

use crate::domain::{SessionRegistry, Username};

/// Lists who is online
pub struct GetOnlineUsersUseCase {
    registry: Arc<dyn SessionRegistry>,
}

impl GetOnlineUsersUseCase {
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Usernames of everyone online, in registration order
    pub async fn execute(&self) -> Vec<Username> {
        self.registry.list_online_usernames().await
    }
}
