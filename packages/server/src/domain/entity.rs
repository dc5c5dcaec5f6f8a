//! Chat entities.

use super::value_object::{ConnectionId, Timestamp, Username};

/// One live chat participant as tracked by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub username: Username,
    pub connected_at: Timestamp,
}

impl Connection {
    pub fn new(id: ConnectionId, username: Username, connected_at: Timestamp) -> Self {
        Self {
            id,
            username,
            connected_at,
        }
    }
}

/// A user chat message. Once stored in history it is never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub username: Username,
    pub text: String,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn new(username: Username, text: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            username,
            text: text.into(),
            timestamp,
        }
    }
}
