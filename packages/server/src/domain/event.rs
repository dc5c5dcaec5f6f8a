//! Events delivered to chat clients.

use super::{
    entity::ChatMessage,
    value_object::{Timestamp, Username},
};

/// Everything the server pushes to a connected client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// Bulk replay of recent messages for a newly joined client
    History(Vec<ChatMessage>),
    /// A user chat message
    Message(ChatMessage),
    /// Join/leave notice
    System {
        text: String,
        timestamp: Timestamp,
        online_count: usize,
    },
    /// Snapshot of who is online
    OnlineUsers(Vec<Username>),
}

impl ChatEvent {
    pub fn joined(username: &Username, timestamp: Timestamp, online_count: usize) -> Self {
        Self::System {
            text: format!("{} joined the chat", username),
            timestamp,
            online_count,
        }
    }

    pub fn left(username: &Username, timestamp: Timestamp, online_count: usize) -> Self {
        Self::System {
            text: format!("{} left the chat", username),
            timestamp,
            online_count,
        }
    }

    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::History(_) => "history",
            Self::Message(_) => "message",
            Self::System { .. } => "system",
            Self::OnlineUsers(_) => "online_users",
        }
    }
}
