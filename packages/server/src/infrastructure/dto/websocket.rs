//! WebSocket frame DTOs.
//!
//! Field names are part of the wire contract with browser and terminal clients.

use serde::{Deserialize, Serialize};

/// Value of the `type` field of every server frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    History,
    Message,
    System,
    OnlineUsers,
}

/// Minimal view of a frame used to dispatch on its `type`
#[derive(Debug, Clone, Deserialize)]
pub struct FrameEnvelope {
    pub r#type: MessageType,
}

/// A user chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageDto {
    pub r#type: MessageType,
    pub username: String,
    pub message: String,
    /// RFC 3339
    pub timestamp: String,
}

/// Replay of recent chat messages sent to a newly joined client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub r#type: MessageType,
    pub messages: Vec<ChatMessageDto>,
}

/// Join/leave notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemMessage {
    pub r#type: MessageType,
    pub message: String,
    pub timestamp: String,
    pub online_count: usize,
}

/// Roster snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineUsersMessage {
    pub r#type: MessageType,
    pub users: Vec<String>,
    pub count: usize,
}
