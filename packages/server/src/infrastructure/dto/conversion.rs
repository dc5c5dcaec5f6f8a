//! Conversion logic between domain entities and wire DTOs.

use roundtable_shared::time::timestamp_to_rfc3339;

use crate::domain::{ChatEvent, ChatMessage, Username};
use crate::infrastructure::dto::{
    http::OnlineUsersDto,
    websocket::{ChatMessageDto, HistoryMessage, MessageType, OnlineUsersMessage, SystemMessage},
};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&ChatMessage> for ChatMessageDto {
    fn from(model: &ChatMessage) -> Self {
        Self {
            r#type: MessageType::Message,
            username: model.username.as_str().to_string(),
            message: model.text.clone(),
            timestamp: timestamp_to_rfc3339(model.timestamp.value()),
        }
    }
}

impl From<Vec<Username>> for OnlineUsersDto {
    fn from(users: Vec<Username>) -> Self {
        let users: Vec<String> = users.into_iter().map(Username::into_string).collect();
        Self {
            count: users.len(),
            users,
        }
    }
}

/// Encode a chat event as the JSON text frame clients expect
pub fn encode_event(event: &ChatEvent) -> Result<String, serde_json::Error> {
    match event {
        ChatEvent::History(messages) => serde_json::to_string(&HistoryMessage {
            r#type: MessageType::History,
            messages: messages.iter().map(ChatMessageDto::from).collect(),
        }),
        ChatEvent::Message(message) => serde_json::to_string(&ChatMessageDto::from(message)),
        ChatEvent::System {
            text,
            timestamp,
            online_count,
        } => serde_json::to_string(&SystemMessage {
            r#type: MessageType::System,
            message: text.clone(),
            timestamp: timestamp_to_rfc3339(timestamp.value()),
            online_count: *online_count,
        }),
        ChatEvent::OnlineUsers(users) => serde_json::to_string(&OnlineUsersMessage {
            r#type: MessageType::OnlineUsers,
            users: users.iter().map(|u| u.as_str().to_string()).collect(),
            count: users.len(),
        }),
    }
}
