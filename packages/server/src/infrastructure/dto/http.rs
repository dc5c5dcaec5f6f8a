//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::ChatMessageDto;

/// Response of `GET /api/chat/online`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineUsersDto {
    pub users: Vec<String>,
    pub count: usize,
}

/// Response of `GET /debug/chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatStateDto {
    pub users: Vec<String>,
    pub count: usize,
    pub history: Vec<ChatMessageDto>,
}
