//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    infrastructure::dto::{
        http::{ChatStateDto, OnlineUsersDto},
        websocket::ChatMessageDto,
    },
    ui::state::AppState,
};

/// Currently online users
pub async fn online_users(State(state): State<Arc<AppState>>) -> Json<OnlineUsersDto> {
    let users = state.get_online_users_usecase.execute().await;
    Json(OnlineUsersDto::from(users))
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Debug endpoint exposing online users and stored history
pub async fn debug_chat_state(State(state): State<Arc<AppState>>) -> Json<ChatStateDto> {
    let snapshot = state.get_chat_state_usecase.execute().await;

    // domain -> DTO
    let users = OnlineUsersDto::from(snapshot.users);
    Json(ChatStateDto {
        users: users.users,
        count: users.count,
        history: snapshot.history.iter().map(ChatMessageDto::from).collect(),
    })
}
