//! Server state shared by every handler.

use std::sync::Arc;

use crate::usecase::{
    ConnectParticipantUseCase, DisconnectParticipantUseCase, GetChatStateUseCase,
    GetOnlineUsersUseCase, SendMessageUseCase,
};

/// Shared application state
pub struct AppState {
    /// Brings new connections online
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// Cleans up after closed connections
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// Records and fans out chat messages
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub get_online_users_usecase: Arc<GetOnlineUsersUseCase>,
    pub get_chat_state_usecase: Arc<GetChatStateUseCase>,
}
