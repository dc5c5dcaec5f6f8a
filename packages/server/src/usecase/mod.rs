//! UseCase layer: orchestrates registry operations for the transport handlers.

pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod get_chat_state;
pub mod get_online_users;
pub mod send_message;

pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::ConnectError;
pub use get_chat_state::{ChatSnapshot, GetChatStateUseCase};
pub use get_online_users::GetOnlineUsersUseCase;
pub use send_message::SendMessageUseCase;
