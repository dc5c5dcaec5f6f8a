//! Request handlers.

mod http;
mod websocket;

pub use http::{debug_chat_state, health_check, online_users};
pub use websocket::websocket_handler;
