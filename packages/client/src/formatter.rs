//! Message formatting utilities for client display.

use roundtable_server::infrastructure::dto::websocket::{
    ChatMessageDto, FrameEnvelope, HistoryMessage, MessageType, OnlineUsersMessage, SystemMessage,
};
use roundtable_shared::time::rfc3339_to_clock_time;

const RULE: &str = "============================================================";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format any text frame received from the server
    ///
    /// Frames that do not match a known shape are shown raw.
    ///
    /// # Arguments
    ///
    /// * `text` - The raw frame text
    /// * `me` - The current client's username (to mark as "me")
    pub fn format_frame(text: &str, me: &str) -> String {
        let Ok(envelope) = serde_json::from_str::<FrameEnvelope>(text) else {
            return Self::format_raw_message(text);
        };

        let formatted = match envelope.r#type {
            MessageType::History => serde_json::from_str::<HistoryMessage>(text)
                .map(|history| Self::format_history(&history.messages, me)),
            MessageType::Message => serde_json::from_str::<ChatMessageDto>(text)
                .map(|message| Self::format_chat_message(&message, me)),
            MessageType::System => serde_json::from_str::<SystemMessage>(text)
                .map(|system| Self::format_system(&system)),
            MessageType::OnlineUsers => serde_json::from_str::<OnlineUsersMessage>(text)
                .map(|online| Self::format_online_users(&online, me)),
        };

        formatted.unwrap_or_else(|_| Self::format_raw_message(text))
    }

    /// Format the history replay received right after joining
    pub fn format_history(messages: &[ChatMessageDto], me: &str) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{}\n", RULE));
        output.push_str(&format!("Recent messages ({}):\n", messages.len()));
        for message in messages {
            output.push_str(&Self::chat_line(message, me));
            output.push('\n');
        }
        output.push_str(&format!("{}\n", RULE));
        output
    }

    /// Format a chat message
    pub fn format_chat_message(message: &ChatMessageDto, me: &str) -> String {
        format!("\n{}\n", Self::chat_line(message, me))
    }

    /// Format a join/leave notice
    pub fn format_system(system: &SystemMessage) -> String {
        format!(
            "\n* [{}] {} ({} online)\n",
            rfc3339_to_clock_time(&system.timestamp),
            system.message,
            system.online_count
        )
    }

    /// Format the roster snapshot
    pub fn format_online_users(online: &OnlineUsersMessage, me: &str) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{}\n", RULE));
        output.push_str(&format!("Online ({}):\n", online.count));
        if online.users.is_empty() {
            output.push_str("(No one)\n");
        }
        let mut marked_me = false;
        for user in &online.users {
            // Usernames are not unique; only mark the first match
            if user == me && !marked_me {
                marked_me = true;
                output.push_str(&format!("{} (me)\n", user));
            } else {
                output.push_str(&format!("{}\n", user));
            }
        }
        output.push_str(&format!("{}\n", RULE));
        output
    }

    /// Format a frame that could not be parsed
    pub fn format_raw_message(text: &str) -> String {
        format!("\n{}\n", text)
    }

    fn chat_line(message: &ChatMessageDto, me: &str) -> String {
        let me_suffix = if message.username == me { " (me)" } else { "" };
        format!(
            "[{}] @{}{}: {}",
            rfc3339_to_clock_time(&message.timestamp),
            message.username,
            me_suffix,
            message.message
        )
    }
}
