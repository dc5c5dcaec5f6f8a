//! Session registry trait.
//!
//! The registry is the single authoritative store of live chat sessions and
//! the bounded message history. Use cases depend on this trait; the
//! infrastructure layer provides the implementation.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{
    entity::ChatMessage,
    error::RegistryError,
    event::ChatEvent,
    value_object::{ConnectionId, Timestamp, Username},
};

/// Per-connection outbound channel.
///
/// Frames pushed here are written to the socket by the connection's own
/// writer task, so a push never waits on the network.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Result of a successful registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredSession {
    pub connection_id: ConnectionId,
    pub username: Username,
    pub connected_at: Timestamp,
    /// Registry size right after the join
    pub online_count: usize,
    /// History entries already queued on the new connection
    pub replay: Vec<ChatMessage>,
}

/// What happened during one broadcast pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    /// Connections the frame was handed to
    pub delivered: usize,
    /// Connections dropped because their channel was closed
    pub evicted: usize,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Register an accepted connection and announce it to everyone else.
    ///
    /// A non-empty replay slice is queued on the new channel as a history
    /// frame before the connection can receive any other traffic. The join
    /// notice carries the post-join online count and is not sent to the new
    /// connection itself.
    async fn register(
        &self,
        connection_id: ConnectionId,
        username: Username,
        channel: PusherChannel,
    ) -> Result<RegisteredSession, RegistryError>;

    /// Remove a connection, returning its username if it was registered.
    ///
    /// Idempotent; never broadcasts.
    async fn unregister(&self, connection_id: ConnectionId) -> Option<Username>;

    /// Deliver an event to every connection except `exclude`.
    ///
    /// Connections whose channel is closed are removed during the pass.
    async fn broadcast(&self, event: &ChatEvent, exclude: Option<ConnectionId>)
    -> BroadcastOutcome;

    /// Deliver an event to exactly one connection
    async fn send_to(
        &self,
        connection_id: ConnectionId,
        event: &ChatEvent,
    ) -> Result<(), RegistryError>;

    /// Append a message to the bounded history
    async fn record_history(&self, message: ChatMessage);

    /// Full history in append order
    async fn history(&self) -> Vec<ChatMessage>;

    /// Online usernames in registration order
    async fn list_online_usernames(&self) -> Vec<Username>;

    async fn online_count(&self) -> usize;
}
