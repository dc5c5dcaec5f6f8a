//! Domain error types.

use thiserror::Error;

use super::value_object::ConnectionId;

/// Errors reported by a [`SessionRegistry`](super::SessionRegistry)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The connection id is already registered
    #[error("connection '{0}' is already registered")]
    DuplicateConnection(ConnectionId),

    /// The connection id is not (or no longer) registered
    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(ConnectionId),

    /// The connection's outbound channel is closed; it has been dropped
    #[error("failed to deliver frame to connection '{0}'")]
    DeliveryFailed(ConnectionId),

    /// The event could not be encoded as a wire frame
    #[error("failed to encode frame: {0}")]
    Encode(String),
}
