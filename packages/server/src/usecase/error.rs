//! UseCase error types.

use thiserror::Error;

use crate::domain::{ConnectionId, RegistryError};

/// Errors raised while bringing a new participant online
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// The transport handed over a connection id that is already live
    #[error("connection '{0}' is already registered")]
    DuplicateConnection(ConnectionId),

    /// The new connection went away before its welcome frames were delivered
    #[error("failed to welcome connection: {0}")]
    Delivery(RegistryError),
}

impl From<RegistryError> for ConnectError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::DuplicateConnection(id) => Self::DuplicateConnection(id),
            other => Self::Delivery(other),
        }
    }
}
