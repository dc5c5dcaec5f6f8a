//! Domain layer: chat entities, value objects and the session registry contract.

pub mod entity;
pub mod error;
pub mod event;
pub mod history;
pub mod registry;
pub mod value_object;

pub use entity::{ChatMessage, Connection};
pub use error::RegistryError;
pub use event::ChatEvent;
pub use history::MessageHistory;
pub use registry::{BroadcastOutcome, PusherChannel, RegisteredSession, SessionRegistry};
pub use value_object::{ConnectionId, Timestamp, Username};
