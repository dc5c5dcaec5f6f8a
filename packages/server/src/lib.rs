//! Roundtable live chat server library.
//!
//! The server keeps a registry of live WebSocket sessions, broadcasts chat
//! messages and join/leave notices to them, and replays a bounded message
//! history to newly connected clients.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
