//! Terminal client for the Roundtable live chat server.

pub mod error;
pub mod formatter;
pub mod runner;
pub mod session;
mod ui;

pub use runner::{ReconnectPolicy, run_client};
