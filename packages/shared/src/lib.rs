//! Utilities shared by the Roundtable chat server and client.

pub mod logger;
pub mod time;
