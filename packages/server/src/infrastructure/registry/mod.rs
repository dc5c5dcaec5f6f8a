//! Session registry implementations.
//!
//! - `inmemory`: process-local registry behind a single mutex

pub mod inmemory;

pub use inmemory::InMemorySessionRegistry;
