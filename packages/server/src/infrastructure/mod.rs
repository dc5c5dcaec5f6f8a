//! Infrastructure layer: wire DTOs and the in-memory session registry.

pub mod dto;
pub mod registry;
