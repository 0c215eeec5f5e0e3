//! Adapters for external systems.

pub mod http;
pub mod sqlite;
