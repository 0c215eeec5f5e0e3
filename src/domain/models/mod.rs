//! Domain models for the issue tracker.

pub mod config;
pub mod issue;

pub use config::{Config, DatabaseConfig, LoggingConfig, ServerConfig};
pub use issue::{Issue, IssuePatch, NewIssue};
