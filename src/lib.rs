//! Issue Tracker - project-scoped issue tracking REST service.
//!
//! A small CRUD service for issue records grouped by project name, backed by
//! SQLite. Clients create, filter, update, and delete issues through
//! `/api/issues/{project}`; logical errors are reported in the response body
//! rather than the status code.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - **Domain layer** (`domain`): the `Issue` model, repository port, errors
//! - **Service layer** (`services`): stateless use-case coordination
//! - **Adapters** (`adapters`): SQLite persistence and the axum HTTP surface
//! - **Infrastructure** (`infrastructure`): configuration loading

pub mod adapters;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::http::{IssuesHttpConfig, IssuesHttpServer};
pub use adapters::sqlite::{create_pool, create_test_pool, Migrator, SqliteIssueRepository};
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{Config, DatabaseConfig, Issue, IssuePatch, LoggingConfig, NewIssue, ServerConfig};
pub use domain::ports::{IssueFilter, IssueRepository};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::IssueService;
