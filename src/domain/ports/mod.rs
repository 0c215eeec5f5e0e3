//! Ports (trait interfaces) the adapters implement.

pub mod issue_repository;

pub use issue_repository::{IssueFilter, IssueRepository};
