//! Service layer coordinating domain logic.

pub mod issue_service;

pub use issue_service::IssueService;
