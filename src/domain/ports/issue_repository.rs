//! Repository port for issue persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Issue, IssuePatch};

/// Exact-match filters taken verbatim from a query string.
///
/// Each entry pairs a stored field name with its expected value. Entries are
/// combined as a conjunction; a field name the store does not know simply
/// matches nothing rather than raising an error.
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    pub fields: Vec<(String, String)>,
}

impl IssueFilter {
    /// Single-field convenience constructor.
    pub fn field(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            fields: vec![(name.into(), value.into())],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<HashMap<String, String>> for IssueFilter {
    fn from(map: HashMap<String, String>) -> Self {
        Self {
            fields: map.into_iter().collect(),
        }
    }
}

/// Repository port for issue persistence operations.
///
/// Implementations behave like a document collection keyed by an opaque id:
/// lookups by id ignore the project dimension, and a structurally invalid id
/// turns into a catchable error rather than a panic.
#[async_trait]
pub trait IssueRepository: Send + Sync {
    /// Insert a new issue.
    async fn insert(&self, issue: &Issue) -> DomainResult<()>;

    /// Get an issue by id.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Issue>>;

    /// List issues in a project matching every supplied filter field.
    async fn list(&self, project: &str, filter: &IssueFilter) -> DomainResult<Vec<Issue>>;

    /// Apply a partial update to the issue with the given id, stamping
    /// `updated_on`. Fails with `IssueNotFound` when no row matches.
    async fn update(
        &self,
        id: Uuid,
        patch: &IssuePatch,
        updated_on: DateTime<Utc>,
    ) -> DomainResult<()>;

    /// Remove the issue with the given id. Fails with `IssueNotFound` when
    /// no row matches.
    async fn delete(&self, id: Uuid) -> DomainResult<()>;
}
