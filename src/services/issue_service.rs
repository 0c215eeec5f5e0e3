//! Issue service implementing the tracker's use cases.
//!
//! The service is stateless; every request borrows it and all state lives in
//! the injected repository. Concurrent updates to the same issue race at the
//! store with last-write-wins semantics and are not detected here.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Issue, IssuePatch, NewIssue};
use crate::domain::ports::{IssueFilter, IssueRepository};

pub struct IssueService<R: IssueRepository> {
    repo: Arc<R>,
}

impl<R: IssueRepository> Clone for IssueService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R: IssueRepository> IssueService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Create and persist a new issue in `project`, returning the full
    /// record including its generated id and timestamps.
    pub async fn create_issue(&self, project: &str, fields: NewIssue) -> DomainResult<Issue> {
        let issue = Issue::new(project, fields);
        self.repo.insert(&issue).await?;
        Ok(issue)
    }

    /// List every issue in `project` matching all filter fields exactly.
    pub async fn list_issues(
        &self,
        project: &str,
        filter: &IssueFilter,
    ) -> DomainResult<Vec<Issue>> {
        self.repo.list(project, filter).await
    }

    /// Fetch a single issue by id, ignoring project scope.
    pub async fn get_issue(&self, id: Uuid) -> DomainResult<Option<Issue>> {
        self.repo.get(id).await
    }

    /// Apply a non-empty patch to the issue with the given id, stamping
    /// `updated_on` with the current time. Keyed by id alone; the project
    /// dimension plays no part in targeting.
    pub async fn update_issue(&self, id: Uuid, patch: &IssuePatch) -> DomainResult<()> {
        self.repo.update(id, patch, Utc::now()).await
    }

    /// Hard-delete the issue with the given id.
    pub async fn delete_issue(&self, id: Uuid) -> DomainResult<()> {
        self.repo.delete(id).await
    }
}
