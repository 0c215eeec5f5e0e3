//! Issue domain model.
//!
//! An issue is the single tracked unit of work. It belongs to exactly one
//! project for its lifetime and is mutated in place by updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked issue record.
///
/// `id` is assigned exactly once at creation. `created_on` never changes
/// afterwards; `updated_on` is overwritten on every successful mutation,
/// with creation counting as the first one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub project: String,
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
    pub open: bool,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl Issue {
    /// Construct a new issue scoped to `project`.
    ///
    /// Optional fields default to the empty string, `open` defaults to true,
    /// and both timestamps are set to the current time.
    pub fn new(project: impl Into<String>, fields: NewIssue) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project: project.into(),
            issue_title: fields.issue_title,
            issue_text: fields.issue_text,
            created_by: fields.created_by,
            assigned_to: fields.assigned_to,
            status_text: fields.status_text,
            open: true,
            created_on: now,
            updated_on: now,
        }
    }
}

/// Validated input for creating an issue.
///
/// The three required fields are guaranteed non-empty by the time a value of
/// this type exists; the optional ones already carry their defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
}

/// A partial update to an existing issue.
///
/// Only fields that were present in the request are `Some`; absent fields are
/// left untouched by the store. The id and both timestamps are never part of
/// a patch (`updated_on` is stamped by the service).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IssuePatch {
    #[serde(default)]
    pub issue_title: Option<String>,
    #[serde(default)]
    pub issue_text: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub status_text: Option<String>,
    #[serde(default)]
    pub open: Option<bool>,
}

impl IssuePatch {
    /// True when no field was sent at all.
    pub fn is_empty(&self) -> bool {
        self.issue_title.is_none()
            && self.issue_text.is_none()
            && self.created_by.is_none()
            && self.assigned_to.is_none()
            && self.status_text.is_none()
            && self.open.is_none()
    }
}
