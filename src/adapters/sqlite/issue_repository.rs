//! SQLite implementation of the `IssueRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Issue, IssuePatch};
use crate::domain::ports::{IssueFilter, IssueRepository};

#[derive(Clone)]
pub struct SqliteIssueRepository {
    pool: SqlitePool,
}

impl SqliteIssueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// A positional bind value for dynamically assembled queries.
enum Bind {
    Text(String),
    Int(i64),
}

/// Outcome of translating one query-string filter entry into SQL.
///
/// Filter fields that do not name a stored column, and values that cannot
/// exist in the column they target (a non-boolean `open`, a malformed `_id`),
/// match nothing rather than erroring.
enum FilterClause {
    Column(&'static str, Bind),
    NoMatch,
}

fn translate_filter(field: &str, value: &str) -> FilterClause {
    match field {
        "_id" => match Uuid::parse_str(value) {
            Ok(id) => FilterClause::Column("id", Bind::Text(id.to_string())),
            Err(_) => FilterClause::NoMatch,
        },
        "open" => match value {
            "true" => FilterClause::Column("open", Bind::Int(1)),
            "false" => FilterClause::Column("open", Bind::Int(0)),
            _ => FilterClause::NoMatch,
        },
        "project" => FilterClause::Column("project", Bind::Text(value.to_string())),
        "issue_title" => FilterClause::Column("issue_title", Bind::Text(value.to_string())),
        "issue_text" => FilterClause::Column("issue_text", Bind::Text(value.to_string())),
        "created_by" => FilterClause::Column("created_by", Bind::Text(value.to_string())),
        "assigned_to" => FilterClause::Column("assigned_to", Bind::Text(value.to_string())),
        "status_text" => FilterClause::Column("status_text", Bind::Text(value.to_string())),
        "created_on" => FilterClause::Column("created_on", Bind::Text(value.to_string())),
        "updated_on" => FilterClause::Column("updated_on", Bind::Text(value.to_string())),
        _ => FilterClause::NoMatch,
    }
}

#[async_trait]
impl IssueRepository for SqliteIssueRepository {
    async fn insert(&self, issue: &Issue) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO issues (id, project, issue_title, issue_text, created_by,
               assigned_to, status_text, open, created_on, updated_on)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(issue.id.to_string())
        .bind(&issue.project)
        .bind(&issue.issue_title)
        .bind(&issue.issue_text)
        .bind(&issue.created_by)
        .bind(&issue.assigned_to)
        .bind(&issue.status_text)
        .bind(i64::from(issue.open))
        .bind(issue.created_on.to_rfc3339())
        .bind(issue.updated_on.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Issue>> {
        let row: Option<IssueRow> = sqlx::query_as("SELECT * FROM issues WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list(&self, project: &str, filter: &IssueFilter) -> DomainResult<Vec<Issue>> {
        let mut query = String::from("SELECT * FROM issues WHERE project = ?");
        let mut bindings = vec![Bind::Text(project.to_string())];

        for (field, value) in &filter.fields {
            match translate_filter(field, value) {
                FilterClause::Column(column, bind) => {
                    query.push_str(" AND ");
                    query.push_str(column);
                    query.push_str(" = ?");
                    bindings.push(bind);
                }
                FilterClause::NoMatch => return Ok(Vec::new()),
            }
        }

        query.push_str(" ORDER BY created_on");

        let mut q = sqlx::query_as::<_, IssueRow>(&query);
        for binding in &bindings {
            q = match binding {
                Bind::Text(s) => q.bind(s),
                Bind::Int(i) => q.bind(i),
            };
        }

        let rows: Vec<IssueRow> = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &IssuePatch,
        updated_on: DateTime<Utc>,
    ) -> DomainResult<()> {
        let mut sets = vec!["updated_on = ?"];
        let mut bindings = vec![Bind::Text(updated_on.to_rfc3339())];

        if let Some(v) = &patch.issue_title {
            sets.push("issue_title = ?");
            bindings.push(Bind::Text(v.clone()));
        }
        if let Some(v) = &patch.issue_text {
            sets.push("issue_text = ?");
            bindings.push(Bind::Text(v.clone()));
        }
        if let Some(v) = &patch.created_by {
            sets.push("created_by = ?");
            bindings.push(Bind::Text(v.clone()));
        }
        if let Some(v) = &patch.assigned_to {
            sets.push("assigned_to = ?");
            bindings.push(Bind::Text(v.clone()));
        }
        if let Some(v) = &patch.status_text {
            sets.push("status_text = ?");
            bindings.push(Bind::Text(v.clone()));
        }
        if let Some(v) = patch.open {
            sets.push("open = ?");
            bindings.push(Bind::Int(i64::from(v)));
        }

        let query = format!("UPDATE issues SET {} WHERE id = ?", sets.join(", "));

        let mut q = sqlx::query(&query);
        for binding in &bindings {
            q = match binding {
                Bind::Text(s) => q.bind(s),
                Bind::Int(i) => q.bind(i),
            };
        }
        let result = q.bind(id.to_string()).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::IssueNotFound(id));
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM issues WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::IssueNotFound(id));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct IssueRow {
    id: String,
    project: String,
    issue_title: String,
    issue_text: String,
    created_by: String,
    assigned_to: String,
    status_text: String,
    open: i64,
    created_on: String,
    updated_on: String,
}

impl TryFrom<IssueRow> for Issue {
    type Error = DomainError;

    fn try_from(row: IssueRow) -> Result<Self, Self::Error> {
        Ok(Issue {
            id: parse_uuid(&row.id)?,
            project: row.project,
            issue_title: row.issue_title,
            issue_text: row.issue_text,
            created_by: row.created_by,
            assigned_to: row.assigned_to,
            status_text: row.status_text,
            open: row.open != 0,
            created_on: parse_datetime(&row.created_on)?,
            updated_on: parse_datetime(&row.updated_on)?,
        })
    }
}
