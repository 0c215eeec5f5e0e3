//! Issues HTTP server.
//!
//! Exposes the four issue operations on `/api/issues/{project}`. The contract
//! signals logical failure through the response body only: every response is
//! JSON with status 200, and each operation collapses store-level failures to
//! one fixed error message. Clients are expected to retry on their own.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::domain::models::{Issue, IssuePatch, NewIssue, ServerConfig};
use crate::domain::ports::{IssueFilter, IssueRepository};
use crate::services::IssueService;

/// Configuration for the issues HTTP server.
#[derive(Debug, Clone)]
pub struct IssuesHttpConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Whether to enable CORS.
    pub enable_cors: bool,
}

impl Default for IssuesHttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            enable_cors: true,
        }
    }
}

impl From<&ServerConfig> for IssuesHttpConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            enable_cors: config.enable_cors,
        }
    }
}

/// Request to create a new issue.
#[derive(Debug, Deserialize)]
pub struct CreateIssueRequest {
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
}

impl CreateIssueRequest {
    /// Validate the required fields, defaulting the optional ones.
    /// A required field that is absent or empty fails validation.
    fn into_new_issue(self) -> Option<NewIssue> {
        let issue_title = self.issue_title.filter(|s| !s.is_empty())?;
        let issue_text = self.issue_text.filter(|s| !s.is_empty())?;
        let created_by = self.created_by.filter(|s| !s.is_empty())?;

        Some(NewIssue {
            issue_title,
            issue_text,
            created_by,
            assigned_to: self.assigned_to.unwrap_or_default(),
            status_text: self.status_text.unwrap_or_default(),
        })
    }
}

/// Request to update an issue: the target id plus any subset of fields.
#[derive(Debug, Deserialize)]
pub struct UpdateIssueRequest {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub patch: IssuePatch,
}

/// Request to delete an issue.
#[derive(Debug, Deserialize)]
pub struct DeleteIssueRequest {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
}

/// Response with a full issue record.
#[derive(Debug, Serialize)]
pub struct IssueResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub project: String,
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
    pub open: bool,
    pub created_on: String,
    pub updated_on: String,
}

impl From<Issue> for IssueResponse {
    fn from(issue: Issue) -> Self {
        Self {
            id: issue.id.to_string(),
            project: issue.project,
            issue_title: issue.issue_title,
            issue_text: issue.issue_text,
            created_by: issue.created_by,
            assigned_to: issue.assigned_to,
            status_text: issue.status_text,
            open: issue.open,
            created_on: issue.created_on.to_rfc3339(),
            updated_on: issue.updated_on.to_rfc3339(),
        }
    }
}

/// Result body for a successful update or delete, echoing the id.
#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub result: &'static str,
    #[serde(rename = "_id")]
    pub id: String,
}

/// Error body. The id is echoed whenever one was supplied.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ErrorResponse {
    fn message(error: &'static str) -> Self {
        Self { error, id: None }
    }

    fn with_id(error: &'static str, id: String) -> Self {
        Self {
            error,
            id: Some(id),
        }
    }
}

/// Shared state for the issues HTTP server.
struct AppState<R: IssueRepository> {
    service: IssueService<R>,
}

/// Issues HTTP server.
pub struct IssuesHttpServer<R: IssueRepository + 'static> {
    config: IssuesHttpConfig,
    service: IssueService<R>,
}

impl<R: IssueRepository + 'static> IssuesHttpServer<R> {
    pub fn new(service: IssueService<R>, config: IssuesHttpConfig) -> Self {
        Self { config, service }
    }

    /// Build the router.
    pub fn into_router(self) -> Router {
        let state = Arc::new(AppState {
            service: self.service,
        });

        let app = Router::new()
            .route(
                "/api/issues/{project}",
                get(list_issues::<R>)
                    .post(create_issue::<R>)
                    .put(update_issue::<R>)
                    .delete(delete_issue::<R>),
            )
            .route("/health", get(health_check))
            .with_state(state);

        if self.config.enable_cors {
            app.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(TraceLayer::new_for_http())
        } else {
            app.layer(TraceLayer::new_for_http())
        }
    }

    /// Start the server.
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let router = self.into_router();

        tracing::info!("Issues HTTP server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Start the server with a shutdown signal.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let router = self.into_router();

        tracing::info!("Issues HTTP server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

// Handler functions

async fn health_check() -> &'static str {
    "OK"
}

async fn create_issue<R: IssueRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(project): Path<String>,
    Json(req): Json<CreateIssueRequest>,
) -> Response {
    let Some(fields) = req.into_new_issue() else {
        return Json(ErrorResponse::message("required field(s) missing")).into_response();
    };

    match state.service.create_issue(&project, fields).await {
        Ok(issue) => Json(IssueResponse::from(issue)).into_response(),
        Err(err) => {
            tracing::warn!(%project, error = %err, "issue creation failed");
            Json(ErrorResponse::message("could not create issue")).into_response()
        }
    }
}

async fn list_issues<R: IssueRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(project): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let filter = IssueFilter::from(params);

    match state.service.list_issues(&project, &filter).await {
        Ok(issues) => {
            let issues: Vec<IssueResponse> = issues.into_iter().map(Into::into).collect();
            Json(issues).into_response()
        }
        Err(err) => {
            tracing::warn!(%project, error = %err, "issue listing failed");
            Json(ErrorResponse::message("could not retrieve issues")).into_response()
        }
    }
}

async fn update_issue<R: IssueRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(project): Path<String>,
    Json(req): Json<UpdateIssueRequest>,
) -> Response {
    let Some(id_str) = req.id.filter(|s| !s.is_empty()) else {
        return Json(ErrorResponse::message("missing _id")).into_response();
    };

    if req.patch.is_empty() {
        return Json(ErrorResponse::with_id("no update field(s) sent", id_str)).into_response();
    }

    // A structurally invalid id reports the same way as an unknown one.
    let Ok(id) = Uuid::parse_str(&id_str) else {
        return Json(ErrorResponse::with_id("could not update", id_str)).into_response();
    };

    match state.service.update_issue(id, &req.patch).await {
        Ok(()) => Json(ResultResponse {
            result: "successfully updated",
            id: id_str,
        })
        .into_response(),
        Err(err) => {
            tracing::warn!(%project, %id, error = %err, "issue update failed");
            Json(ErrorResponse::with_id("could not update", id_str)).into_response()
        }
    }
}

async fn delete_issue<R: IssueRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(project): Path<String>,
    Json(req): Json<DeleteIssueRequest>,
) -> Response {
    let Some(id_str) = req.id.filter(|s| !s.is_empty()) else {
        return Json(ErrorResponse::message("missing _id")).into_response();
    };

    let Ok(id) = Uuid::parse_str(&id_str) else {
        return Json(ErrorResponse::with_id("could not delete", id_str)).into_response();
    };

    match state.service.delete_issue(id).await {
        Ok(()) => Json(ResultResponse {
            result: "successfully deleted",
            id: id_str,
        })
        .into_response(),
        Err(err) => {
            tracing::warn!(%project, %id, error = %err, "issue deletion failed");
            Json(ErrorResponse::with_id("could not delete", id_str)).into_response()
        }
    }
}
