//! REST API endpoints for the somnair-service.
//!
//! # Endpoints
//!
//! - `GET /api/health` - Service health check
//! - `GET /api/tools` - Tool declarations for an agent
//! - `POST /api/tools/{name}` - Run a tool; the body is its JSON arguments
//! - `GET /api/observations` - Stored observations with filters
//! - `GET /api/session` - Current conversation session
//! - `POST /api/session` - Open (or reuse) a session for a credential
//! - `DELETE /api/session` - Discard the session
//! - `POST /api/session/messages` - Append a message to the session
//!
//! ## Error Handling
//!
//! Tool calls always answer with a tool envelope and HTTP 200, failures
//! included, so an agent can read the error and phrase a reply. Only an
//! unknown tool name answers 404. Other endpoints return `{"error": ...}`
//! via [`AppError`].

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::info;

use somnair_store::{Observation, ObservationQuery};
use somnair_types::ValidationError;

use crate::session::{ChatMessage, Role, SessionChange, SessionContext};
use crate::state::AppState;
use crate::tools::{self, ToolDeclaration, ToolError};

/// Create the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health))
        // Tool surface
        .route("/api/tools", get(list_tools))
        .route("/api/tools/{name}", post(call_tool))
        // Data
        .route("/api/observations", get(list_observations))
        // Session
        .route(
            "/api/session",
            get(get_session).post(open_session).delete(reset_session),
        )
        .route("/api/session/messages", post(post_message))
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
    })
}

/// Tool listing response.
#[derive(Debug, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolDeclaration>,
}

async fn list_tools() -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: tools::tool_declarations(),
    })
}

/// Run a tool.
///
/// An empty body means no arguments. A body that is not JSON yields a
/// `validation_error` envelope.
async fn call_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    if !tools::is_known_tool(&name) {
        let envelope = tools::error_envelope(&ToolError::UnknownTool(name));
        return (StatusCode::NOT_FOUND, Json(envelope)).into_response();
    }

    let args = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(args) => args,
            Err(_) => {
                let err = ToolError::Validation(ValidationError::InvalidType {
                    field: "arguments".to_string(),
                    expected: "a JSON object",
                });
                return Json(tools::error_envelope(&err)).into_response();
            }
        }
    };

    Json(state.tools.dispatch(&name, &args).await).into_response()
}

/// Query parameters for observations. Times are Unix timestamps.
#[derive(Debug, Deserialize, Default)]
pub struct ObservationsQuery {
    pub since: Option<i64>,
    pub until: Option<i64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ObservationsQuery {
    /// Validate the query parameters.
    /// Returns an error if `since > until` or a time is out of range.
    pub fn validate(&self) -> Result<(), AppError> {
        if let (Some(since), Some(until)) = (self.since, self.until)
            && since > until
        {
            return Err(AppError::BadRequest(format!(
                "Invalid time range: 'since' ({}) must be less than or equal to 'until' ({})",
                since, until
            )));
        }
        for (name, value) in [("since", self.since), ("until", self.until)] {
            if let Some(ts) = value
                && OffsetDateTime::from_unix_timestamp(ts).is_err()
            {
                return Err(AppError::BadRequest(format!(
                    "Invalid '{}' timestamp: {}",
                    name, ts
                )));
            }
        }
        Ok(())
    }
}

/// Paginated response wrapper with metadata.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    /// The data items.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Pagination metadata.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    /// Number of items returned.
    pub count: usize,
    /// Offset from the beginning.
    pub offset: u32,
    /// Maximum items requested (if specified).
    pub limit: Option<u32>,
    /// Whether there are more items available.
    pub has_more: bool,
}

/// List stored observations, newest first.
async fn list_observations(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ObservationsQuery>,
) -> Result<Json<PaginatedResponse<Observation>>, AppError> {
    params.validate()?;

    let mut query = ObservationQuery::new();
    if let Some(dt) = params
        .since
        .and_then(|ts| OffsetDateTime::from_unix_timestamp(ts).ok())
    {
        query = query.since(dt);
    }
    if let Some(dt) = params
        .until
        .and_then(|ts| OffsetDateTime::from_unix_timestamp(ts).ok())
    {
        query = query.until(dt);
    }
    // Fetch one extra row to learn whether another page exists.
    if let Some(limit) = params.limit {
        query = query.limit(limit.saturating_add(1));
    }
    if let Some(offset) = params.offset {
        query = query.offset(offset);
    }

    let mut observations = state.store().query_observations(&query)?;
    let has_more = match params.limit {
        Some(limit) if observations.len() > limit as usize => {
            observations.truncate(limit as usize);
            true
        }
        _ => false,
    };

    Ok(Json(PaginatedResponse {
        pagination: PaginationMeta {
            count: observations.len(),
            offset: params.offset.unwrap_or(0),
            limit: params.limit,
            has_more,
        },
        data: observations,
    }))
}

/// Session snapshot. Never contains the credential.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub active: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    pub message_count: usize,
    pub history: Vec<ChatMessage>,
}

impl SessionResponse {
    fn from_context(session: Option<&SessionContext>) -> Self {
        match session {
            Some(s) => Self {
                active: true,
                created_at: Some(s.created_at()),
                message_count: s.history().len(),
                history: s.history().to_vec(),
            },
            None => Self {
                active: false,
                created_at: None,
                message_count: 0,
                history: Vec::new(),
            },
        }
    }
}

/// Response of session-changing requests.
#[derive(Debug, Serialize)]
pub struct SessionChangeResponse {
    pub change: SessionChange,
    pub session: SessionResponse,
}

/// Request to open a session.
#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    pub api_key: String,
}

/// Request to append a message.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub api_key: String,
    pub role: Role,
    pub content: String,
}

fn require_key(api_key: &str) -> Result<(), AppError> {
    if api_key.trim().is_empty() {
        return Err(AppError::BadRequest("api_key cannot be empty".to_string()));
    }
    Ok(())
}

async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    let slot = state.session.read().await;
    Json(SessionResponse::from_context(slot.current()))
}

async fn open_session(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OpenSessionRequest>,
) -> Result<Json<SessionChangeResponse>, AppError> {
    require_key(&request.api_key)?;

    let mut slot = state.session.write().await;
    let (session, change) = slot.ensure(&request.api_key);
    if change != SessionChange::Reused {
        info!("Session {:?}", change);
    }
    Ok(Json(SessionChangeResponse {
        change,
        session: SessionResponse::from_context(Some(&*session)),
    }))
}

/// Reset response.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub reset: bool,
}

async fn reset_session(State(state): State<Arc<AppState>>) -> Json<ResetResponse> {
    let reset = state.session.write().await.reset();
    if reset {
        info!("Session reset");
    }
    Json(ResetResponse { reset })
}

async fn post_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<SessionChangeResponse>, AppError> {
    require_key(&request.api_key)?;
    if request.content.trim().is_empty() {
        return Err(AppError::BadRequest("content cannot be empty".to_string()));
    }

    let mut slot = state.session.write().await;
    let (session, change) = slot.ensure(&request.api_key);
    if change != SessionChange::Reused {
        info!("Session {:?}", change);
    }
    session.push(request.role, request.content);
    Ok(Json(SessionChangeResponse {
        change,
        session: SessionResponse::from_context(Some(&*session)),
    }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Store(somnair_store::Error),
}

impl From<somnair_store::Error> for AppError {
    fn from(e: somnair_store::Error) -> Self {
        AppError::Store(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}
