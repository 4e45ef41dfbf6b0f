//! HTTP request handlers

use super::types::{ErrorResponse, InvokeToolRequest, InvokeToolResponse, ToolsResponse};
use super::AppState;
use crate::agent::AgentSpec;
use crate::cases::ErrorKind;
use crate::tools::{ToolContext, ToolOutput};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Agent configuration for the runtime
        .route("/api/agent", get(get_agent))
        // Operation catalog
        .route("/api/tools", get(list_tools))
        .route("/api/tools/:name", post(invoke_tool))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Agent & Catalog
// ============================================================

async fn get_agent(State(state): State<AppState>) -> Json<AgentSpec> {
    Json(state.agent.as_ref().clone())
}

async fn list_tools(State(state): State<AppState>) -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: state.registry.definitions(),
    })
}

// ============================================================
// Tool Invocation
// ============================================================

async fn invoke_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Result<Json<InvokeToolRequest>, JsonRejection>,
) -> Result<Json<InvokeToolResponse>, AppError> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let tool_call_id = request
        .tool_call_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    tracing::info!(tool = %name, tool_call_id = %tool_call_id, "Invoking tool");

    let ctx = ToolContext::new(
        state.shutdown.child_token(),
        tool_call_id.clone(),
        state.desk.clone(),
    );
    let output = state
        .registry
        .execute(&name, request.input, ctx)
        .await
        .ok_or_else(|| AppError::UnknownTool(name))?;

    if !output.success {
        return Err(AppError::Tool(output));
    }

    Ok(Json(InvokeToolResponse {
        tool_call_id,
        output: output.data.unwrap_or_default(),
    }))
}

async fn get_version() -> &'static str {
    concat!("case-desk ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    UnknownTool(String),
    /// A tool ran and failed
    Tool(ToolOutput),
}

fn tool_status(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::Fatal => StatusCode::CONFLICT,
        ErrorKind::Transient | ErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn kind_name(kind: ErrorKind) -> String {
    serde_json::to_value(kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(msg, kind_name(ErrorKind::InvalidInput), false),
            ),
            AppError::UnknownTool(name) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new(format!("Unknown tool: {name}"), "unknown_tool", false),
            ),
            AppError::Tool(output) => {
                let kind = output.error_kind.unwrap_or(ErrorKind::Fatal);
                let retryable = output.is_retryable();
                (
                    tool_status(kind),
                    ErrorResponse::new(output.output, kind_name(kind), retryable),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
