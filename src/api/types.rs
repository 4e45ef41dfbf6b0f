//! API request and response types

use crate::agent::ToolDefinition;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request to invoke one tool
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeToolRequest {
    /// Call id assigned by the runtime; generated when absent
    #[serde(default)]
    pub tool_call_id: Option<String>,
    #[serde(default)]
    pub input: Value,
}

/// Successful tool invocation
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeToolResponse {
    pub tool_call_id: String,
    pub output: Value,
}

/// Response with the tool catalog
#[derive(Debug, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolDefinition>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
    pub retryable: bool,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, kind: impl Into<String>, retryable: bool) -> Self {
        Self {
            error: message.into(),
            kind: kind.into(),
            retryable,
        }
    }
}
