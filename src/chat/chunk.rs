//! UI message stream chunks
//!
//! One JSON object per SSE `data:` line. Chunk kinds this client does not
//! act on deserialize to [`UiChunk::Unknown`] and are skipped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UiChunk {
    #[serde(rename_all = "camelCase")]
    Start {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message_id: Option<String>,
    },
    StartStep,
    FinishStep,

    TextStart {
        id: String,
    },
    TextDelta {
        id: String,
        delta: String,
    },
    TextEnd {
        id: String,
    },

    #[serde(rename_all = "camelCase")]
    ToolInputStart {
        tool_call_id: String,
        tool_name: String,
    },
    #[serde(rename_all = "camelCase")]
    ToolInputDelta {
        tool_call_id: String,
        input_text_delta: String,
    },
    #[serde(rename_all = "camelCase")]
    ToolInputAvailable {
        tool_call_id: String,
        tool_name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(rename_all = "camelCase")]
    ToolOutputAvailable {
        tool_call_id: String,
        #[serde(default)]
        output: Value,
    },
    #[serde(rename_all = "camelCase")]
    ToolOutputError {
        tool_call_id: String,
        error_text: String,
    },

    /// Workflow status ping; an `id` makes later pings replace earlier ones
    DataWorkflow {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default)]
        data: Value,
    },

    #[serde(rename_all = "camelCase")]
    Error {
        error_text: String,
    },
    Finish,
    Abort,

    #[serde(other)]
    Unknown,
}

impl UiChunk {
    /// Chunks that end the turn
    pub fn is_terminal(&self) -> bool {
        matches!(self, UiChunk::Finish | UiChunk::Abort | UiChunk::Error { .. })
    }
}
