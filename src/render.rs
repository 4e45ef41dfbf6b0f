//! Result presentation
//!
//! Maps a tool part to a [`ToolBlock`]: header, input, and a body that is
//! either a rendering plan, the error text, or nothing. Only a completed
//! part has its output decoded.

mod envelope;
mod plan;
mod text;

pub use envelope::{unwrap_tool_output, RenderError};
pub use plan::{plan_for, status_tone, Block, RenderPlan, Tone};
pub use text::render_message;

use crate::cases::CaseOperation;
use crate::chat::{ToolPart, ToolState};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum ToolBody {
    /// Input still streaming or the call is running
    Pending,
    Plan(RenderPlan),
    Error(String),
    /// Output missing or undecodable
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolBlock {
    pub operation: CaseOperation,
    pub state: ToolState,
    pub input: Option<Value>,
    pub body: ToolBody,
}

impl ToolBlock {
    pub fn header(&self) -> String {
        format!("{} - {}", self.operation, self.state.label())
    }
}

/// `None` for tools outside the case catalog
pub fn render_tool_part(part: &ToolPart) -> Option<ToolBlock> {
    let operation = CaseOperation::from_name(&part.tool_name)?;

    let body = match part.state {
        ToolState::InputStreaming | ToolState::InputAvailable => ToolBody::Pending,
        ToolState::OutputError => ToolBody::Error(part.error_text.clone().unwrap_or_default()),
        ToolState::OutputAvailable => match unwrap_tool_output(part.output.as_ref()) {
            Ok(data) => ToolBody::Plan(plan_for(operation, &data)),
            Err(e) => {
                tracing::debug!(tool_call_id = %part.tool_call_id, error = %e, "Tool output not rendered");
                ToolBody::Empty
            }
        },
    };

    Some(ToolBlock {
        operation,
        state: part.state,
        input: part.input.clone().filter(|v| !v.is_null()),
        body,
    })
}
