//! Configuration handed to the external durable-agent runtime
//!
//! The runtime owns model invocation, retries and streaming. This module
//! only describes the agent it should build: model, system prompt, tools.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_MODEL: &str = "bedrock/claude-4-sonnet-20250514-v1";

pub const SYSTEM_PROMPT: &str = "\
You are a helpful and compassionate disability case management assistant. You help applicants and caseworkers with:
- Creating new disability benefit cases
- Checking the status of existing cases
- Updating case information
- Assigning or reassigning caseworkers
- Adding documentation to cases
- Scheduling appointments (consultations, examinations, hearings)
- Understanding eligibility criteria for different disability types

Be empathetic, professional, and thorough. When creating new cases, ensure you have all required information.
When checking case status, explain what each status means and what the next steps are.
Always provide clear guidance on required documentation and timelines.
If an applicant seems distressed, acknowledge their feelings and provide reassurance about the process.

Important: Always protect applicant privacy. Do not share case details without proper verification.";

/// Tool definition as advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Everything the runtime needs to construct the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    pub model: String,
    pub system: String,
    pub tools: Vec<ToolDefinition>,
}

impl AgentSpec {
    pub fn new(model: impl Into<String>, tools: Vec<ToolDefinition>) -> Self {
        Self {
            model: model.into(),
            system: SYSTEM_PROMPT.to_string(),
            tools,
        }
    }
}
