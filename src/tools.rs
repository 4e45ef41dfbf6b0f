//! Operation catalog exposed to the agent runtime
//!
//! One stateless tool per case operation. Input is deserialized into the
//! operation's typed arguments before the operation runs, so a rejected
//! call never reaches the random source.

mod add_documentation;
mod assign_caseworker;
mod check_case_status;
mod create_case;
mod eligibility_criteria;
mod schedule_appointment;
mod update_case;

pub use add_documentation::AddDocumentationTool;
pub use assign_caseworker::AssignCaseworkerTool;
pub use check_case_status::CheckCaseStatusTool;
pub use create_case::CreateCaseTool;
pub use eligibility_criteria::EligibilityCriteriaTool;
pub use schedule_appointment::ScheduleAppointmentTool;
pub use update_case::UpdateCaseTool;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::agent::ToolDefinition;
use crate::cases::{CaseDesk, CaseError, ErrorKind};

/// Outcome of one tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutput {
    pub success: bool,
    /// JSON text of the result, or the error message
    pub output: String,
    /// Structured result when the operation succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl ToolOutput {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            output: data.to_string(),
            data: Some(data),
            error_kind: None,
        }
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
            data: None,
            error_kind: Some(kind),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::error(ErrorKind::InvalidInput, message)
    }

    pub fn cancelled() -> Self {
        Self::error(ErrorKind::Cancelled, "Operation cancelled")
    }

    /// Wrap an operation result
    pub fn completed<T: Serialize>(result: Result<T, CaseError>) -> Self {
        match result {
            Ok(value) => match serde_json::to_value(value) {
                Ok(data) => Self::success(data),
                Err(e) => Self::error(ErrorKind::Fatal, format!("Failed to encode result: {e}")),
            },
            Err(e) => Self::error(e.kind, e.message),
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.error_kind.is_some_and(ErrorKind::is_retryable)
    }
}

/// Deserialize tool input into typed arguments, or an invalid-input output
fn parse_args<T: DeserializeOwned>(input: Value) -> Result<T, ToolOutput> {
    serde_json::from_value(input).map_err(|e| ToolOutput::invalid_input(format!("Invalid input: {e}")))
}

/// Per-call context handed to a tool, built fresh for each invocation
#[derive(Clone)]
pub struct ToolContext {
    /// Cancellation signal; the registry abandons the call when it fires
    pub cancel: CancellationToken,

    /// Identifier the runtime assigned to this call
    pub tool_call_id: String,

    desk: Arc<CaseDesk>,
}

impl ToolContext {
    pub fn new(cancel: CancellationToken, tool_call_id: impl Into<String>, desk: Arc<CaseDesk>) -> Self {
        Self {
            cancel,
            tool_call_id: tool_call_id.into(),
            desk,
        }
    }

    pub fn desk(&self) -> &CaseDesk {
        &self.desk
    }
}

/// A case operation callable by the agent
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name
    fn name(&self) -> &str;

    /// Tool description for the model
    fn description(&self) -> String;

    /// JSON schema of the operation arguments
    fn input_schema(&self) -> Value;

    /// Run the operation; failures come back as an unsuccessful `ToolOutput`
    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput;
}

/// Operations the agent may call, in catalog order
///
/// Tools hold no state; the desk arrives through `ToolContext`
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// The seven case-management tools
    pub fn standard() -> Self {
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(CreateCaseTool),
            Arc::new(CheckCaseStatusTool),
            Arc::new(UpdateCaseTool),
            Arc::new(AssignCaseworkerTool),
            Arc::new(AddDocumentationTool),
            Arc::new(ScheduleAppointmentTool),
            Arc::new(EligibilityCriteriaTool),
        ];
        Self { tools }
    }

    /// Definitions advertised to the model
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name() == name)
    }

    /// Execute a tool by name. `None` if no such tool exists.
    pub async fn execute(&self, name: &str, input: Value, ctx: ToolContext) -> Option<ToolOutput> {
        let tool = self.tools.iter().find(|t| t.name() == name)?;
        let cancel = ctx.cancel.clone();
        let tool_call_id = ctx.tool_call_id.clone();

        let output = tokio::select! {
            biased;
            () = cancel.cancelled() => ToolOutput::cancelled(),
            output = tool.run(input, ctx) => output,
        };

        if output.success {
            tracing::debug!(tool = name, tool_call_id = %tool_call_id, "Tool completed");
        } else {
            tracing::info!(
                tool = name,
                tool_call_id = %tool_call_id,
                error = %output.output,
                retryable = output.is_retryable(),
                "Tool failed"
            );
        }

        Some(output)
    }
}

#[cfg(test)]
pub(crate) fn test_context(policy: crate::cases::FailurePolicy) -> ToolContext {
    use rand::SeedableRng;

    let desk = CaseDesk::new(rand::rngs::StdRng::seed_from_u64(42))
        .with_policy(policy)
        .with_latency(crate::cases::Latency::none());
    ToolContext::new(CancellationToken::new(), "call-1", Arc::new(desk))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::{CaseOperation, FailurePolicy, Latency};
    use serde_json::json;

    #[test]
    fn test_all_operations_registered() {
        let registry = ToolRegistry::standard();
        let defs = registry.definitions();
        assert_eq!(defs.len(), CaseOperation::ALL.len());
        for op in CaseOperation::ALL {
            assert!(registry.contains(op.name()), "Missing {op}");
        }
    }

    #[test]
    fn test_schemas_declare_required_fields() {
        for def in ToolRegistry::standard().definitions() {
            assert_eq!(def.input_schema["type"], "object", "{}", def.name);
            let required = def.input_schema["required"].as_array().unwrap();
            assert!(!required.is_empty(), "{} has no required fields", def.name);
            for field in required {
                let field = field.as_str().unwrap();
                assert!(
                    def.input_schema["properties"][field]["description"].is_string(),
                    "{}.{field} undocumented",
                    def.name
                );
            }
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_returns_none() {
        let registry = ToolRegistry::standard();
        let out = registry
            .execute("deleteCase", json!({}), test_context(FailurePolicy::never()))
            .await;
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_even_when_failure_is_certain() {
        let registry = ToolRegistry::standard();
        let out = registry
            .execute(
                "checkCaseStatus",
                json!({"caseId": 42}),
                test_context(FailurePolicy::always()),
            )
            .await
            .unwrap();
        assert!(!out.success);
        assert_eq!(out.error_kind, Some(ErrorKind::InvalidInput));
        assert!(!out.is_retryable());
    }

    #[tokio::test]
    async fn test_cancelled_call_reports_cancelled() {
        let desk = CaseDesk::new(<rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(1))
            .with_latency(Latency::simulated());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let ctx = ToolContext::new(cancel, "call-9", Arc::new(desk));

        let out = ToolRegistry::standard()
            .execute(
                "createCase",
                json!({
                    "applicantName": "Ana",
                    "dateOfBirth": "1990-01-01",
                    "disabilityType": "Chronic Illness",
                    "description": "Lupus"
                }),
                ctx,
            )
            .await
            .unwrap();
        assert_eq!(out.error_kind, Some(ErrorKind::Cancelled));
    }

    #[test]
    fn test_completed_maps_error_kind() {
        let out = ToolOutput::completed::<Value>(Err(CaseError::transient("busy")));
        assert!(!out.success);
        assert!(out.is_retryable());
        assert_eq!(out.output, "busy");

        let out = ToolOutput::completed(Ok(json!({"caseId": "DC1"})));
        assert!(out.success);
        assert_eq!(out.data.unwrap()["caseId"], "DC1");
    }
}
