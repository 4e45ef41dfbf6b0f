//! checkCaseStatus - report on an existing case
//!
//! Backed by an unreliable status service; failures are transient and
//! expected to be retried by the runtime.

use super::{parse_args, Tool, ToolContext, ToolOutput};
use crate::cases::{CaseLookupArgs, CaseOperation};
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct CheckCaseStatusTool;

#[async_trait]
impl Tool for CheckCaseStatusTool {
    fn name(&self) -> &'static str {
        CaseOperation::CheckCaseStatus.name()
    }

    fn description(&self) -> String {
        "Check the current status of an existing disability case".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["caseId"],
            "properties": {
                "caseId": {
                    "type": "string",
                    "description": "The case ID (e.g., DC123ABC)"
                }
            }
        })
    }

    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput {
        let args: CaseLookupArgs = match parse_args(input) {
            Ok(args) => args,
            Err(rejected) => return rejected,
        };
        ToolOutput::completed(ctx.desk().check_case_status(args).await)
    }
}
