//! updateCase - record a change against a case
//!
//! A locked case is a fatal error: the runtime must surface it, not retry.

use super::{parse_args, Tool, ToolContext, ToolOutput};
use crate::cases::{CaseOperation, UpdateCaseArgs};
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct UpdateCaseTool;

#[async_trait]
impl Tool for UpdateCaseTool {
    fn name(&self) -> &'static str {
        CaseOperation::UpdateCase.name()
    }

    fn description(&self) -> String {
        "Update information or add notes to an existing case".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["caseId", "updateType", "details"],
            "properties": {
                "caseId": {
                    "type": "string",
                    "description": "The case ID to update"
                },
                "updateType": {
                    "type": "string",
                    "description": "Type of update (e.g., Contact Information, Medical Documentation, Employment Status, Additional Notes)"
                },
                "details": {
                    "type": "string",
                    "description": "Details of the update"
                }
            }
        })
    }

    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput {
        let args: UpdateCaseArgs = match parse_args(input) {
            Ok(args) => args,
            Err(rejected) => return rejected,
        };
        ToolOutput::completed(ctx.desk().update_case(args).await)
    }
}
