//! assignCaseworker - request (re)assignment of a caseworker

use super::{parse_args, Tool, ToolContext, ToolOutput};
use crate::cases::{AssignCaseworkerArgs, CaseOperation};
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct AssignCaseworkerTool;

#[async_trait]
impl Tool for AssignCaseworkerTool {
    fn name(&self) -> &'static str {
        CaseOperation::AssignCaseworker.name()
    }

    fn description(&self) -> String {
        "Request assignment or reassignment of a caseworker for a case".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["caseId"],
            "properties": {
                "caseId": {
                    "type": "string",
                    "description": "The case ID"
                },
                "reason": {
                    "type": "string",
                    "description": "Reason for assignment/reassignment request"
                },
                "preferredSpecialty": {
                    "type": "string",
                    "description": "Preferred caseworker specialty (e.g., Physical Disabilities, Mental Health, Appeals)"
                }
            }
        })
    }

    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput {
        let args: AssignCaseworkerArgs = match parse_args(input) {
            Ok(args) => args,
            Err(rejected) => return rejected,
        };
        ToolOutput::completed(Ok(ctx.desk().assign_caseworker(args).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::FailurePolicy;
    use crate::tools::test_context;

    #[tokio::test]
    async fn test_specialty_wins_over_caseload() {
        let out = AssignCaseworkerTool
            .run(
                json!({"caseId": "DC1", "preferredSpecialty": "mental health"}),
                test_context(FailurePolicy::always()),
            )
            .await;
        let data = out.data.unwrap();
        assert_eq!(data["assignedCaseworker"]["id"], "CW002");
        assert_eq!(data["reason"], "Standard assignment");
    }

    #[tokio::test]
    async fn test_optional_fields_may_be_null() {
        let out = AssignCaseworkerTool
            .run(
                json!({"caseId": "DC1", "reason": null, "preferredSpecialty": null}),
                test_context(FailurePolicy::never()),
            )
            .await;
        assert!(out.success);
        assert_eq!(out.data.unwrap()["assignedCaseworker"]["id"], "CW005");
    }
}
