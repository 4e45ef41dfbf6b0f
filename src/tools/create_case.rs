//! createCase - open a new disability case

use super::{parse_args, Tool, ToolContext, ToolOutput};
use crate::cases::{CaseOperation, CreateCaseArgs};
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct CreateCaseTool;

#[async_trait]
impl Tool for CreateCaseTool {
    fn name(&self) -> &'static str {
        CaseOperation::CreateCase.name()
    }

    fn description(&self) -> String {
        "Create a new disability case for an applicant seeking benefits or services".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["applicantName", "dateOfBirth", "disabilityType", "description"],
            "properties": {
                "applicantName": {
                    "type": "string",
                    "description": "Full legal name of the applicant"
                },
                "dateOfBirth": {
                    "type": "string",
                    "description": "Date of birth in YYYY-MM-DD format"
                },
                "disabilityType": {
                    "type": "string",
                    "description": "Type of disability (e.g., Physical Disability, Mental Health Condition, Intellectual Disability, Sensory Impairment, Chronic Illness, Multiple Disabilities)"
                },
                "description": {
                    "type": "string",
                    "description": "Brief description of the disability and how it affects daily life"
                }
            }
        })
    }

    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput {
        let args: CreateCaseArgs = match parse_args(input) {
            Ok(args) => args,
            Err(rejected) => return rejected,
        };
        ToolOutput::completed(Ok(ctx.desk().create_case(args).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::{ids, FailurePolicy};
    use crate::tools::test_context;

    #[tokio::test]
    async fn test_creates_pending_case() {
        let out = CreateCaseTool
            .run(
                json!({
                    "applicantName": "Jane Doe",
                    "dateOfBirth": "1985-03-15",
                    "disabilityType": "Physical Disability",
                    "description": "Spinal injury limiting mobility"
                }),
                test_context(FailurePolicy::never()),
            )
            .await;
        assert!(out.success);

        let data = out.data.unwrap();
        let case_id = data["caseId"].as_str().unwrap();
        assert!(ids::matches_pattern(case_id, ids::CASE_PREFIX, ids::CASE_SUFFIX_LEN));
        assert_eq!(data["status"], "Pending Review");
        assert_eq!(data["nextSteps"].as_array().unwrap().len(), 3);
        assert!(data["assignedCaseworker"]["id"].as_str().unwrap().starts_with("CW"));
    }

    #[tokio::test]
    async fn test_missing_field_is_invalid() {
        let out = CreateCaseTool
            .run(json!({"applicantName": "Jane Doe"}), test_context(FailurePolicy::never()))
            .await;
        assert!(!out.success);
        assert!(out.output.contains("dateOfBirth"));
    }
}
