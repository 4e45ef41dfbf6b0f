//! getEligibilityCriteria - requirements and documentation by disability type

use super::{parse_args, Tool, ToolContext, ToolOutput};
use crate::cases::{CaseOperation, EligibilityArgs};
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct EligibilityCriteriaTool;

#[async_trait]
impl Tool for EligibilityCriteriaTool {
    fn name(&self) -> &'static str {
        CaseOperation::GetEligibilityCriteria.name()
    }

    fn description(&self) -> String {
        "Get eligibility criteria and required documentation for a specific disability type".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["disabilityType"],
            "properties": {
                "disabilityType": {
                    "type": "string",
                    "description": "Type of disability to get criteria for"
                }
            }
        })
    }

    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput {
        let args: EligibilityArgs = match parse_args(input) {
            Ok(args) => args,
            Err(rejected) => return rejected,
        };
        ToolOutput::completed(Ok(ctx.desk().eligibility_criteria(&args)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::FailurePolicy;
    use crate::tools::test_context;

    #[tokio::test]
    async fn test_resolves_by_substring() {
        let out = EligibilityCriteriaTool
            .run(json!({"disabilityType": "sensory"}), test_context(FailurePolicy::always()))
            .await;
        let data = out.data.unwrap();
        assert_eq!(data["disabilityType"], "Sensory Impairment");
        assert_eq!(data["estimatedProcessingTime"], "2-4 months");
    }
}
