//! addDocumentation - attach supporting documents to a case

use super::{parse_args, Tool, ToolContext, ToolOutput};
use crate::cases::{AddDocumentationArgs, CaseOperation};
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct AddDocumentationTool;

#[async_trait]
impl Tool for AddDocumentationTool {
    fn name(&self) -> &'static str {
        CaseOperation::AddDocumentation.name()
    }

    fn description(&self) -> String {
        "Add supporting documentation to a disability case".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["caseId", "documentType", "description"],
            "properties": {
                "caseId": {
                    "type": "string",
                    "description": "The case ID"
                },
                "documentType": {
                    "type": "string",
                    "description": "Type of document (e.g., Medical Records, Employment History, Physician Statement, Diagnostic Report)"
                },
                "description": {
                    "type": "string",
                    "description": "Description of the document contents"
                },
                "issuingAuthority": {
                    "type": "string",
                    "description": "Organization or person who issued the document"
                }
            }
        })
    }

    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput {
        let args: AddDocumentationArgs = match parse_args(input) {
            Ok(args) => args,
            Err(rejected) => return rejected,
        };
        ToolOutput::completed(Ok(ctx.desk().add_documentation(args).await))
    }
}
