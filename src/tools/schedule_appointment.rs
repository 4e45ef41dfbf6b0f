//! scheduleAppointment - book a consultation, examination or hearing
//!
//! The preferred slot is validated before anything else, so a malformed
//! date or time is rejected without rolling for a scheduling conflict.

use super::{parse_args, Tool, ToolContext, ToolOutput};
use crate::cases::{CaseOperation, ScheduleAppointmentArgs};
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct ScheduleAppointmentTool;

#[async_trait]
impl Tool for ScheduleAppointmentTool {
    fn name(&self) -> &'static str {
        CaseOperation::ScheduleAppointment.name()
    }

    fn description(&self) -> String {
        "Schedule an appointment related to a disability case".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["caseId", "appointmentType"],
            "properties": {
                "caseId": {
                    "type": "string",
                    "description": "The case ID"
                },
                "appointmentType": {
                    "type": "string",
                    "description": "Type of appointment (Initial Consultation, Medical Examination, Hearing, Document Review, Appeal Review)"
                },
                "preferredDate": {
                    "type": "string",
                    "description": "Preferred date in YYYY-MM-DD format"
                },
                "preferredTime": {
                    "type": "string",
                    "description": "Preferred time in HH:MM format"
                },
                "notes": {
                    "type": "string",
                    "description": "Any additional notes or accessibility requirements"
                }
            }
        })
    }

    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput {
        let args: ScheduleAppointmentArgs = match parse_args(input) {
            Ok(args) => args,
            Err(rejected) => return rejected,
        };
        ToolOutput::completed(ctx.desk().schedule_appointment(args).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::{ErrorKind, FailurePolicy};
    use crate::tools::test_context;

    #[tokio::test]
    async fn test_preferred_slot_is_honored() {
        let out = ScheduleAppointmentTool
            .run(
                json!({
                    "caseId": "DC1",
                    "appointmentType": "Hearing",
                    "preferredDate": "2025-07-01",
                    "preferredTime": "14:30"
                }),
                test_context(FailurePolicy::never()),
            )
            .await;
        assert!(out.success, "{}", out.output);
        let data = out.data.unwrap();
        assert_eq!(data["dateTime"], "2025-07-01T14:30:00Z");
        assert_eq!(data["duration"], "60 minutes");
    }

    #[tokio::test]
    async fn test_bad_time_is_invalid_not_a_conflict() {
        let out = ScheduleAppointmentTool
            .run(
                json!({"caseId": "DC1", "appointmentType": "Hearing", "preferredTime": "25:99"}),
                test_context(FailurePolicy::always()),
            )
            .await;
        assert_eq!(out.error_kind, Some(ErrorKind::InvalidInput));
    }

    #[tokio::test]
    async fn test_conflict_is_retryable() {
        let out = ScheduleAppointmentTool
            .run(
                json!({"caseId": "DC1", "appointmentType": "Document Review"}),
                test_context(FailurePolicy::always()),
            )
            .await;
        assert!(out.is_retryable());
        assert!(out.output.starts_with("Scheduling conflict"));
    }
}
