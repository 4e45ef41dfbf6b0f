//! Per-operation rendering plans
//!
//! Field lookups are lenient: a missing scalar renders empty and a missing
//! list renders nothing, so a partial result never breaks the view.

use crate::cases::{CaseOperation, CaseStatus, NO_PENDING_ACTIONS, NO_REQUIRED_ACTIONS};
use chrono::{DateTime, FixedOffset};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Success,
    Warning,
    Danger,
    Muted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Leading status line
    Banner { text: String, tone: Tone },
    Field { label: &'static str, value: String, tone: Tone },
    Text { text: String, tone: Tone },
    List { title: &'static str, items: Vec<String> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderPlan {
    pub blocks: Vec<Block>,
}

impl RenderPlan {
    fn banner(mut self, text: impl Into<String>, tone: Tone) -> Self {
        self.blocks.push(Block::Banner {
            text: text.into(),
            tone,
        });
        self
    }

    fn field(self, label: &'static str, value: String) -> Self {
        self.toned_field(label, value, Tone::Plain)
    }

    fn toned_field(mut self, label: &'static str, value: String, tone: Tone) -> Self {
        self.blocks.push(Block::Field { label, value, tone });
        self
    }

    fn text(mut self, text: String, tone: Tone) -> Self {
        self.blocks.push(Block::Text { text, tone });
        self
    }

    fn list(mut self, title: &'static str, items: Option<Vec<String>>) -> Self {
        if let Some(items) = items {
            self.blocks.push(Block::List { title, items });
        }
        self
    }

    pub fn field_value(&self, label: &str) -> Option<&str> {
        self.blocks.iter().find_map(|b| match b {
            Block::Field { label: l, value, .. } if *l == label => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn list_items(&self, title: &str) -> Option<&[String]> {
        self.blocks.iter().find_map(|b| match b {
            Block::List { title: t, items } if *t == title => Some(items.as_slice()),
            _ => None,
        })
    }
}

// ============================================================================
// Lookups
// ============================================================================

fn text(data: &Value, pointer: &str) -> String {
    match data.pointer(pointer) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn items(data: &Value, key: &str) -> Option<Vec<String>> {
    let array = data.get(key)?.as_array()?;
    Some(
        array
            .iter()
            .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string))
            .collect(),
    )
}

/// Items unless the list leads with its "nothing to do" sentinel
fn items_unless(data: &Value, key: &str, sentinel: &str) -> Option<Vec<String>> {
    items(data, key).filter(|list| list.first().map(String::as_str) != Some(sentinel))
}

fn parse_instant(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw).ok()
}

fn date(data: &Value, key: &str) -> String {
    let raw = text(data, &format!("/{key}"));
    parse_instant(&raw).map_or(raw, |d| d.format("%-m/%-d/%Y").to_string())
}

fn date_time(data: &Value, key: &str) -> String {
    let raw = text(data, &format!("/{key}"));
    parse_instant(&raw).map_or(raw, |d| d.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string())
}

pub fn status_tone(status: &str) -> Tone {
    match status {
        s if s == CaseStatus::Approved.as_str() => Tone::Success,
        s if s == CaseStatus::Denied.as_str() => Tone::Danger,
        s if s == CaseStatus::Closed.as_str() => Tone::Muted,
        _ => Tone::Warning,
    }
}

// ============================================================================
// Plans
// ============================================================================

/// Rendering plan for one operation's unwrapped result
pub fn plan_for(operation: CaseOperation, data: &Value) -> RenderPlan {
    let plan = RenderPlan::default();
    match operation {
        CaseOperation::CreateCase => plan
            .banner("Case Created Successfully!", Tone::Success)
            .field("Case ID", text(data, "/caseId"))
            .field("Applicant", text(data, "/applicantName"))
            .field("Disability Type", text(data, "/disabilityType"))
            .toned_field("Status", text(data, "/status"), Tone::Warning)
            .field("Caseworker", text(data, "/assignedCaseworker/name"))
            .list("Next Steps", items(data, "nextSteps")),

        CaseOperation::CheckCaseStatus => {
            let status = text(data, "/status");
            let tone = status_tone(&status);
            plan.banner(format!("Case {}", text(data, "/caseId")), Tone::Plain)
                .toned_field("Status", status, tone)
                .field("Type", text(data, "/disabilityType"))
                .field("Filed", date(data, "filingDate"))
                .field("Last Updated", date(data, "lastUpdated"))
                .field("Est. Completion", text(data, "/estimatedCompletion"))
                .field("Caseworker", text(data, "/assignedCaseworker/name"))
                .text(text(data, "/assignedCaseworker/department"), Tone::Muted)
                .text(text(data, "/assignedCaseworker/phone"), Tone::Muted)
                .list(
                    "Pending Actions",
                    items_unless(data, "pendingActions", NO_PENDING_ACTIONS),
                )
        }

        CaseOperation::UpdateCase => plan
            .banner("Case Updated!", Tone::Success)
            .field("Update ID", text(data, "/updateId"))
            .field("Case", text(data, "/caseId"))
            .field("Type", text(data, "/updateType"))
            .text(text(data, "/message"), Tone::Muted),

        CaseOperation::AssignCaseworker => plan
            .banner("Caseworker Assigned!", Tone::Success)
            .field("Case", text(data, "/caseId"))
            .text(text(data, "/assignedCaseworker/name"), Tone::Plain)
            .text(text(data, "/assignedCaseworker/department"), Tone::Muted)
            .field("Specialty", text(data, "/assignedCaseworker/specialty"))
            .text(text(data, "/message"), Tone::Muted),

        CaseOperation::AddDocumentation => plan
            .banner("Documentation Added!", Tone::Success)
            .field("Document ID", text(data, "/documentId"))
            .field("Case", text(data, "/caseId"))
            .field("Type", text(data, "/documentType"))
            .toned_field("Status", text(data, "/status"), Tone::Warning)
            .text(text(data, "/message"), Tone::Muted)
            .list(
                "Required Actions",
                items_unless(data, "requiredActions", NO_REQUIRED_ACTIONS),
            ),

        CaseOperation::ScheduleAppointment => plan
            .banner("Appointment Scheduled!", Tone::Success)
            .field("Appointment ID", text(data, "/appointmentId"))
            .field("Case", text(data, "/caseId"))
            .field("Type", text(data, "/appointmentType"))
            .field("Date/Time", date_time(data, "dateTime"))
            .field("Location", text(data, "/location"))
            .field("Duration", text(data, "/duration"))
            .list(
                "Preparation Instructions",
                items(data, "preparationInstructions"),
            ),

        CaseOperation::GetEligibilityCriteria => plan
            .banner(
                format!("{} - Eligibility Criteria", text(data, "/disabilityType")),
                Tone::Plain,
            )
            .list("Requirements", items(data, "requirements"))
            .list("Required Documentation", items(data, "requiredDocumentation"))
            .field(
                "Estimated Processing Time",
                text(data, "/estimatedProcessingTime"),
            )
            .text(text(data, "/additionalInfo"), Tone::Muted)
            .field("Helpline", text(data, "/helplineNumber")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pending_actions_sentinel_suppresses_list() {
        let plan = plan_for(
            CaseOperation::CheckCaseStatus,
            &json!({"caseId": "DC1", "status": "Under Review", "pendingActions": [NO_PENDING_ACTIONS]}),
        );
        assert_eq!(plan.list_items("Pending Actions"), None);

        let plan = plan_for(
            CaseOperation::CheckCaseStatus,
            &json!({"status": "Documentation Required", "pendingActions": ["Submit medical records"]}),
        );
        assert_eq!(
            plan.list_items("Pending Actions"),
            Some(&["Submit medical records".to_string()][..])
        );
    }

    #[test]
    fn test_required_actions_sentinel_suppresses_list() {
        let plan = plan_for(
            CaseOperation::AddDocumentation,
            &json!({"documentId": "DOC1", "requiredActions": [NO_REQUIRED_ACTIONS]}),
        );
        assert_eq!(plan.list_items("Required Actions"), None);
        assert_eq!(plan.field_value("Document ID"), Some("DOC1"));
    }

    #[test]
    fn test_missing_lists_render_nothing() {
        let plan = plan_for(CaseOperation::CreateCase, &json!({"caseId": "DC1"}));
        assert_eq!(plan.list_items("Next Steps"), None);
        assert_eq!(plan.field_value("Applicant"), Some(""));

        let plan = plan_for(CaseOperation::GetEligibilityCriteria, &json!({"requirements": "oops"}));
        assert_eq!(plan.list_items("Requirements"), None);
    }

    #[test]
    fn test_status_tones() {
        assert_eq!(status_tone("Approved"), Tone::Success);
        assert_eq!(status_tone("Denied"), Tone::Danger);
        assert_eq!(status_tone("Closed"), Tone::Muted);
        assert_eq!(status_tone("Appeal in Progress"), Tone::Warning);
    }

    #[test]
    fn test_dates_are_formatted_when_parseable() {
        let plan = plan_for(
            CaseOperation::CheckCaseStatus,
            &json!({
                "filingDate": "2025-01-05T10:00:00Z",
                "estimatedCompletion": "N/A - Case concluded"
            }),
        );
        assert_eq!(plan.field_value("Filed"), Some("1/5/2025"));
        assert_eq!(plan.field_value("Est. Completion"), Some("N/A - Case concluded"));

        let plan = plan_for(
            CaseOperation::CheckCaseStatus,
            &json!({"estimatedCompletion": "2025-03-01T09:00:00.000Z"}),
        );
        assert_eq!(
            plan.field_value("Est. Completion"),
            Some("2025-03-01T09:00:00.000Z")
        );

        let plan = plan_for(
            CaseOperation::ScheduleAppointment,
            &json!({"dateTime": "2025-07-01T14:30:00Z"}),
        );
        assert_eq!(plan.field_value("Date/Time"), Some("7/1/2025, 2:30:00 PM"));
    }
}
