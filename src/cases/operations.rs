//! The case operations proper
//!
//! Every operation validates its arguments first, then waits out the
//! simulated latency, then rolls for failure, then samples its fields.
//! A rejected call therefore never consumes a random draw.

use super::{directory, ids, CaseDesk, CaseError, CaseOperation, CaseStatus, DisabilityType};
use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

const MS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

const CONCLUDED: &str = "N/A - Case concluded";
/// Sole pending action when there is nothing for the applicant to do
pub const NO_PENDING_ACTIONS: &str = "None - awaiting processing";
/// Sole required action when a document needs no follow-up
pub const NO_REQUIRED_ACTIONS: &str = "No additional actions required";

const STATUS_UNAVAILABLE: &str = "Case management system temporarily unavailable";
const CASE_LOCKED: &str =
    "Unable to update case. The case may be locked for review. Please contact your caseworker.";
const SCHEDULING_CONFLICT: &str = "Scheduling conflict. Please try a different date or time.";

// ============================================================================
// Shared result pieces
// ============================================================================

/// Caseworker summary embedded in case results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseworkerRef {
    pub id: String,
    pub name: String,
    pub department: String,
}

impl From<&directory::Caseworker> for CaseworkerRef {
    fn from(cw: &directory::Caseworker) -> Self {
        Self {
            id: cw.id.to_string(),
            name: cw.name.to_string(),
            department: cw.department.to_string(),
        }
    }
}

/// Caseworker summary with a contact number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseworkerContact {
    pub id: String,
    pub name: String,
    pub department: String,
    pub phone: String,
}

/// Caseworker as reported by an assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedCaseworker {
    pub id: String,
    pub name: String,
    pub department: String,
    pub specialty: String,
    pub current_caseload: u32,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[allow(clippy::cast_possible_truncation)]
fn days(fraction: f64) -> Duration {
    Duration::milliseconds((fraction * MS_PER_DAY) as i64)
}

// ============================================================================
// createCase
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseArgs {
    pub applicant_name: String,
    pub date_of_birth: String,
    pub disability_type: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseCreated {
    pub success: bool,
    pub case_id: String,
    pub applicant_name: String,
    pub date_of_birth: String,
    pub disability_type: String,
    pub description: String,
    pub status: CaseStatus,
    pub filing_date: DateTime<Utc>,
    pub assigned_caseworker: CaseworkerRef,
    pub next_steps: Vec<String>,
    pub message: String,
}

// ============================================================================
// checkCaseStatus
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseLookupArgs {
    pub case_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStatusReport {
    pub case_id: String,
    pub status: CaseStatus,
    pub disability_type: DisabilityType,
    pub filing_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    /// ISO timestamp, or a "not applicable" note for concluded cases
    pub estimated_completion: String,
    pub assigned_caseworker: CaseworkerContact,
    pub pending_actions: Vec<String>,
}

/// Deterministic follow-ups per status
pub fn pending_actions(status: CaseStatus) -> Vec<String> {
    match status {
        CaseStatus::DocumentationRequired => strings(&[
            "Submit medical records",
            "Complete employment history form",
        ]),
        CaseStatus::ScheduledForHearing => {
            strings(&["Prepare for hearing", "Review case documents"])
        }
        _ => strings(&[NO_PENDING_ACTIONS]),
    }
}

// ============================================================================
// updateCase
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCaseArgs {
    pub case_id: String,
    pub update_type: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseUpdated {
    pub success: bool,
    pub update_id: String,
    pub case_id: String,
    pub update_type: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub next_steps: Vec<String>,
}

fn update_next_steps(update_type: &str) -> Vec<String> {
    match update_type {
        "Medical Documentation" => strings(&["Documentation will be reviewed within 5-7 business days"]),
        "Contact Information" => strings(&["Your caseworker will be notified of the change"]),
        _ => strings(&["Update has been recorded and will be processed"]),
    }
}

// ============================================================================
// assignCaseworker
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignCaseworkerArgs {
    pub case_id: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub preferred_specialty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseworkerAssigned {
    pub success: bool,
    pub case_id: String,
    pub assigned_caseworker: AssignedCaseworker,
    pub reason: String,
    pub assignment_date: DateTime<Utc>,
    pub message: String,
}

// ============================================================================
// addDocumentation
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDocumentationArgs {
    pub case_id: String,
    pub document_type: String,
    pub description: String,
    #[serde(default)]
    pub issuing_authority: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationAdded {
    pub success: bool,
    pub document_id: String,
    pub case_id: String,
    pub document_type: String,
    pub description: String,
    pub issuing_authority: String,
    pub upload_date: DateTime<Utc>,
    pub status: CaseStatus,
    pub message: String,
    pub required_actions: Vec<String>,
}

fn required_actions(document_type: &str) -> Vec<String> {
    match document_type {
        "Medical Records" => strings(&[
            "Ensure all pages are legible",
            "Include physician signature",
        ]),
        "Employment History" => strings(&[
            "Verify dates of employment",
            "Include job descriptions",
        ]),
        _ => strings(&[NO_REQUIRED_ACTIONS]),
    }
}

// ============================================================================
// scheduleAppointment
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleAppointmentArgs {
    pub case_id: String,
    pub appointment_type: String,
    #[serde(default)]
    pub preferred_date: Option<String>,
    #[serde(default)]
    pub preferred_time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentScheduled {
    pub success: bool,
    pub appointment_id: String,
    pub case_id: String,
    pub appointment_type: String,
    pub date_time: DateTime<Utc>,
    pub location: String,
    pub duration: String,
    pub notes: String,
    pub message: String,
    pub preparation_instructions: Vec<String>,
}

/// Validated preferred slot, parsed before anything random happens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PreferredSlot {
    date: Option<NaiveDate>,
    time: Option<(u32, u32)>,
}

impl PreferredSlot {
    fn parse(date: Option<&str>, time: Option<&str>) -> Result<Self, CaseError> {
        let date = date
            .map(|d| {
                NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").map_err(|e| {
                    CaseError::invalid_input(format!("preferredDate {d:?} is not YYYY-MM-DD: {e}"))
                })
            })
            .transpose()?;
        let time = time.map(parse_time).transpose()?;
        Ok(Self { date, time })
    }
}

/// `HH:MM`, or a bare hour
fn parse_time(raw: &str) -> Result<(u32, u32), CaseError> {
    let invalid = || CaseError::invalid_input(format!("preferredTime {raw:?} is not HH:MM"));
    let (hour, minute) = match raw.trim().split_once(':') {
        Some((h, m)) => (h, Some(m)),
        None => (raw.trim(), None),
    };
    let hour: u32 = hour.parse().map_err(|_| invalid())?;
    let minute: u32 = minute.map_or(Ok(0), str::parse::<u32>).map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok((hour, minute))
}

fn appointment_location(appointment_type: &str) -> &'static str {
    match appointment_type {
        "Initial Consultation" => "Main Office - Room 201",
        "Medical Examination" => "Medical Center - Suite 105",
        "Hearing" => "Administrative Hearings Office - Hearing Room A",
        "Document Review" => "Virtual (Zoom link will be sent)",
        "Appeal Review" => "Appeals Division - Conference Room B",
        _ => "Main Office - Room 101",
    }
}

fn appointment_duration(appointment_type: &str) -> &'static str {
    match appointment_type {
        "Hearing" => "60 minutes",
        _ => "30 minutes",
    }
}

fn preparation_instructions(appointment_type: &str) -> Vec<String> {
    match appointment_type {
        "Medical Examination" => strings(&[
            "Bring photo ID",
            "Bring current medications list",
            "Arrive 15 minutes early",
        ]),
        "Hearing" => strings(&[
            "Bring all supporting documents",
            "Review case summary",
            "Legal representation is allowed",
        ]),
        _ => strings(&["Bring photo ID", "Bring any relevant documents"]),
    }
}

// ============================================================================
// Operations
// ============================================================================

impl CaseDesk {
    /// Open a new case. Cannot fail.
    pub async fn create_case(&self, args: CreateCaseArgs) -> CaseCreated {
        tracing::info!(applicant = %args.applicant_name, "Creating disability case");
        self.latency.wait(CaseOperation::CreateCase).await;

        let (case_id, caseworker) = self.draw(|rng| (ids::case_id(rng), directory::random(rng)));
        let message = format!(
            "Case {case_id} created successfully. Your assigned caseworker is {}.",
            caseworker.name
        );

        CaseCreated {
            success: true,
            case_id,
            applicant_name: args.applicant_name,
            date_of_birth: args.date_of_birth,
            disability_type: args.disability_type,
            description: args.description,
            status: CaseStatus::PendingReview,
            filing_date: self.clock.now(),
            assigned_caseworker: caseworker.into(),
            next_steps: strings(&[
                "Complete initial application review",
                "Submit medical documentation",
                "Schedule initial consultation",
            ]),
            message,
        }
    }

    /// Fabricate a plausible status for `case_id`. No lookup happens: two
    /// calls for the same case are unrelated.
    pub async fn check_case_status(&self, args: CaseLookupArgs) -> Result<CaseStatusReport, CaseError> {
        tracing::info!(case_id = %args.case_id, "Checking case status");

        let rate = self.policy.status_check;
        if self.draw(|rng| rng.chance(rate)) {
            tracing::warn!(case_id = %args.case_id, "Injected status check failure");
            return Err(CaseError::transient(STATUS_UNAVAILABLE));
        }

        self.latency.wait(CaseOperation::CheckCaseStatus).await;

        let now = self.clock.now();
        let report = self.draw(|rng| {
            let status = *rng.pick(&CaseStatus::ALL);
            let disability_type = *rng.pick(&DisabilityType::ALL);
            let caseworker = directory::random(rng);
            let filing_date = now - days(rng.unit() * 180.0);
            let last_updated = now - days(rng.unit() * 14.0);
            let estimated_completion = if status.is_concluded() {
                CONCLUDED.to_string()
            } else {
                (now + days(rng.unit() * 90.0)).to_rfc3339_opts(SecondsFormat::Millis, true)
            };
            let phone = format!("(555) 000-{}", 1000 + rng.below(9000));

            CaseStatusReport {
                case_id: args.case_id.to_uppercase(),
                status,
                disability_type,
                filing_date,
                last_updated,
                estimated_completion,
                assigned_caseworker: CaseworkerContact {
                    id: caseworker.id.to_string(),
                    name: caseworker.name.to_string(),
                    department: caseworker.department.to_string(),
                    phone,
                },
                pending_actions: pending_actions(status),
            }
        });

        Ok(report)
    }

    /// Record an update. Fails fatally when the case is "locked".
    pub async fn update_case(&self, args: UpdateCaseArgs) -> Result<CaseUpdated, CaseError> {
        tracing::info!(case_id = %args.case_id, update_type = %args.update_type, "Updating case");
        self.latency.wait(CaseOperation::UpdateCase).await;

        let rate = self.policy.update;
        if self.draw(|rng| rng.chance(rate)) {
            tracing::warn!(case_id = %args.case_id, "Injected case lock");
            return Err(CaseError::fatal(CASE_LOCKED));
        }

        let update_id = self.draw(ids::update_id);
        let message = format!(
            "Case {} updated successfully. Update reference: {update_id}",
            args.case_id
        );

        Ok(CaseUpdated {
            success: true,
            update_id,
            case_id: args.case_id.to_uppercase(),
            next_steps: update_next_steps(&args.update_type),
            update_type: args.update_type,
            details: args.details,
            timestamp: self.clock.now(),
            message,
        })
    }

    /// Pick a caseworker: specialty match first, lowest caseload otherwise.
    /// Fully deterministic.
    pub async fn assign_caseworker(&self, args: AssignCaseworkerArgs) -> CaseworkerAssigned {
        tracing::info!(case_id = %args.case_id, "Assigning caseworker");
        self.latency.wait(CaseOperation::AssignCaseworker).await;

        let cw = directory::select(args.preferred_specialty.as_deref());
        let message = format!(
            "Case {} has been assigned to {}. They will contact you within 2-3 business days.",
            args.case_id, cw.name
        );

        CaseworkerAssigned {
            success: true,
            case_id: args.case_id.to_uppercase(),
            assigned_caseworker: AssignedCaseworker {
                id: cw.id.to_string(),
                name: cw.name.to_string(),
                department: cw.department.to_string(),
                specialty: cw.specialty.to_string(),
                current_caseload: cw.caseload,
            },
            reason: args
                .reason
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| "Standard assignment".to_string()),
            assignment_date: self.clock.now(),
            message,
        }
    }

    /// Attach a document to a case. Cannot fail.
    pub async fn add_documentation(&self, args: AddDocumentationArgs) -> DocumentationAdded {
        tracing::info!(case_id = %args.case_id, document_type = %args.document_type, "Adding documentation");
        self.latency.wait(CaseOperation::AddDocumentation).await;

        let document_id = self.draw(ids::document_id);
        let message = format!(
            "Document {document_id} has been added to case {}. It will be reviewed within 3-5 business days.",
            args.case_id
        );

        DocumentationAdded {
            success: true,
            document_id,
            case_id: args.case_id.to_uppercase(),
            required_actions: required_actions(&args.document_type),
            document_type: args.document_type,
            description: args.description,
            issuing_authority: args
                .issuing_authority
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| "Not specified".to_string()),
            upload_date: self.clock.now(),
            status: CaseStatus::PendingReview,
            message,
        }
    }

    /// Book an appointment. Fails transiently on a "scheduling conflict".
    pub async fn schedule_appointment(
        &self,
        args: ScheduleAppointmentArgs,
    ) -> Result<AppointmentScheduled, CaseError> {
        let slot = PreferredSlot::parse(args.preferred_date.as_deref(), args.preferred_time.as_deref())?;

        tracing::info!(
            case_id = %args.case_id,
            appointment_type = %args.appointment_type,
            "Scheduling appointment"
        );
        self.latency.wait(CaseOperation::ScheduleAppointment).await;

        let rate = self.policy.scheduling;
        if self.draw(|rng| rng.chance(rate)) {
            tracing::warn!(case_id = %args.case_id, "Injected scheduling conflict");
            return Err(CaseError::transient(SCHEDULING_CONFLICT));
        }

        let now = self.clock.now();
        let (appointment_id, date, (hour, minute)) = self.draw(|rng| {
            let id = ids::appointment_id(rng);
            let date = slot
                .date
                .unwrap_or_else(|| (now + days(7.0 + rng.unit() * 21.0)).date_naive());
            // 9 AM through 3 PM starts when no time was requested
            let time = slot.time.unwrap_or_else(|| (9 + rng.below_u32(7), 0));
            (id, date, time)
        });

        let naive = date
            .and_hms_opt(hour, minute, 0)
            .ok_or_else(|| CaseError::invalid_input(format!("{hour:02}:{minute:02} is not a valid time")))?;
        let date_time = Utc.from_utc_datetime(&naive);

        let message = format!(
            "Appointment {appointment_id} scheduled successfully for {} at {}.",
            date_time.format("%-m/%-d/%Y"),
            date_time.format("%-I:%M:%S %p")
        );

        Ok(AppointmentScheduled {
            success: true,
            appointment_id,
            case_id: args.case_id.to_uppercase(),
            location: appointment_location(&args.appointment_type).to_string(),
            duration: appointment_duration(&args.appointment_type).to_string(),
            preparation_instructions: preparation_instructions(&args.appointment_type),
            appointment_type: args.appointment_type,
            date_time,
            notes: args
                .notes
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "None".to_string()),
            message,
        })
    }
}
