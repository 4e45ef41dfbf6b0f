//! Mock disability case management operations
//!
//! Nothing here is backed by a store: every call synthesizes its own data.
//! Randomness, time and the failure probabilities are injected so callers
//! (and tests) decide how a run behaves.

pub mod directory;
mod eligibility;
pub mod ids;
mod operations;
pub mod random;

pub use directory::{Caseworker, CASEWORKERS};
pub use eligibility::{EligibilityArgs, EligibilityCriteria};
pub use operations::*;
pub use random::{Clock, FixedClock, RandomSource, SystemClock};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Operations
// ============================================================================

/// The seven case-management operations exposed to the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseOperation {
    CreateCase,
    CheckCaseStatus,
    UpdateCase,
    AssignCaseworker,
    AddDocumentation,
    ScheduleAppointment,
    GetEligibilityCriteria,
}

impl CaseOperation {
    pub const ALL: [CaseOperation; 7] = [
        CaseOperation::CreateCase,
        CaseOperation::CheckCaseStatus,
        CaseOperation::UpdateCase,
        CaseOperation::AssignCaseworker,
        CaseOperation::AddDocumentation,
        CaseOperation::ScheduleAppointment,
        CaseOperation::GetEligibilityCriteria,
    ];

    /// Wire name, as used in tool definitions and `tool-<name>` parts
    pub fn name(self) -> &'static str {
        match self {
            CaseOperation::CreateCase => "createCase",
            CaseOperation::CheckCaseStatus => "checkCaseStatus",
            CaseOperation::UpdateCase => "updateCase",
            CaseOperation::AssignCaseworker => "assignCaseworker",
            CaseOperation::AddDocumentation => "addDocumentation",
            CaseOperation::ScheduleAppointment => "scheduleAppointment",
            CaseOperation::GetEligibilityCriteria => "getEligibilityCriteria",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Artificial backend latency for this operation
    pub fn simulated_latency(self) -> Duration {
        let millis = match self {
            CaseOperation::CreateCase => 800,
            CaseOperation::UpdateCase | CaseOperation::ScheduleAppointment => 600,
            CaseOperation::AssignCaseworker => 700,
            CaseOperation::CheckCaseStatus | CaseOperation::AddDocumentation => 500,
            CaseOperation::GetEligibilityCriteria => 0,
        };
        Duration::from_millis(millis)
    }
}

impl fmt::Display for CaseOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Domain enums
// ============================================================================

/// Lifecycle status of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseStatus {
    #[serde(rename = "Pending Review")]
    PendingReview,
    #[serde(rename = "Under Investigation")]
    UnderInvestigation,
    #[serde(rename = "Documentation Required")]
    DocumentationRequired,
    #[serde(rename = "Awaiting Medical Records")]
    AwaitingMedicalRecords,
    #[serde(rename = "Scheduled for Hearing")]
    ScheduledForHearing,
    Approved,
    Denied,
    #[serde(rename = "Appeal Filed")]
    AppealFiled,
    Closed,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 9] = [
        CaseStatus::PendingReview,
        CaseStatus::UnderInvestigation,
        CaseStatus::DocumentationRequired,
        CaseStatus::AwaitingMedicalRecords,
        CaseStatus::ScheduledForHearing,
        CaseStatus::Approved,
        CaseStatus::Denied,
        CaseStatus::AppealFiled,
        CaseStatus::Closed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CaseStatus::PendingReview => "Pending Review",
            CaseStatus::UnderInvestigation => "Under Investigation",
            CaseStatus::DocumentationRequired => "Documentation Required",
            CaseStatus::AwaitingMedicalRecords => "Awaiting Medical Records",
            CaseStatus::ScheduledForHearing => "Scheduled for Hearing",
            CaseStatus::Approved => "Approved",
            CaseStatus::Denied => "Denied",
            CaseStatus::AppealFiled => "Appeal Filed",
            CaseStatus::Closed => "Closed",
        }
    }

    /// Concluded cases have no estimated completion
    pub fn is_concluded(self) -> bool {
        matches!(
            self,
            CaseStatus::Approved | CaseStatus::Denied | CaseStatus::Closed
        )
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Disability categories known to the mock backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisabilityType {
    #[serde(rename = "Physical Disability")]
    Physical,
    #[serde(rename = "Mental Health Condition")]
    MentalHealth,
    #[serde(rename = "Intellectual Disability")]
    Intellectual,
    #[serde(rename = "Sensory Impairment")]
    Sensory,
    #[serde(rename = "Chronic Illness")]
    ChronicIllness,
    #[serde(rename = "Multiple Disabilities")]
    Multiple,
}

impl DisabilityType {
    pub const ALL: [DisabilityType; 6] = [
        DisabilityType::Physical,
        DisabilityType::MentalHealth,
        DisabilityType::Intellectual,
        DisabilityType::Sensory,
        DisabilityType::ChronicIllness,
        DisabilityType::Multiple,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DisabilityType::Physical => "Physical Disability",
            DisabilityType::MentalHealth => "Mental Health Condition",
            DisabilityType::Intellectual => "Intellectual Disability",
            DisabilityType::Sensory => "Sensory Impairment",
            DisabilityType::ChronicIllness => "Chronic Illness",
            DisabilityType::Multiple => "Multiple Disabilities",
        }
    }
}

impl fmt::Display for DisabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Operation failure with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CaseError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CaseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transient, message)
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fatal, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }
}

/// Error classification for the caller's retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Backend hiccup - retryable
    Transient,
    /// Must be surfaced to the user, never retried
    Fatal,
    /// Arguments rejected before anything ran - not retryable
    InvalidInput,
    /// Stopped by the caller before completing - not retryable
    Cancelled,
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Transient)
    }
}

// ============================================================================
// Policy
// ============================================================================

/// Probabilities of the injected failures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FailurePolicy {
    /// `checkCaseStatus` transient failure rate
    pub status_check: f64,
    /// `updateCase` fatal failure rate (case locked)
    pub update: f64,
    /// `scheduleAppointment` transient failure rate (scheduling conflict)
    pub scheduling: f64,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self {
            status_check: 0.10,
            update: 0.05,
            scheduling: 0.10,
        }
    }
}

impl FailurePolicy {
    /// No operation ever fails
    pub fn never() -> Self {
        Self {
            status_check: 0.0,
            update: 0.0,
            scheduling: 0.0,
        }
    }

    /// Every failure-capable operation fails
    pub fn always() -> Self {
        Self {
            status_check: 1.0,
            update: 1.0,
            scheduling: 1.0,
        }
    }

    /// Clamp every rate into [0, 1]
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            status_check: self.status_check.clamp(0.0, 1.0),
            update: self.update.clamp(0.0, 1.0),
            scheduling: self.scheduling.clamp(0.0, 1.0),
        }
    }
}

/// Whether operations sleep to imitate a slow backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    enabled: bool,
}

impl Latency {
    pub fn simulated() -> Self {
        Self { enabled: true }
    }

    pub fn none() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(self) -> bool {
        self.enabled
    }

    async fn wait(self, op: CaseOperation) {
        let delay = op.simulated_latency();
        if self.enabled && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

// ============================================================================
// Desk
// ============================================================================

/// Entry point for all case operations.
///
/// Holds no case data. The random source sits behind a mutex that is only
/// held while values are drawn, never across an await.
pub struct CaseDesk {
    rng: Mutex<Box<dyn RandomSource>>,
    clock: Arc<dyn Clock>,
    policy: FailurePolicy,
    latency: Latency,
}

impl CaseDesk {
    /// Desk with the default failure policy, wall clock and simulated latency
    pub fn new(rng: impl RandomSource + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
            clock: Arc::new(SystemClock),
            policy: FailurePolicy::default(),
            latency: Latency::simulated(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy.clamped();
        self
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    fn draw<T>(&self, f: impl FnOnce(&mut dyn RandomSource) -> T) -> T {
        let mut rng = self.rng.lock().unwrap();
        f(&mut **rng)
    }
}
