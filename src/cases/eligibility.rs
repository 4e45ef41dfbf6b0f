//! Eligibility criteria lookup

use super::{CaseDesk, DisabilityType};
use serde::{Deserialize, Serialize};

const ADDITIONAL_INFO: &str =
    "All documentation must be dated within the last 12 months unless otherwise specified.";
const HELPLINE: &str = "1-800-555-HELP (4357)";
const PORTAL: &str = "https://disability-services.example.gov";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityArgs {
    pub disability_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityCriteria {
    pub disability_type: DisabilityType,
    pub requirements: Vec<String>,
    pub required_documentation: Vec<String>,
    pub estimated_processing_time: String,
    pub additional_info: String,
    pub helpline_number: String,
    pub online_portal: String,
}

struct CriteriaEntry {
    requirements: [&'static str; 4],
    documentation: [&'static str; 4],
    processing_time: &'static str,
}

fn entry(disability_type: DisabilityType) -> CriteriaEntry {
    match disability_type {
        DisabilityType::Physical => CriteriaEntry {
            requirements: [
                "Medical documentation of physical impairment",
                "Impact on daily activities must be demonstrated",
                "Impairment expected to last 12+ months or result in death",
                "Unable to perform substantial gainful activity",
            ],
            documentation: [
                "Medical records from treating physicians",
                "Diagnostic test results (X-rays, MRIs, etc.)",
                "Functional capacity evaluation",
                "Employment history and job descriptions",
            ],
            processing_time: "3-6 months",
        },
        DisabilityType::MentalHealth => CriteriaEntry {
            requirements: [
                "Documented mental health diagnosis",
                "Treatment history of at least 6 months",
                "Functional limitations in work or daily activities",
                "Evidence that condition limits ability to work",
            ],
            documentation: [
                "Psychiatric evaluation",
                "Treatment records and medication history",
                "Psychological testing results",
                "Statement from mental health provider",
            ],
            processing_time: "4-8 months",
        },
        DisabilityType::Intellectual => CriteriaEntry {
            requirements: [
                "IQ score documentation",
                "Evidence of onset before age 22",
                "Significant limitations in adaptive functioning",
                "School or institutional records",
            ],
            documentation: [
                "Psychological evaluation",
                "Educational records",
                "Adaptive behavior assessment",
                "Historical medical records",
            ],
            processing_time: "3-5 months",
        },
        DisabilityType::Sensory => CriteriaEntry {
            requirements: [
                "Documentation of vision or hearing loss",
                "Specialist medical evaluation",
                "Impact on work capacity demonstrated",
                "Best corrected measurements required",
            ],
            documentation: [
                "Ophthalmologist or audiologist reports",
                "Visual field or audiometric testing",
                "Functional vision/hearing assessment",
                "Assistive device records",
            ],
            processing_time: "2-4 months",
        },
        DisabilityType::ChronicIllness => CriteriaEntry {
            requirements: [
                "Documented diagnosis of chronic condition",
                "Evidence of ongoing treatment",
                "Functional limitations documentation",
                "Prognosis from treating physician",
            ],
            documentation: [
                "Treatment records spanning 12+ months",
                "Laboratory and diagnostic test results",
                "Medication and side effects documentation",
                "Hospitalization records if applicable",
            ],
            processing_time: "4-7 months",
        },
        DisabilityType::Multiple => CriteriaEntry {
            requirements: [
                "Documentation for each disability",
                "Combined impact assessment",
                "Evidence of functional limitations from each condition",
                "Comprehensive medical evaluation",
            ],
            documentation: [
                "Medical records for all conditions",
                "Specialist evaluations for each disability",
                "Comprehensive functional assessment",
                "Combined treatment plan documentation",
            ],
            processing_time: "5-9 months",
        },
    }
}

/// First table entry whose name contains the query, ignoring case.
/// Unrecognized queries resolve to physical disability.
pub fn resolve(query: &str) -> DisabilityType {
    let needle = query.to_lowercase();
    DisabilityType::ALL
        .into_iter()
        .find(|t| t.as_str().to_lowercase().contains(&needle))
        .unwrap_or(DisabilityType::Physical)
}

impl CaseDesk {
    /// Pure lookup; never fails and never touches the random source
    pub fn eligibility_criteria(&self, args: &EligibilityArgs) -> EligibilityCriteria {
        tracing::info!(disability_type = %args.disability_type, "Getting eligibility criteria");

        let disability_type = resolve(&args.disability_type);
        let entry = entry(disability_type);
        EligibilityCriteria {
            disability_type,
            requirements: entry.requirements.map(String::from).to_vec(),
            required_documentation: entry.documentation.map(String::from).to_vec(),
            estimated_processing_time: entry.processing_time.to_string(),
            additional_info: ADDITIONAL_INFO.to_string(),
            helpline_number: HELPLINE.to_string(),
            online_portal: PORTAL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_resolution() {
        assert_eq!(resolve("intellectual"), DisabilityType::Intellectual);
        assert_eq!(resolve("MENTAL"), DisabilityType::MentalHealth);
        assert_eq!(resolve("Chronic Illness"), DisabilityType::ChronicIllness);
        assert_eq!(resolve("sensory"), DisabilityType::Sensory);
    }

    #[test]
    fn test_unknown_defaults_to_physical() {
        assert_eq!(resolve("paperwork"), DisabilityType::Physical);
        // "Physical disabilities" is not a substring of any table key
        assert_eq!(resolve("Physical disabilities"), DisabilityType::Physical);
    }

    #[test]
    fn test_intellectual_entry_contents() {
        let desk = CaseDesk::new(<rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(1));
        let criteria = desk.eligibility_criteria(&EligibilityArgs {
            disability_type: "intellectual".to_string(),
        });
        assert_eq!(criteria.disability_type, DisabilityType::Intellectual);
        assert_eq!(criteria.requirements[0], "IQ score documentation");
        assert_eq!(criteria.estimated_processing_time, "3-5 months");
        assert_eq!(criteria.required_documentation.len(), 4);
        assert_eq!(criteria.helpline_number, "1-800-555-HELP (4357)");

        let json = serde_json::to_value(&criteria).unwrap();
        assert_eq!(json["disabilityType"], "Intellectual Disability");
        assert!(json["requiredDocumentation"].is_array());
    }
}
