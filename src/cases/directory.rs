//! Fixed caseworker directory

use super::random::RandomSource;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Caseworker {
    pub id: &'static str,
    pub name: &'static str,
    pub department: &'static str,
    pub caseload: u32,
    pub specialty: &'static str,
}

/// Directory order is significant: specialty matches and caseload ties
/// resolve to the earliest entry.
pub static CASEWORKERS: [Caseworker; 5] = [
    Caseworker {
        id: "CW001",
        name: "Sarah Johnson",
        department: "Disability Services",
        caseload: 45,
        specialty: "Physical Disabilities",
    },
    Caseworker {
        id: "CW002",
        name: "Michael Chen",
        department: "Disability Services",
        caseload: 38,
        specialty: "Mental Health",
    },
    Caseworker {
        id: "CW003",
        name: "Emily Rodriguez",
        department: "Appeals Division",
        caseload: 52,
        specialty: "Appeals & Reviews",
    },
    Caseworker {
        id: "CW004",
        name: "James Williams",
        department: "Medical Review",
        caseload: 41,
        specialty: "Medical Documentation",
    },
    Caseworker {
        id: "CW005",
        name: "Lisa Thompson",
        department: "Disability Services",
        caseload: 35,
        specialty: "Intellectual Disabilities",
    },
];

/// Uniform pick over the whole directory
pub fn random(rng: &mut dyn RandomSource) -> &'static Caseworker {
    rng.pick(&CASEWORKERS)
}

/// First caseworker whose specialty contains `preferred`, ignoring case
pub fn by_specialty(preferred: &str) -> Option<&'static Caseworker> {
    let needle = preferred.to_lowercase();
    CASEWORKERS
        .iter()
        .find(|cw| cw.specialty.to_lowercase().contains(&needle))
}

/// Caseworker with the smallest caseload
pub fn least_loaded() -> &'static Caseworker {
    CASEWORKERS
        .iter()
        .min_by_key(|cw| cw.caseload)
        .unwrap_or(&CASEWORKERS[0])
}

/// Specialty match when a non-empty preference is given, else least loaded
pub fn select(preferred_specialty: Option<&str>) -> &'static Caseworker {
    preferred_specialty
        .filter(|s| !s.is_empty())
        .and_then(by_specialty)
        .unwrap_or_else(least_loaded)
}
