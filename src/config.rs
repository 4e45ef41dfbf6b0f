//! Environment configuration for the server and the chat client

use crate::agent::DEFAULT_MODEL;
use crate::cases::{FailurePolicy, Latency};
use crate::chat::DEFAULT_MAX_CONSECUTIVE_ERRORS;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CHAT_URL: &str = "http://localhost:3000";

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable setting");
            None
        }
    }
}

/// Settings for the `case-desk` service
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Fixed seed for reproducible demos; entropy when unset
    pub seed: Option<u64>,
    pub latency: Latency,
    pub failure_policy: FailurePolicy,
    pub model: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = FailurePolicy::default();
        let failure_policy = FailurePolicy {
            status_check: parsed(&lookup, "CASE_DESK_STATUS_FAILURE_RATE").unwrap_or(defaults.status_check),
            update: parsed(&lookup, "CASE_DESK_UPDATE_FAILURE_RATE").unwrap_or(defaults.update),
            scheduling: parsed(&lookup, "CASE_DESK_SCHEDULE_FAILURE_RATE").unwrap_or(defaults.scheduling),
        }
        .clamped();

        let latency = match lookup("CASE_DESK_LATENCY").as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("off") => Latency::none(),
            _ => Latency::simulated(),
        };

        Self {
            port: parsed(&lookup, "CASE_DESK_PORT").unwrap_or(DEFAULT_PORT),
            seed: parsed(&lookup, "CASE_DESK_SEED"),
            latency,
            failure_policy,
            model: lookup("CASE_DESK_MODEL")
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}

/// Settings for the `case-chat` client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub state_path: PathBuf,
    pub max_consecutive_errors: u32,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let state_path = lookup("CASE_CHAT_STATE").map_or_else(
            || {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".case-desk").join("chat.db")
            },
            PathBuf::from,
        );

        Self {
            base_url: lookup("CASE_CHAT_URL").unwrap_or_else(|| DEFAULT_CHAT_URL.to_string()),
            state_path,
            max_consecutive_errors: parsed(&lookup, "CASE_CHAT_MAX_ERRORS")
                .unwrap_or(DEFAULT_MAX_CONSECUTIVE_ERRORS),
        }
    }
}
