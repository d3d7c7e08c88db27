//! Configuration management for the tasklist binary.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::api::DEFAULT_BASE_URL;
use crate::reducer::EditFailurePolicy;
use serde::{Deserialize, Serialize};
use std::env;

/// Which persistence the binary wires up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncModeSetting {
    /// No remote store
    #[default]
    Offline,
    /// HTTP store at `api_base_url`
    Remote,
    /// In-process store, useful for demos
    Memory,
}

impl SyncModeSetting {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "offline" => Some(Self::Offline),
            "remote" | "http" => Some(Self::Remote),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoConfig {
    /// Base URL of the remote store (default: `http://localhost:3001/api`)
    pub api_base_url: String,
    /// Persistence mode (default: offline)
    pub sync_mode: SyncModeSetting,
    /// Whether a failed remote edit reopens the draft (default: discard)
    #[serde(with = "edit_failure_serde")]
    pub edit_failure: EditFailurePolicy,
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            sync_mode: SyncModeSetting::default(),
            edit_failure: EditFailurePolicy::default(),
            log_filter: "tasklist=info".to_string(),
        }
    }
}

impl TodoConfig {
    /// Load configuration from the process environment.
    ///
    /// Unparseable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            api_base_url: lookup("TASKLIST_API_BASE_URL")
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.api_base_url),
            sync_mode: lookup("TASKLIST_SYNC_MODE")
                .and_then(|s| SyncModeSetting::parse(&s))
                .unwrap_or(defaults.sync_mode),
            edit_failure: lookup("TASKLIST_EDIT_FAILURE")
                .and_then(|s| parse_edit_failure(&s))
                .unwrap_or(defaults.edit_failure),
            log_filter: lookup("TASKLIST_LOG").unwrap_or(defaults.log_filter),
        }
    }
}

fn parse_edit_failure(value: &str) -> Option<EditFailurePolicy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "discard" => Some(EditFailurePolicy::Discard),
        "restore" => Some(EditFailurePolicy::Restore),
        _ => None,
    }
}

mod edit_failure_serde {
    use super::{EditFailurePolicy, parse_edit_failure};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    #[allow(clippy::trivially_copy_pass_by_ref)] // serde's `with` signature
    pub fn serialize<S: Serializer>(
        policy: &EditFailurePolicy,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(match policy {
            EditFailurePolicy::Discard => "discard",
            EditFailurePolicy::Restore => "restore",
        })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<EditFailurePolicy, D::Error> {
        let value = String::deserialize(deserializer)?;
        parse_edit_failure(&value)
            .ok_or_else(|| D::Error::custom(format!("unknown edit failure policy: {value}")))
    }
}
