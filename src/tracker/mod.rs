//! Issue tracker collaborators.
//!
//! Everything that talks to (or replays) the tracker lives here. The rest of
//! the crate only sees [`RawTicket`]s.
//!
//! # Configuration
//!
//! Custom field ids can be changed through environment variables:
//! - `JIRAFLY_FIELD_ESTIMATE` (default `customfield_11605`)
//! - `JIRAFLY_FIELD_WSJF` (default `customfield_11737`)
//! - `JIRAFLY_FIELD_TECH_LEAD_1ST` (default `customfield_11606`)
//! - `JIRAFLY_FIELD_TECH_LEAD_2ND` (default `customfield_11634`)
//! - `JIRAFLY_FIELD_SPRINT` (default `customfield_10020`)

mod file;
mod jira;
pub mod payload;

use std::env;

pub use file::JsonFileSource;
pub use jira::{browse_url, JiraClient, JiraConfig, DEFAULT_LIMIT};

use crate::models::RawTicket;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("{0} must be provided")]
    MissingSetting(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Jira returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to parse tracker response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to read tracker payload: {0}")]
    Io(#[from] std::io::Error),
    #[error("Fetch cancelled")]
    Cancelled,
}

/// Source of raw tickets - allows replaying payloads and mocking in tests
pub trait TicketSource {
    /// Fetch every ticket of the report, Epics already removed
    fn fetch(&self) -> Result<Vec<RawTicket>, TrackerError>;

    /// Short human-readable description for logs
    fn describe(&self) -> String;
}

/// Ids of the custom fields the classifier reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomFields {
    pub estimate: String,
    pub wsjf: String,
    pub tech_lead_first: String,
    pub tech_lead_second: String,
    pub sprint: String,
}

impl Default for CustomFields {
    fn default() -> Self {
        Self {
            estimate: "customfield_11605".to_string(),
            wsjf: "customfield_11737".to_string(),
            tech_lead_first: "customfield_11606".to_string(),
            tech_lead_second: "customfield_11634".to_string(),
            sprint: "customfield_10020".to_string(),
        }
    }
}

impl CustomFields {
    /// Defaults overridden by `JIRAFLY_FIELD_*` variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |name: &str, default: String| {
            env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        Self {
            estimate: var("JIRAFLY_FIELD_ESTIMATE", defaults.estimate),
            wsjf: var("JIRAFLY_FIELD_WSJF", defaults.wsjf),
            tech_lead_first: var("JIRAFLY_FIELD_TECH_LEAD_1ST", defaults.tech_lead_first),
            tech_lead_second: var("JIRAFLY_FIELD_TECH_LEAD_2ND", defaults.tech_lead_second),
            sprint: var("JIRAFLY_FIELD_SPRINT", defaults.sprint),
        }
    }

    pub fn ids(&self) -> [&str; 5] {
        [
            &self.estimate,
            &self.wsjf,
            &self.tech_lead_first,
            &self.tech_lead_second,
            &self.sprint,
        ]
    }
}
