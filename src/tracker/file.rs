use std::fs;
use std::path::PathBuf;

use log::info;

use super::payload::SearchResponse;
use super::{CustomFields, TicketSource, TrackerError};
use crate::models::RawTicket;

/// Replays a saved search response instead of calling Jira.
pub struct JsonFileSource {
    path: PathBuf,
    fields: CustomFields,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>, fields: CustomFields) -> Self {
        Self {
            path: path.into(),
            fields,
        }
    }
}

impl TicketSource for JsonFileSource {
    fn fetch(&self) -> Result<Vec<RawTicket>, TrackerError> {
        let content = fs::read_to_string(&self.path)?;
        let response: SearchResponse = serde_json::from_str(&content)?;
        let issues = response.issues.len();
        let tickets = response.into_tickets(&self.fields);
        info!(
            "Loaded {} issues from {} ({} kept)",
            issues,
            self.describe(),
            tickets.len()
        );
        Ok(tickets)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
