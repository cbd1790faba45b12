//! Paginated client for the Jira search API.

use std::time::Duration;

use log::{debug, info};

use super::payload::{SearchResponse, STANDARD_FIELDS};
use super::{CustomFields, TicketSource, TrackerError};
use crate::cancel;
use crate::models::RawTicket;

/// Maximum number of issues fetched for one report.
pub const DEFAULT_LIMIT: u64 = 1000;

/// Issues requested per page.
const PAGE_SIZE: u64 = 100;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for a Jira instance.
#[derive(Debug, Clone)]
pub struct JiraConfig {
    /// Base URL, e.g. `https://example.atlassian.net`
    pub url: String,
    pub email: String,
    /// API token used as the basic auth password
    pub token: String,
    pub fields: CustomFields,
    /// Upper bound on fetched issues
    pub limit: u64,
}

impl JiraConfig {
    pub fn new(url: impl Into<String>, email: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            email: email.into(),
            token: token.into(),
            fields: CustomFields::default(),
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_fields(mut self, fields: CustomFields) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Fail early on blank settings, before any request is made.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.url.trim().is_empty() {
            return Err(TrackerError::MissingSetting("JIRA_URL"));
        }
        if self.email.trim().is_empty() {
            return Err(TrackerError::MissingSetting("JIRA_EMAIL"));
        }
        if self.token.trim().is_empty() {
            return Err(TrackerError::MissingSetting("JIRA_TOKEN"));
        }
        Ok(())
    }

    pub fn search_url(&self) -> String {
        format!("{}/rest/api/2/search", self.url)
    }

    pub fn browse_url(&self) -> String {
        browse_url(&self.url)
    }

    /// Comma separated field list sent with each search.
    fn field_list(&self) -> String {
        STANDARD_FIELDS
            .iter()
            .copied()
            .chain(self.fields.ids())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Base for ticket links, `{url}/browse/`.
pub fn browse_url(base_url: &str) -> String {
    format!("{}/browse/", base_url.trim_end_matches('/'))
}

/// Fetches the issues of one saved filter.
pub struct JiraClient {
    config: JiraConfig,
    filter_id: String,
    http: reqwest::blocking::Client,
}

impl JiraClient {
    pub fn new(config: JiraConfig, filter_id: impl Into<String>) -> Result<Self, TrackerError> {
        let filter_id = filter_id.into();
        config.validate()?;
        if filter_id.trim().is_empty() {
            return Err(TrackerError::MissingSetting("Filter id"));
        }

        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            config,
            filter_id,
            http,
        })
    }

    fn jql(&self) -> String {
        format!("filter={}", self.filter_id)
    }

    fn fetch_page(&self, start_at: u64, max_results: u64) -> Result<SearchResponse, TrackerError> {
        debug!(
            "GET {} startAt={} maxResults={}",
            self.config.search_url(),
            start_at,
            max_results
        );

        let response = self
            .http
            .get(self.config.search_url())
            .basic_auth(&self.config.email, Some(&self.config.token))
            .query(&[
                ("jql", self.jql()),
                ("startAt", start_at.to_string()),
                ("maxResults", max_results.to_string()),
                ("fields", self.config.field_list()),
            ])
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(TrackerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl TicketSource for JiraClient {
    fn fetch(&self) -> Result<Vec<RawTicket>, TrackerError> {
        let mut tickets = Vec::new();
        let mut start_at = 0;

        loop {
            if cancel::is_cancelled() {
                return Err(TrackerError::Cancelled);
            }

            let requested = PAGE_SIZE.min(self.config.limit.saturating_sub(start_at));
            let page = self.fetch_page(start_at, requested)?;
            let received = page.issues.len() as u64;
            let total = page.total;
            tickets.extend(page.into_tickets(&self.config.fields));

            match next_start(start_at, received, requested, total, self.config.limit) {
                Some(next) => start_at = next,
                None => {
                    start_at += received;
                    break;
                }
            }
        }

        info!(
            "Fetched {} issues from {} ({} kept)",
            start_at,
            self.describe(),
            tickets.len()
        );
        Ok(tickets)
    }

    fn describe(&self) -> String {
        format!("Jira filter {}", self.filter_id)
    }
}

/// Offset of the next page, or `None` once the last page was read.
fn next_start(
    start_at: u64,
    received: u64,
    requested: u64,
    total: Option<u64>,
    limit: u64,
) -> Option<u64> {
    let next = start_at + received;
    let exhausted = match total {
        Some(total) => next >= total,
        None => received < requested,
    };
    if received == 0 || exhausted || next >= limit {
        None
    } else {
        Some(next)
    }
}
