//! Jira REST payloads and their translation into [`RawTicket`]s.

use std::collections::HashMap;

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use super::CustomFields;
use crate::models::{Person, RawTicket};

/// Issue type that never reaches the classifier.
pub const EPIC: &str = "Epic";

/// Standard fields requested alongside the custom ones.
pub const STANDARD_FIELDS: [&str; 7] = [
    "summary",
    "issuetype",
    "assignee",
    "status",
    "labels",
    "fixVersions",
    "timetracking",
];

/// Response of `GET /rest/api/2/search`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub start_at: u64,
    #[serde(default)]
    pub max_results: u64,
    pub total: Option<u64>,
    #[serde(default)]
    pub issues: Vec<IssuePayload>,
}

impl SearchResponse {
    /// Translate all issues, dropping Epics and issues without fields.
    pub fn into_tickets(self, custom: &CustomFields) -> Vec<RawTicket> {
        self.issues
            .into_iter()
            .filter_map(|issue| issue.into_ticket(custom))
            .filter(|ticket| ticket.issue_type.as_deref() != Some(EPIC))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct IssuePayload {
    pub key: Option<String>,
    pub fields: Option<FieldsPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldsPayload {
    pub summary: Option<String>,
    #[serde(rename = "issuetype")]
    pub issue_type: Option<Named>,
    pub status: Option<Named>,
    pub assignee: Option<User>,
    pub labels: Option<Vec<String>>,
    pub fix_versions: Option<Vec<Named>>,
    #[serde(rename = "timetracking")]
    pub time_tracking: Option<TimeTracking>,
    /// Everything else, including the custom fields
    #[serde(flatten)]
    pub other: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Named {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeTracking {
    pub time_spent_seconds: Option<u64>,
}

impl IssuePayload {
    pub fn into_ticket(self, custom: &CustomFields) -> Option<RawTicket> {
        let Some(fields) = self.fields else {
            debug!(
                "Skipping issue {} without fields",
                self.key.as_deref().unwrap_or("<no key>")
            );
            return None;
        };
        let other = &fields.other;

        Some(RawTicket {
            key: self.key,
            summary: fields.summary,
            issue_type: fields.issue_type.and_then(|t| t.name),
            status: fields.status.and_then(|s| s.name),
            assignee: fields
                .assignee
                .map(|u| Person::new(u.display_name.unwrap_or_default())),
            estimate: other.get(&custom.estimate).and_then(lenient_number),
            priority_score: other.get(&custom.wsjf).and_then(lenient_number),
            labels: fields.labels.unwrap_or_default(),
            fix_versions: fields
                .fix_versions
                .unwrap_or_default()
                .into_iter()
                .filter_map(|v| v.name)
                .collect(),
            sprints: other.get(&custom.sprint).map(sprint_names).unwrap_or_default(),
            tech_lead_first: other.get(&custom.tech_lead_first).and_then(person),
            tech_lead_second: other.get(&custom.tech_lead_second).and_then(person),
            time_spent_seconds: fields.time_tracking.and_then(|t| t.time_spent_seconds),
        })
    }
}

/// Numbers, or strings holding a number; anything else is absent.
fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn person(value: &Value) -> Option<Person> {
    value
        .get("displayName")
        .and_then(Value::as_str)
        .map(Person::new)
}

/// Sprint names from either sprint objects or legacy
/// `com.atlassian.greenhopper...Sprint@1a2b[id=1,name=Sprint 4,...]` strings.
fn sprint_names(value: &Value) -> Vec<String> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(_) => item.get("name").and_then(Value::as_str).map(str::to_string),
            Value::String(s) => Some(legacy_sprint_name(s).unwrap_or(s.as_str()).to_string()),
            _ => None,
        })
        .collect()
}

fn legacy_sprint_name(raw: &str) -> Option<&str> {
    let start = raw.find("name=")? + "name=".len();
    let rest = &raw[start..];
    let end = rest.find(',').unwrap_or_else(|| rest.find(']').unwrap_or(rest.len()));
    Some(&rest[..end])
}
