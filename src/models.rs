use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::utils::WORK_DAY_SECONDS;

/// Display name used for tickets nobody is assigned to.
pub const UNASSIGNED: &str = "Unassigned";

/// Bucket label for tickets without a fix version.
pub const NO_FIX_VERSION: &str = "No Fix Version";

/// Category a ticket's estimate counts towards when computing team-load ratios.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RatioType {
    Maintenance,
    Bug,
    Product,
    /// Work that is tracked but left out of the maintenance/product ratio
    Excluded,
}

impl RatioType {
    pub const ALL: [RatioType; 4] = [
        RatioType::Maintenance,
        RatioType::Bug,
        RatioType::Product,
        RatioType::Excluded,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Maintenance => "Maintenance",
            Self::Bug => "Bug",
            Self::Product => "Product",
            Self::Excluded => "Excluded",
        }
    }
}

impl Display for RatioType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How a workflow status is highlighted in reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    /// Work is in flight or blocked on someone
    Warning,
    /// Work is (nearly) finished
    Positive,
    Neutral,
}

impl StatusTone {
    pub fn of(status: &str) -> Self {
        match status {
            "In Progress" | "In Review" | "Waiting" => Self::Warning,
            "In Testing" | "Merged" | "Done" => Self::Positive,
            _ => Self::Neutral,
        }
    }
}

/// Assignee (or tech lead) as delivered by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub display_name: String,
}

impl Person {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
        }
    }
}

/// A ticket as handed over by a tracker collaborator.
///
/// Structurally required fields are still optional here so that a missing one
/// can be reported as a malformed ticket instead of failing deserialization
/// of the whole batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTicket {
    pub key: Option<String>,
    pub summary: Option<String>,
    pub issue_type: Option<String>,
    pub status: Option<String>,
    pub assignee: Option<Person>,
    /// Effort estimate in ideal work-days
    pub estimate: Option<f64>,
    pub priority_score: Option<f64>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub fix_versions: Vec<String>,
    #[serde(default)]
    pub sprints: Vec<String>,
    pub tech_lead_first: Option<Person>,
    pub tech_lead_second: Option<Person>,
    pub time_spent_seconds: Option<u64>,
}

/// A classified ticket. Built once by the classifier and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub key: String,
    /// Full summary; renderers truncate it for display
    pub title: String,
    pub issue_type: String,
    pub assignee: String,
    /// Whether the ticket had an assignee at all, independent of the display name
    pub is_assigned: bool,
    pub status: String,
    /// HLE in ideal work-days
    pub estimate: f64,
    /// WSJF
    pub priority_score: u32,
    pub ratio_type: RatioType,
    pub release: Option<String>,
    pub sprint: Option<String>,
    pub tech_lead_initials: String,
    pub time_spent_seconds: u64,
}

impl Task {
    pub fn status_tone(&self) -> StatusTone {
        StatusTone::of(&self.status)
    }

    /// Release label used for bucketing, falling back to [`NO_FIX_VERSION`].
    pub fn release_label(&self) -> &str {
        self.release.as_deref().unwrap_or(NO_FIX_VERSION)
    }

    /// The estimate expressed in seconds of 8-hour work days.
    pub fn estimate_seconds(&self) -> f64 {
        self.estimate * WORK_DAY_SECONDS as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::make_task;

    #[test]
    fn test_status_tone() {
        assert_eq!(StatusTone::of("In Progress"), StatusTone::Warning);
        assert_eq!(StatusTone::of("Waiting"), StatusTone::Warning);
        assert_eq!(StatusTone::of("Merged"), StatusTone::Positive);
        assert_eq!(StatusTone::of("Done"), StatusTone::Positive);
        assert_eq!(StatusTone::of("To Do"), StatusTone::Neutral);
        assert_eq!(StatusTone::of("done"), StatusTone::Neutral);
    }

    #[test]
    fn test_release_label_fallback() {
        let mut task = make_task("A-1", "Alice", RatioType::Product, 1.0);
        task.release = None;
        assert_eq!(task.release_label(), NO_FIX_VERSION);

        task.release = Some("6.12".to_string());
        assert_eq!(task.release_label(), "6.12");
    }

    #[test]
    fn test_estimate_seconds() {
        let task = make_task("A-1", "Alice", RatioType::Product, 0.5);
        assert_eq!(task.estimate_seconds(), 14400.0);
    }

    #[test]
    fn test_ratio_type_display() {
        assert_eq!(RatioType::Maintenance.to_string(), "Maintenance");
        assert_eq!(RatioType::ALL.len(), 4);
    }

    #[test]
    fn raw_ticket_deserializes_with_missing_optionals() {
        let raw: RawTicket =
            serde_json::from_str(r#"{"key": "A-1", "summary": "x", "issue_type": "Story", "status": "Done"}"#)
                .unwrap();
        assert_eq!(raw.key.as_deref(), Some("A-1"));
        assert!(raw.labels.is_empty());
        assert!(raw.assignee.is_none());
    }
}
