//! Shared test utilities for creating test fixtures.

use crate::models::{Person, RatioType, RawTicket, Task, UNASSIGNED};
use crate::team::{TeamConfig, TeamMember};

/// A structurally complete raw ticket with every optional field absent
pub fn make_raw_ticket(key: &str) -> RawTicket {
    RawTicket {
        key: Some(key.to_string()),
        summary: Some(format!("Summary of {}", key)),
        issue_type: Some("Story".to_string()),
        status: Some("To Do".to_string()),
        ..RawTicket::default()
    }
}

/// A raw ticket assigned to `assignee` with an estimate
pub fn make_assigned_ticket(key: &str, assignee: &str, estimate: f64) -> RawTicket {
    RawTicket {
        assignee: Some(Person::new(assignee)),
        estimate: Some(estimate),
        ..make_raw_ticket(key)
    }
}

/// A classified task; pass [`UNASSIGNED`] to get an unassigned one
pub fn make_task(key: &str, assignee: &str, ratio_type: RatioType, estimate: f64) -> Task {
    Task {
        key: key.to_string(),
        title: format!("Summary of {}", key),
        issue_type: if ratio_type == RatioType::Bug {
            "Bug".to_string()
        } else {
            "Story".to_string()
        },
        assignee: assignee.to_string(),
        is_assigned: assignee != UNASSIGNED,
        status: "To Do".to_string(),
        estimate,
        priority_score: 0,
        ratio_type,
        release: None,
        sprint: None,
        tech_lead_initials: String::new(),
        time_spent_seconds: 0,
    }
}

/// A task in a given release
pub fn make_release_task(
    key: &str,
    assignee: &str,
    ratio_type: RatioType,
    estimate: f64,
    release: Option<&str>,
) -> Task {
    Task {
        release: release.map(str::to_string),
        ..make_task(key, assignee, ratio_type, estimate)
    }
}

pub fn make_member(name: &str, nickname: &str, work_days: f64, velocity: f64) -> TeamMember {
    TeamMember {
        name: name.to_string(),
        nickname: nickname.to_string(),
        work_days,
        velocity,
    }
}

/// Two-person team: Alice (8 wd, 0.5 vel) and Bob (10 wd, 0.8 vel)
pub fn make_team() -> TeamConfig {
    TeamConfig::new(vec![
        make_member("Alice Smith", "alice", 8.0, 0.5),
        make_member("Bob Jones", "bob", 10.0, 0.8),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_task_unassigned() {
        let task = make_task("A-1", UNASSIGNED, RatioType::Product, 1.0);
        assert!(!task.is_assigned);
        let task = make_task("A-1", "Alice Smith", RatioType::Bug, 1.0);
        assert!(task.is_assigned);
        assert_eq!(task.issue_type, "Bug");
    }

    #[test]
    fn test_make_team() {
        let team = make_team();
        assert_eq!(team.members.len(), 2);
        assert!(team.validate().is_ok());
    }
}
