//! Turns raw tracker tickets into classified [`Task`]s.

use log::debug;

use crate::models::{Person, RatioType, RawTicket, Task, UNASSIGNED};
use crate::utils::initials;
use crate::version::latest_version;

/// Labels that take a ticket out of the ratio entirely.
pub const EXCLUDED_LABELS: [&str; 2] = ["RatioExcluded", "Bughunting"];

/// Labels that mark a ticket as maintenance work.
pub const MAINTENANCE_LABELS: [&str; 2] = ["Maintenance", "DevOps"];

const TECH_LEAD_PLACEHOLDER: &str = "  ";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("Malformed ticket {}: missing {field}", .key.as_deref().unwrap_or("<no key>"))]
    MalformedTicket {
        key: Option<String>,
        field: &'static str,
    },
}

/// Classify a single ticket.
///
/// Optional fields fall back to their defaults; only a missing or blank key,
/// summary, issue type or status is an error.
pub fn classify(raw: &RawTicket) -> Result<Task, ClassifyError> {
    let key = required(raw, raw.key.as_deref(), "key")?;
    let title = required(raw, raw.summary.as_deref(), "summary")?;
    let issue_type = required(raw, raw.issue_type.as_deref(), "issue type")?;
    let status = required(raw, raw.status.as_deref(), "status")?;

    let assignee = raw
        .assignee
        .as_ref()
        .map(|p| p.display_name.as_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(UNASSIGNED);

    Ok(Task {
        key: key.to_string(),
        title: title.to_string(),
        issue_type: issue_type.to_string(),
        assignee: assignee.to_string(),
        is_assigned: raw.assignee.is_some(),
        status: status.to_string(),
        estimate: non_negative(raw.estimate),
        priority_score: non_negative(raw.priority_score) as u32,
        ratio_type: ratio_type(&raw.labels, issue_type),
        release: latest_version(&raw.fix_versions),
        sprint: latest_version(&raw.sprints),
        tech_lead_initials: tech_lead_initials(
            raw.tech_lead_first.as_ref(),
            raw.tech_lead_second.as_ref(),
        ),
        time_spent_seconds: raw.time_spent_seconds.unwrap_or(0),
    })
}

/// Classify a whole fetch. The first malformed ticket fails the batch so that
/// capacity totals never silently miss a ticket.
pub fn classify_all(raws: &[RawTicket]) -> Result<Vec<Task>, ClassifyError> {
    let tasks = raws.iter().map(classify).collect::<Result<Vec<_>, _>>()?;
    debug!("Classified {} tickets", tasks.len());
    Ok(tasks)
}

/// First matching rule wins: excluded labels, maintenance labels, bug type, product.
pub fn ratio_type(labels: &[String], issue_type: &str) -> RatioType {
    if has_any(labels, &EXCLUDED_LABELS) {
        RatioType::Excluded
    } else if has_any(labels, &MAINTENANCE_LABELS) {
        RatioType::Maintenance
    } else if issue_type == "Bug" {
        RatioType::Bug
    } else {
        RatioType::Product
    }
}

/// `"AB/CD"` for two tech leads, a two-space placeholder for a missing side,
/// and an empty string when neither is set.
pub fn tech_lead_initials(first: Option<&Person>, second: Option<&Person>) -> String {
    let first = person_initials(first);
    let second = person_initials(second);

    if first.is_empty() && second.is_empty() {
        return String::new();
    }

    let side = |s: &str| {
        if s.is_empty() {
            TECH_LEAD_PLACEHOLDER.to_string()
        } else {
            s.to_string()
        }
    };
    format!("{}/{}", side(&first), side(&second))
}

fn has_any(labels: &[String], wanted: &[&str]) -> bool {
    labels.iter().any(|l| wanted.contains(&l.as_str()))
}

fn person_initials(person: Option<&Person>) -> String {
    match person {
        Some(p) if !p.display_name.trim().is_empty() => initials(&p.display_name),
        _ => String::new(),
    }
}

fn required<'a>(
    raw: &RawTicket,
    value: Option<&'a str>,
    field: &'static str,
) -> Result<&'a str, ClassifyError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ClassifyError::MalformedTicket {
            key: raw.key.clone().filter(|k| !k.trim().is_empty()),
            field,
        })
}

fn non_negative(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::make_raw_ticket;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_ratio_excluded_wins_over_everything() {
        for other in [vec!["Maintenance"], vec!["DevOps", "Frontend"], vec![]] {
            let mut l = labels(&other);
            l.push("RatioExcluded".to_string());
            assert_eq!(ratio_type(&l, "Bug"), RatioType::Excluded);
            assert_eq!(ratio_type(&l, "Story"), RatioType::Excluded);
        }
        assert_eq!(
            ratio_type(&labels(&["Bughunting", "Maintenance"]), "Bug"),
            RatioType::Excluded
        );
    }

    #[test]
    fn test_maintenance_labels_beat_bug_type() {
        assert_eq!(
            ratio_type(&labels(&["Maintenance"]), "Bug"),
            RatioType::Maintenance
        );
        assert_eq!(
            ratio_type(&labels(&["DevOps"]), "Story"),
            RatioType::Maintenance
        );
    }

    #[test]
    fn test_bug_and_product_fallbacks() {
        assert_eq!(ratio_type(&[], "Bug"), RatioType::Bug);
        assert_eq!(ratio_type(&labels(&["Bug"]), "Story"), RatioType::Product);
        assert_eq!(ratio_type(&[], "Analysis"), RatioType::Product);
    }

    #[test]
    fn test_label_match_is_exact() {
        assert_eq!(
            ratio_type(&labels(&["maintenance", "RatioExcludedX"]), "Story"),
            RatioType::Product
        );
    }

    #[test]
    fn test_unassigned_ticket() {
        let raw = make_raw_ticket("A-1");
        let task = classify(&raw).unwrap();
        assert_eq!(task.assignee, UNASSIGNED);
        assert!(!task.is_assigned);
    }

    #[test]
    fn test_user_named_unassigned_is_assigned() {
        let mut raw = make_raw_ticket("A-1");
        raw.assignee = Some(Person::new("Unassigned"));
        let task = classify(&raw).unwrap();
        assert_eq!(task.assignee, UNASSIGNED);
        assert!(task.is_assigned);
    }

    #[test]
    fn test_empty_display_name_falls_back_to_sentinel() {
        let mut raw = make_raw_ticket("A-1");
        raw.assignee = Some(Person::new(""));
        let task = classify(&raw).unwrap();
        assert_eq!(task.assignee, UNASSIGNED);
        assert!(task.is_assigned);
    }

    #[test]
    fn test_optional_fields_default() {
        let task = classify(&make_raw_ticket("A-1")).unwrap();
        assert_eq!(task.estimate, 0.0);
        assert_eq!(task.priority_score, 0);
        assert_eq!(task.release, None);
        assert_eq!(task.sprint, None);
        assert_eq!(task.tech_lead_initials, "");
        assert_eq!(task.time_spent_seconds, 0);
        assert_eq!(task.ratio_type, RatioType::Product);
    }

    #[test]
    fn test_invalid_numbers_normalize_to_zero() {
        let mut raw = make_raw_ticket("A-1");
        raw.estimate = Some(f64::NAN);
        raw.priority_score = Some(-3.0);
        let task = classify(&raw).unwrap();
        assert_eq!(task.estimate, 0.0);
        assert_eq!(task.priority_score, 0);
    }

    #[test]
    fn test_priority_score_truncates() {
        let mut raw = make_raw_ticket("A-1");
        raw.priority_score = Some(12.9);
        assert_eq!(classify(&raw).unwrap().priority_score, 12);
    }

    #[test]
    fn test_release_and_sprint_are_independent() {
        let mut raw = make_raw_ticket("A-1");
        raw.fix_versions = labels(&["6.12.0 (16.9 - 29.9)", "6.11.2"]);
        raw.sprints = labels(&["Sprint 41"]);
        let task = classify(&raw).unwrap();
        assert_eq!(task.release.as_deref(), Some("6.12"));
        assert_eq!(task.sprint.as_deref(), Some("Sprint"));
    }

    #[test]
    fn test_tech_lead_initials() {
        let jane = Person::new("Jane Doe");
        let john = Person::new("john ronald smith");
        let blank = Person::new("   ");

        assert_eq!(tech_lead_initials(Some(&jane), Some(&john)), "JD/JRS");
        assert_eq!(tech_lead_initials(Some(&jane), None), "JD/  ");
        assert_eq!(tech_lead_initials(None, Some(&john)), "  /JRS");
        assert_eq!(tech_lead_initials(None, None), "");
        assert_eq!(tech_lead_initials(Some(&blank), Some(&blank)), "");
        assert_eq!(tech_lead_initials(Some(&blank), Some(&jane)), "  /JD");
    }

    #[test]
    fn test_missing_required_field() {
        let mut raw = make_raw_ticket("A-7");
        raw.status = None;
        assert_eq!(
            classify(&raw),
            Err(ClassifyError::MalformedTicket {
                key: Some("A-7".to_string()),
                field: "status"
            })
        );

        let mut raw = make_raw_ticket("A-8");
        raw.key = None;
        let err = classify(&raw).unwrap_err();
        assert_eq!(err.to_string(), "Malformed ticket <no key>: missing key");
    }

    #[test]
    fn test_blank_required_field() {
        let raw = make_raw_ticket("");
        let err = classify(&raw).unwrap_err();
        assert_eq!(
            err,
            ClassifyError::MalformedTicket {
                key: None,
                field: "key"
            }
        );

        let mut raw = make_raw_ticket("A-9");
        raw.issue_type = Some(String::new());
        assert_eq!(
            classify(&raw),
            Err(ClassifyError::MalformedTicket {
                key: Some("A-9".to_string()),
                field: "issue type"
            })
        );

        let mut raw = make_raw_ticket("A-10");
        raw.status = Some("  ".to_string());
        assert!(matches!(
            classify(&raw),
            Err(ClassifyError::MalformedTicket { field: "status", .. })
        ));
    }

    #[test]
    fn test_classify_all_fails_whole_batch() {
        let good = make_raw_ticket("A-1");
        let mut bad = make_raw_ticket("A-2");
        bad.summary = None;
        let result = classify_all(&[good.clone(), bad, good]);
        assert!(matches!(
            result,
            Err(ClassifyError::MalformedTicket { field: "summary", .. })
        ));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let mut raw = make_raw_ticket("A-1");
        raw.labels = labels(&["DevOps"]);
        raw.fix_versions = labels(&["6.13.0", "6.12.0"]);
        raw.estimate = Some(1.5);
        raw.assignee = Some(Person::new("Alice Smith"));
        raw.tech_lead_first = Some(Person::new("Bob Ray"));

        let first = classify(&raw).unwrap();
        let second = classify(&raw).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.ratio_type, RatioType::Maintenance);
        assert_eq!(first.release.as_deref(), Some("6.13"));
        assert_eq!(first.tech_lead_initials, "BR/  ");
    }
}
