use chrono::Utc;
use log::info;

use super::{fetch, AppError, OutputSettings};
use crate::classify::classify_all;
use crate::cli::PlanningArgs;
use crate::planning::{aggregate, member_plans};
use crate::report::{planning_json, render_planning, OutputFormat};
use crate::team::{MemberOverride, TeamConfig};
use crate::tracker::TicketSource;

/// Load the team before anything is fetched, so config errors fail fast.
pub(super) fn load_team(args: &PlanningArgs) -> Result<TeamConfig, AppError> {
    let team = TeamConfig::load(&args.team)?;
    info!("Loaded team from {}", args.team.display());

    let names: Vec<&str> = team.members.iter().map(|m| m.name.as_str()).collect();
    info!("Team members: {}", names.join(", "));

    for line in team.override_summary(&args.members) {
        info!("Override: {}", line);
    }
    Ok(team)
}

/// Fetch, classify and aggregate the sprint's tickets into a rendered report.
pub fn planning_report(
    source: &dyn TicketSource,
    team: &TeamConfig,
    overrides: &[MemberOverride],
    output: &OutputSettings,
) -> Result<String, AppError> {
    let resolved = team.resolve(overrides);
    let raw = fetch(source)?;
    let tasks = classify_all(&raw)?;
    let report = aggregate(&tasks, member_plans(&resolved));

    Ok(match output.format {
        OutputFormat::Table => render_planning(&report, &output.options),
        OutputFormat::Json => planning_json(&report, Utc::now())? + "\n",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ClassifyError;
    use crate::models::{Person, RawTicket};
    use crate::test_utils::{make_assigned_ticket, make_raw_ticket, make_team};
    use crate::tracker::TrackerError;

    struct StaticSource(Vec<RawTicket>);

    impl TicketSource for StaticSource {
        fn fetch(&self) -> Result<Vec<RawTicket>, TrackerError> {
            Ok(self.0.clone())
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    #[test]
    fn test_planning_report_table() {
        let source = StaticSource(vec![
            make_assigned_ticket("A-1", "Alice Smith", 2.0),
            make_raw_ticket("A-2"),
        ]);
        let out = planning_report(&source, &make_team(), &[], &OutputSettings::default()).unwrap();

        assert!(out.starts_with("Team capacity: 12.00 MD"));
        assert!(out.contains("Alice Smith"));
        assert!(out.contains("Unassigned"));
    }

    #[test]
    fn test_overrides_change_capacity() {
        let source = StaticSource(Vec::new());
        let overrides: Vec<MemberOverride> = vec!["bob=0,0.8".parse().unwrap()];
        let out =
            planning_report(&source, &make_team(), &overrides, &OutputSettings::default()).unwrap();
        assert!(out.starts_with("Team capacity: 4.00 MD"));
    }

    #[test]
    fn test_malformed_ticket_fails_report() {
        let mut broken = make_raw_ticket("A-2");
        broken.status = None;
        broken.assignee = Some(Person::new("Alice Smith"));
        let source = StaticSource(vec![make_raw_ticket("A-1"), broken]);

        let err = planning_report(&source, &make_team(), &[], &OutputSettings::default())
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Classify(ClassifyError::MalformedTicket { .. })
        ));
    }

    #[test]
    fn test_planning_report_json() {
        let source = StaticSource(vec![make_assigned_ticket("A-1", "Bob Jones", 1.0)]);
        let output = OutputSettings {
            format: OutputFormat::Json,
            ..OutputSettings::default()
        };
        let out = planning_report(&source, &make_team(), &[], &output).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["report"]["assigned"]["product"], 1.0);
    }
}
