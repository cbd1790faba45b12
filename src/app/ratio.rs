use std::collections::BTreeMap;

use chrono::Utc;
use log::{debug, info};

use super::{fetch, AppError, OutputSettings};
use crate::classify::classify_all;
use crate::cli::RatioArgs;
use crate::ratio::aggregate;
use crate::report::{ratio_json, render_ratio, OutputFormat};
use crate::team::TeamConfig;
use crate::tracker::TicketSource;

/// Working-days budget per release from `--team`, empty without it.
pub(super) fn load_budget(args: &RatioArgs) -> Result<BTreeMap<String, f64>, AppError> {
    let Some(path) = &args.team else {
        debug!("No team file given, efficiency will not be shown");
        return Ok(BTreeMap::new());
    };

    let team = TeamConfig::load(path)?;
    info!(
        "Loaded working-days budget for {} releases from {}",
        team.releases.len(),
        path.display()
    );
    Ok(team.releases)
}

/// Fetch, classify and group tickets by release into a rendered report.
pub fn ratio_report(
    source: &dyn TicketSource,
    working_days: &BTreeMap<String, f64>,
    output: &OutputSettings,
) -> Result<String, AppError> {
    let raw = fetch(source)?;
    let tasks = classify_all(&raw)?;
    let report = aggregate(&tasks, working_days);

    Ok(match output.format {
        OutputFormat::Table => render_ratio(&report, &output.options),
        OutputFormat::Json => ratio_json(&report, Utc::now())? + "\n",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawTicket;
    use crate::test_utils::make_assigned_ticket;
    use crate::tracker::TrackerError;

    struct FailingSource;

    impl TicketSource for FailingSource {
        fn fetch(&self) -> Result<Vec<RawTicket>, TrackerError> {
            Err(TrackerError::Cancelled)
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

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
    fn test_ratio_report_groups_by_latest_fix_version() {
        let mut ticket = make_assigned_ticket("A-1", "Alice Smith", 2.0);
        ticket.fix_versions = vec!["6.11.0".to_string(), "6.12.0 (16.9 - 29.9)".to_string()];
        ticket.labels = vec!["Maintenance".to_string()];
        let source = StaticSource(vec![ticket, make_assigned_ticket("A-2", "Bob Jones", 1.0)]);

        let mut budget = BTreeMap::new();
        budget.insert("6.12".to_string(), 4.0);
        let out = ratio_report(&source, &budget, &OutputSettings::default()).unwrap();

        assert!(out.contains("6.12"));
        assert!(out.contains("No Fix Version"));
        assert!(out.contains("Efficiency: 0.50 MD per working day"));
    }

    #[test]
    fn test_fetch_error_propagates() {
        let err = ratio_report(&FailingSource, &BTreeMap::new(), &OutputSettings::default())
            .unwrap_err();
        assert!(matches!(err, AppError::Tracker(TrackerError::Cancelled)));
    }

    #[test]
    fn test_budget_without_team_file_is_empty() {
        let args = RatioArgs {
            team: None,
            filter: None,
            source: crate::cli::SourceArgs {
                jira_url: None,
                jira_email: None,
                jira_token: None,
                input: None,
                limit: 10,
            },
            output: crate::cli::OutputArgs {
                format: OutputFormat::Table,
                links: false,
                no_color: true,
            },
        };
        assert!(load_budget(&args).unwrap().is_empty());
    }
}
