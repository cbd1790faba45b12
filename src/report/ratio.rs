use chrono::{DateTime, Utc};
use owo_colors::{OwoColorize, Style};
use serde::Serialize;

use super::table::{Align, Cell, Table};
use super::{estimate_cell, md, percentage, status_cell, task_cell, time_spent_style, to_json};
use super::{RenderOptions, UNDEFINED};
use crate::models::Task;
use crate::ratio::{EstimateSplit, ReleaseBucket, ReleaseReport, TimeSplit};
use crate::utils::format_seconds;

#[derive(Debug, Serialize)]
struct EstimateView {
    #[serde(flatten)]
    sums: EstimateSplit,
    total: f64,
    maintenance_percentage: Option<f64>,
    product_percentage: Option<f64>,
}

impl From<EstimateSplit> for EstimateView {
    fn from(sums: EstimateSplit) -> Self {
        Self {
            total: sums.total(),
            maintenance_percentage: sums.maintenance_percentage(),
            product_percentage: sums.product_percentage(),
            sums,
        }
    }
}

#[derive(Debug, Serialize)]
struct TimeView {
    #[serde(flatten)]
    seconds: TimeSplit,
    total: u64,
    maintenance_percentage: Option<f64>,
    product_percentage: Option<f64>,
}

impl From<TimeSplit> for TimeView {
    fn from(seconds: TimeSplit) -> Self {
        Self {
            total: seconds.total(),
            maintenance_percentage: seconds.maintenance_percentage(),
            product_percentage: seconds.product_percentage(),
            seconds,
        }
    }
}

#[derive(Debug, Serialize)]
struct BucketView<'r, 'a> {
    release: &'r str,
    working_days: Option<f64>,
    efficiency: Option<f64>,
    estimate: EstimateView,
    time_spent: TimeView,
    tasks: &'r [&'a Task],
}

#[derive(Debug, Serialize)]
struct TotalsView {
    estimate: EstimateView,
    time_spent: TimeView,
}

#[derive(Debug, Serialize)]
struct RatioView<'r, 'a> {
    releases: Vec<BucketView<'r, 'a>>,
    totals: TotalsView,
}

/// Ratio report as a JSON document.
pub fn ratio_json(
    report: &ReleaseReport<'_>,
    generated_at: DateTime<Utc>,
) -> Result<String, serde_json::Error> {
    let releases = report
        .buckets
        .iter()
        .map(|bucket| BucketView {
            release: &bucket.release,
            working_days: bucket.working_days,
            efficiency: bucket.efficiency,
            estimate: bucket.estimate.into(),
            time_spent: bucket.time_spent.into(),
            tasks: &bucket.tasks,
        })
        .collect();

    let view = RatioView {
        releases,
        totals: TotalsView {
            estimate: report.totals.estimate.into(),
            time_spent: report.totals.time_spent.into(),
        },
    };
    to_json("ratio", generated_at, view)
}

/// One task table per release, each followed by its ratio summary, then the
/// summary over all releases.
pub fn render_ratio(report: &ReleaseReport<'_>, options: &RenderOptions) -> String {
    if report.buckets.is_empty() {
        return "No tasks found.\n".to_string();
    }

    let mut out = String::new();
    for bucket in &report.buckets {
        out.push_str(&bucket_table(bucket, options).render(options.color));
        out.push_str(&summary_line(
            &bucket.estimate,
            &bucket.time_spent,
            options.color,
        ));
        out.push_str(&format!(
            "Total: {} MD, time spent {}\n",
            md(bucket.estimate.total()),
            format_seconds(bucket.time_spent.total())
        ));
        if let Some(days) = bucket.working_days {
            let efficiency = bucket
                .efficiency
                .map(|e| format!("{:.2}", e))
                .unwrap_or_else(|| UNDEFINED.to_string());
            out.push_str(&format!(
                "Efficiency: {} MD per working day ({} working days planned)\n",
                efficiency, days
            ));
        }
        out.push('\n');
    }

    let totals = &report.totals;
    out.push_str(&heading("All releases", options.color));
    out.push_str(&summary_line(&totals.estimate, &totals.time_spent, options.color));
    out.push_str(&format!(
        "Total: {} MD, time spent {}\n",
        md(totals.estimate.total()),
        format_seconds(totals.time_spent.total())
    ));
    out
}

fn heading(text: &str, color: bool) -> String {
    if color {
        format!("{}\n", text.style(Style::new().bold().underline()))
    } else {
        format!("{}\n", text)
    }
}

/// `MAINTENANCE: 2.00 MD / 66.7 % / ⏱ 50.0 %  |  PRODUCT: ...  |  EXCLUDED: ...`
fn summary_line(estimate: &EstimateSplit, time: &TimeSplit, color: bool) -> String {
    let label = |text: &str, style: Style| {
        if color {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    };

    format!(
        "{}: {} MD / {} / ⏱ {}  |  {}: {} MD / {} / ⏱ {}  |  {}: {} MD\n",
        label("MAINTENANCE", Style::new().green().bold()),
        md(estimate.maintenance),
        percentage(estimate.maintenance_percentage()),
        percentage(time.maintenance_percentage()),
        label("PRODUCT", Style::new().bold()),
        md(estimate.product),
        percentage(estimate.product_percentage()),
        percentage(time.product_percentage()),
        label("EXCLUDED", Style::new().magenta().bold()),
        md(estimate.excluded),
    )
}

fn bucket_table(bucket: &ReleaseBucket<'_>, options: &RenderOptions) -> Table {
    let mut table = Table::new(&["Fix version", "Assignee", "Task", "HLE", "Time spent", "Status"])
        .align(3, Align::Right)
        .align(4, Align::Right);

    let mut previous: Option<&str> = None;
    for (index, task) in bucket.tasks.iter().enumerate() {
        let release = if index == 0 {
            Cell::new().push(bucket.release.as_str(), Some(Style::new().bold()))
        } else {
            Cell::new()
        };
        let assignee = if previous == Some(task.assignee.as_str()) {
            Cell::new()
        } else {
            Cell::plain(task.assignee.as_str())
        };
        previous = Some(task.assignee.as_str());

        table.row(vec![
            release,
            assignee,
            task_cell(task, options),
            estimate_cell(task.estimate),
            Cell::new().push(
                format_seconds(task.time_spent_seconds),
                time_spent_style(task),
            ),
            status_cell(task),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::RatioType;
    use crate::ratio::aggregate;
    use crate::test_utils::make_release_task;

    fn scenario() -> Vec<Task> {
        vec![
            make_release_task("A-1", "Alice", RatioType::Maintenance, 2.0, Some("6.12")),
            make_release_task("A-2", "Alice", RatioType::Bug, 1.0, Some("6.12")),
            make_release_task("A-3", "Bob", RatioType::Excluded, 3.0, Some("6.13")),
        ]
    }

    #[test]
    fn test_render_buckets_and_summaries() {
        let tasks = scenario();
        let report = aggregate(&tasks, &BTreeMap::new());
        let out = render_ratio(&report, &RenderOptions::new(false));

        assert!(out.contains("MAINTENANCE: 2.00 MD / 66.7 % / ⏱ n/a  |  PRODUCT: 1.00 MD / 33.3 %"));
        assert!(out.contains("MAINTENANCE: 0.00 MD / n/a / ⏱ n/a"));
        assert!(out.contains("EXCLUDED: 3.00 MD"));
        assert!(out.contains("All releases"));
        assert!(out.contains("Total: 6.00 MD, time spent 0s"));
        assert!(!out.contains("Efficiency"));
    }

    #[test]
    fn test_repeated_assignee_blanked() {
        let tasks = scenario();
        let report = aggregate(&tasks, &BTreeMap::new());
        let out = render_ratio(&report, &RenderOptions::new(false));

        let alice_lines = out.lines().filter(|l| l.contains("Alice")).count();
        assert_eq!(alice_lines, 1);
    }

    #[test]
    fn test_efficiency_line() {
        let tasks = scenario();
        let mut budget = BTreeMap::new();
        budget.insert("6.12".to_string(), 6.0);
        let report = aggregate(&tasks, &budget);
        let out = render_ratio(&report, &RenderOptions::new(false));

        assert!(out.contains("Efficiency: 0.50 MD per working day (6 working days planned)"));
    }

    #[test]
    fn test_empty_report() {
        let report = aggregate(&[], &BTreeMap::new());
        assert_eq!(render_ratio(&report, &RenderOptions::new(false)), "No tasks found.\n");
    }

    #[test]
    fn test_json_document() {
        let tasks = scenario();
        let report = aggregate(&tasks, &BTreeMap::new());
        let json = ratio_json(&report, Utc::now()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["command"], "ratio");
        assert_eq!(value["report"]["releases"][0]["release"], "6.12");
        assert_eq!(value["report"]["releases"][0]["estimate"]["product"], 1.0);
        assert!(value["report"]["releases"][1]["estimate"]["maintenance_percentage"].is_null());
        assert_eq!(value["report"]["totals"]["estimate"]["total"], 6.0);
        assert_eq!(value["report"]["releases"][0]["tasks"][1]["key"], "A-2");
    }
}
