use chrono::{DateTime, Utc};
use owo_colors::Style;
use serde::Serialize;

use super::table::{Align, Cell, Table};
use super::{
    estimate_cell, md, percentage, red, status_cell, task_cell, to_json, RenderOptions, MISSING,
};
use crate::models::RatioType;
use crate::planning::{AssigneeRow, PlanningReport, RatioBreakdown};

#[derive(Debug, Serialize)]
struct Percentages {
    maintenance: Option<f64>,
    bug: Option<f64>,
    product: Option<f64>,
}

#[derive(Debug, Serialize)]
struct BreakdownView {
    #[serde(flatten)]
    estimate: RatioBreakdown,
    total: f64,
    percentages: Percentages,
}

impl From<RatioBreakdown> for BreakdownView {
    fn from(estimate: RatioBreakdown) -> Self {
        Self {
            total: estimate.total(),
            percentages: Percentages {
                maintenance: estimate.percentage(RatioType::Maintenance),
                bug: estimate.percentage(RatioType::Bug),
                product: estimate.percentage(RatioType::Product),
            },
            estimate,
        }
    }
}

#[derive(Debug, Serialize)]
struct PlanningView<'r, 'a> {
    team_capacity: f64,
    capacity_without_excluded: f64,
    sprint_goal: u64,
    assigned: BreakdownView,
    all: BreakdownView,
    assignees: &'r [AssigneeRow<'a>],
}

/// Planning report as a JSON document.
pub fn planning_json(
    report: &PlanningReport<'_>,
    generated_at: DateTime<Utc>,
) -> Result<String, serde_json::Error> {
    let view = PlanningView {
        team_capacity: report.team_capacity,
        capacity_without_excluded: report.capacity_without_excluded(),
        sprint_goal: report.sprint_goal,
        assigned: report.assigned.into(),
        all: report.all.into(),
        assignees: &report.rows,
    };
    to_json("planning", generated_at, view)
}

/// Capacity headline, ratio summary and the per-assignee task table.
pub fn render_planning(report: &PlanningReport<'_>, options: &RenderOptions) -> String {
    let mut out = format!(
        "Team capacity: {} MD ({} MD without ratio-excluded work)\nSprint goal (WSJF): {}\n\n",
        md(report.team_capacity),
        md(report.capacity_without_excluded()),
        report.sprint_goal
    );

    out.push_str(&summary_table(report).render(options.color));
    out.push('\n');

    let tasks = assignee_table(report, options);
    if tasks.is_empty() {
        out.push_str("No tasks found.\n");
    } else {
        out.push_str(&tasks.render(options.color));
    }
    out
}

fn summary_table(report: &PlanningReport<'_>) -> Table {
    let mut table = Table::new(&["", "Assigned", "%", "All", "%"])
        .align(1, Align::Right)
        .align(2, Align::Right)
        .align(3, Align::Right)
        .align(4, Align::Right);

    for ratio_type in RatioType::ALL {
        let in_ratio = ratio_type != RatioType::Excluded;
        let pct = |breakdown: &RatioBreakdown| {
            if in_ratio {
                percentage(breakdown.percentage(ratio_type))
            } else {
                String::new()
            }
        };
        table.row(vec![
            Cell::plain(ratio_type.name()),
            Cell::plain(md(report.assigned.get(ratio_type))),
            Cell::plain(pct(&report.assigned)),
            Cell::plain(md(report.all.get(ratio_type))),
            Cell::plain(pct(&report.all)),
        ]);
    }

    let assigned_total = report.assigned.total();
    let total_style = (assigned_total > report.team_capacity).then(red);
    table.separator();
    table.row(vec![
        Cell::plain("Total"),
        Cell::new().push(
            format!("{} / {}", md(assigned_total), md(report.team_capacity)),
            total_style,
        ),
        Cell::new(),
        Cell::plain(md(report.all.total())),
    ]);
    table
}

fn assignee_table(report: &PlanningReport<'_>, options: &RenderOptions) -> Table {
    let mut table = Table::new(&[
        "Assignee", "Tot.", "Cap.", "HLE", "Task", "WSJF", "TL", "Status", "FV",
    ])
    .align(1, Align::Right)
    .align(2, Align::Right)
    .align(3, Align::Right)
    .align(5, Align::Right);

    let mut first_group = true;
    for row in report.rows.iter().filter(|r| !r.plan.tasks.is_empty()) {
        if !first_group {
            table.separator();
        }
        first_group = false;

        let capacity = row.plan.capacity();
        let overloaded = capacity > 0.0 && row.plan.total_estimate > capacity;

        for (index, task) in row.plan.tasks.iter().enumerate() {
            let (name, total, cap) = if index == 0 {
                (
                    Cell::new().push(row.name.as_str(), Some(Style::new().bold())),
                    Cell::new().push(md(row.plan.total_estimate), overloaded.then(red)),
                    if capacity > 0.0 {
                        Cell::plain(md(capacity))
                    } else {
                        Cell::new()
                    },
                )
            } else {
                (Cell::new(), Cell::new(), Cell::new())
            };

            let wsjf = if task.priority_score > 0 {
                Cell::plain(task.priority_score.to_string())
            } else {
                Cell::styled(MISSING, red())
            };

            table.row(vec![
                name,
                total,
                cap,
                estimate_cell(task.estimate),
                task_cell(task, options),
                wsjf,
                Cell::plain(task.tech_lead_initials.as_str()),
                status_cell(task),
                Cell::plain(task.release.as_deref().unwrap_or("")),
            ]);
        }
    }
    table
}
