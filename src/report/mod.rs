//! Presentation of planning and ratio reports.
//!
//! Tables go to a terminal, JSON to whatever consumes it. Both are built from
//! the aggregated datasets only; nothing here recomputes business values.

mod planning;
mod ratio;
pub mod table;

use chrono::{DateTime, Utc};
use owo_colors::Style;
use serde::Serialize;

pub use planning::{planning_json, render_planning};
pub use ratio::{ratio_json, render_ratio};

use crate::models::{RatioType, StatusTone, Task};
use crate::utils::truncate_chars;
use table::Cell;

/// Characters of `KEY: title` shown in task cells.
pub const TITLE_WIDTH: usize = 80;

/// Marker for a missing estimate or WSJF.
pub const MISSING: &str = "✘";

/// Text shown for an undefined percentage or efficiency.
pub const UNDEFINED: &str = "n/a";

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Table,
    /// Report datasets as JSON
    Json,
}

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub color: bool,
    /// Base of ticket links, e.g. `https://jira.example.com/browse/`
    pub browse_url: Option<String>,
}

impl RenderOptions {
    pub fn new(color: bool) -> Self {
        Self {
            color,
            browse_url: None,
        }
    }

    pub fn with_links(mut self, browse_url: impl Into<String>) -> Self {
        self.browse_url = Some(browse_url.into());
        self
    }
}

/// JSON document wrapping a report dataset.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub command: &'static str,
    pub generated_at: DateTime<Utc>,
    pub report: T,
}

fn to_json<T: Serialize>(
    command: &'static str,
    generated_at: DateTime<Utc>,
    report: T,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&Envelope {
        command,
        generated_at,
        report,
    })
}

fn md(value: f64) -> String {
    format!("{:.2}", value)
}

fn percentage(value: Option<f64>) -> String {
    match value {
        Some(p) => format!("{:.1} %", p),
        None => UNDEFINED.to_string(),
    }
}

fn red() -> Style {
    Style::new().red()
}

/// Estimate cell; zero means the estimate was never filled in.
fn estimate_cell(estimate: f64) -> Cell {
    if estimate > 0.0 {
        Cell::plain(md(estimate))
    } else {
        Cell::styled(MISSING, red())
    }
}

fn status_cell(task: &Task) -> Cell {
    let style = match task.status_tone() {
        StatusTone::Warning => Some(Style::new().yellow()),
        StatusTone::Positive => Some(Style::new().green()),
        StatusTone::Neutral => None,
    };
    Cell::new().push(task.status.as_str(), style)
}

fn badge_style(issue_type: &str) -> Option<Style> {
    match issue_type {
        "Bug" => Some(Style::new().white().on_red()),
        "Analysis" => Some(Style::new().black().on_white()),
        _ => None,
    }
}

/// `[T] KEY: title`, colored by ratio type, with an optional link line.
fn task_cell(task: &Task, options: &RenderOptions) -> Cell {
    let badge = task
        .issue_type
        .chars()
        .next()
        .map(|c| format!("[{}]", c.to_uppercase()))
        .unwrap_or_else(|| "[?]".to_string());
    let title = format!("{}: {}", task.key, task.title);
    let title_style = match task.ratio_type {
        RatioType::Maintenance => Some(Style::new().green()),
        RatioType::Excluded => Some(Style::new().magenta()),
        RatioType::Bug | RatioType::Product => None,
    };

    let cell = Cell::new()
        .push(badge, badge_style(&task.issue_type))
        .push(" ", None)
        .push(truncate_chars(&title, TITLE_WIDTH), title_style);

    match &options.browse_url {
        Some(base) => cell.line().push(format!("{}{}", base, task.key), None),
        None => cell,
    }
}

/// Red above three times the estimate, yellow above twice.
fn time_spent_style(task: &Task) -> Option<Style> {
    let spent = task.time_spent_seconds as f64;
    let estimate = task.estimate_seconds();
    if spent > 3.0 * estimate {
        Some(red())
    } else if spent > 2.0 * estimate {
        Some(Style::new().yellow())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::make_task;
    use crate::utils::WORK_DAY_SECONDS;

    #[test]
    fn test_percentage_formatting() {
        assert_eq!(percentage(Some(66.666)), "66.7 %");
        assert_eq!(percentage(Some(0.0)), "0.0 %");
        assert_eq!(percentage(None), "n/a");
    }

    #[test]
    fn test_missing_estimate_marked() {
        assert_eq!(estimate_cell(0.0).text(), MISSING);
        assert_eq!(estimate_cell(1.5).text(), "1.50");
    }

    #[test]
    fn test_task_cell_badge_truncation_and_link() {
        let mut task = make_task("PAY-1", "Alice Smith", RatioType::Bug, 1.0);
        task.title = "x".repeat(200);

        let cell = task_cell(&task, &RenderOptions::new(false));
        let text = cell.text();
        assert!(text.starts_with("[B] PAY-1: xxx"));
        assert_eq!(text.chars().count(), 4 + TITLE_WIDTH);

        let options = RenderOptions::new(false).with_links("https://jira.example.com/browse/");
        let text = task_cell(&task, &options).text();
        assert!(text.ends_with("\nhttps://jira.example.com/browse/PAY-1"));
    }

    #[test]
    fn test_time_spent_highlight_thresholds() {
        let mut task = make_task("A-1", "Alice Smith", RatioType::Product, 1.0);

        task.time_spent_seconds = 2 * WORK_DAY_SECONDS;
        assert!(time_spent_style(&task).is_none());

        task.time_spent_seconds = 2 * WORK_DAY_SECONDS + 1;
        assert!(time_spent_style(&task).is_some());

        task.time_spent_seconds = 0;
        task.estimate = 0.0;
        assert!(time_spent_style(&task).is_none());
    }
}
