mod planning;
mod ratio;

use std::io::{self, IsTerminal};

use log::{info, warn};

use crate::classify::ClassifyError;
use crate::cli::{Command, OutputArgs, SourceArgs};
use crate::models::RawTicket;
use crate::report::{OutputFormat, RenderOptions};
use crate::team::TeamConfigError;
use crate::tracker::{
    browse_url, CustomFields, JiraClient, JiraConfig, JsonFileSource, TicketSource, TrackerError,
};

pub use planning::planning_report;
pub use ratio::ratio_report;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Team(#[from] TeamConfigError),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// How a finished report is printed.
#[derive(Debug, Clone)]
pub struct OutputSettings {
    pub format: OutputFormat,
    pub options: RenderOptions,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Table,
            options: RenderOptions::new(false),
        }
    }
}

pub struct App {
    fields: CustomFields,
}

impl App {
    pub fn new(fields: CustomFields) -> Self {
        Self { fields }
    }

    pub fn run(&self, command: Command) -> Result<(), AppError> {
        let report = match command {
            Command::Planning(args) => {
                let team = planning::load_team(&args)?;
                let source = self.ticket_source(
                    &args.source,
                    args.filter.as_deref(),
                    "PLANNING_FILTER_ID",
                )?;
                let output = output_settings(&args.output, &args.source);
                planning_report(source.as_ref(), &team, &args.members, &output)?
            }
            Command::Ratio(args) => {
                let working_days = ratio::load_budget(&args)?;
                let source =
                    self.ticket_source(&args.source, args.filter.as_deref(), "RATIO_FILTER_ID")?;
                let output = output_settings(&args.output, &args.source);
                ratio_report(source.as_ref(), &working_days, &output)?
            }
        };

        print!("{}", report);
        Ok(())
    }

    /// Saved payload when `--input` is given, the Jira filter otherwise.
    fn ticket_source(
        &self,
        source: &SourceArgs,
        filter: Option<&str>,
        filter_var: &'static str,
    ) -> Result<Box<dyn TicketSource>, AppError> {
        if let Some(path) = &source.input {
            return Ok(Box::new(JsonFileSource::new(path, self.fields.clone())));
        }

        let config = jira_config(source)?.with_fields(self.fields.clone());
        let filter = filter.ok_or(TrackerError::MissingSetting(filter_var))?;
        Ok(Box::new(JiraClient::new(config, filter)?))
    }
}

fn jira_config(source: &SourceArgs) -> Result<JiraConfig, TrackerError> {
    let url = source
        .jira_url
        .as_deref()
        .ok_or(TrackerError::MissingSetting("JIRA_URL"))?;
    let email = source
        .jira_email
        .as_deref()
        .ok_or(TrackerError::MissingSetting("JIRA_EMAIL"))?;
    let token = source
        .jira_token
        .as_deref()
        .ok_or(TrackerError::MissingSetting("JIRA_TOKEN"))?;

    Ok(JiraConfig::new(url, email, token).with_limit(source.limit))
}

fn output_settings(output: &OutputArgs, source: &SourceArgs) -> OutputSettings {
    let color = !output.no_color && io::stdout().is_terminal();
    let mut options = RenderOptions::new(color);

    if output.links {
        match &source.jira_url {
            Some(url) => options = options.with_links(browse_url(url)),
            None => warn!("--links needs JIRA_URL; showing tasks without links"),
        }
    }

    OutputSettings {
        format: output.format,
        options,
    }
}

fn fetch(source: &dyn TicketSource) -> Result<Vec<RawTicket>, AppError> {
    info!("Fetching tasks from {}", source.describe());
    let tickets = source.fetch()?;
    info!("Fetched {} tasks", tickets.len());
    Ok(tickets)
}
