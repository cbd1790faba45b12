use std::path::PathBuf;

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::report::OutputFormat;
use crate::team::MemberOverride;
use crate::tracker::DEFAULT_LIMIT;

/// Team file used by `planning` when none is given.
pub const DEFAULT_TEAM_FILE: &str = "configs/team.yaml";

/// Command line interface definition for jirafly.
#[derive(Parser, Debug)]
#[command(name = "jirafly")]
#[command(about = "Sprint capacity and maintenance/product ratio reports from Jira filters")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbosity")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sprint planning per assignee against team capacity
    Planning(PlanningArgs),
    /// Maintenance/product ratio per release
    Ratio(RatioArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PlanningArgs {
    /// Team configuration file
    #[arg(value_name = "TEAM", default_value = DEFAULT_TEAM_FILE)]
    pub team: PathBuf,

    /// Override a member's availability for this sprint (repeatable)
    /// Example: --member peter=7,0.3
    #[arg(short, long = "member", value_name = "NICK=WD,VEL")]
    pub members: Vec<MemberOverride>,

    /// Saved Jira filter with the sprint's tickets
    #[arg(long, env = "PLANNING_FILTER_ID")]
    pub filter: Option<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct RatioArgs {
    /// Team configuration providing the working-days budget per release
    #[arg(long, value_name = "FILE")]
    pub team: Option<PathBuf>,

    /// Saved Jira filter with the releases' tickets
    #[arg(long, env = "RATIO_FILTER_ID")]
    pub filter: Option<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Where tickets come from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Jira base URL
    #[arg(long, env = "JIRA_URL")]
    pub jira_url: Option<String>,

    /// Account email used for basic auth
    #[arg(long, env = "JIRA_EMAIL")]
    pub jira_email: Option<String>,

    /// API token used for basic auth
    #[arg(long, env = "JIRA_TOKEN", hide_env_values = true)]
    pub jira_token: Option<String>,

    /// Read a saved Jira search response instead of calling the API
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Maximum number of issues to fetch
    #[arg(long, default_value_t = DEFAULT_LIMIT, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: u64,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Show a browse link under each task
    #[arg(long)]
    pub links: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new())]
    pub no_color: bool,
}
