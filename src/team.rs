//! Team composition and capacity.
//!
//! The team is described in a YAML file:
//!
//! ```yaml
//! members:
//!   - name: Peter Parker
//!     nickname: peter
//!     wd: 8
//!     vel: 0.8
//! releases:
//!   "6.12": 40
//! ```
//!
//! `wd` is the number of work days in the sprint, `vel` the velocity factor
//! turning work days into ideal man-days. `releases` optionally maps a release
//! token to the working days planned for it.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::UNASSIGNED;

/// Upper bound for work days in a sprint
pub const MAX_WORK_DAYS: f64 = 10.0;

#[derive(Debug, thiserror::Error)]
pub enum TeamConfigError {
    #[error("Team configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read team configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid YAML in {}: {message}", .path.display())]
    Yaml { path: PathBuf, message: String },
    #[error("Invalid team configuration: {0}")]
    Invalid(String),
}

/// One configured team member.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TeamMember {
    /// Full name, matched against the tracker's assignee display name
    pub name: String,
    /// Short handle used by `--member` overrides
    pub nickname: String,
    #[serde(alias = "wd")]
    pub work_days: f64,
    #[serde(alias = "vel")]
    pub velocity: f64,
}

impl TeamMember {
    pub fn availability(&self) -> Availability {
        Availability::new(self.work_days, self.velocity)
    }
}

/// Work days and velocity of one member for the planned sprint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Availability {
    pub work_days: f64,
    pub velocity: f64,
}

impl Availability {
    pub fn new(work_days: f64, velocity: f64) -> Self {
        Self {
            work_days,
            velocity,
        }
    }

    /// Capacity in ideal man-days.
    pub fn capacity(&self) -> f64 {
        self.work_days * self.velocity
    }
}

/// Sum of the members' capacities.
pub fn team_capacity<'a>(members: impl IntoIterator<Item = &'a Availability>) -> f64 {
    members.into_iter().map(Availability::capacity).sum()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TeamConfig {
    pub members: Vec<TeamMember>,
    /// Working days budget per release token
    #[serde(default)]
    pub releases: BTreeMap<String, f64>,
}

impl TeamConfig {
    pub fn new(members: Vec<TeamMember>) -> Self {
        Self {
            members,
            releases: BTreeMap::new(),
        }
    }

    pub fn with_release_budget(mut self, release: impl Into<String>, working_days: f64) -> Self {
        self.releases.insert(release.into(), working_days);
        self
    }

    /// Load, normalize and validate a team configuration file.
    pub fn load(path: &Path) -> Result<Self, TeamConfigError> {
        if !path.exists() {
            return Err(TeamConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_yaml(&content).map_err(|err| match err {
            TeamConfigError::Yaml { message, .. } => TeamConfigError::Yaml {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        Ok(config)
    }

    /// Parse, normalize and validate YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, TeamConfigError> {
        let mut config: Self =
            serde_yaml::from_str(content).map_err(|e| TeamConfigError::Yaml {
                path: PathBuf::new(),
                message: e.to_string(),
            })?;

        for member in &mut config.members {
            member.name = member.name.trim().to_string();
            member.nickname = member.nickname.trim().to_string();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TeamConfigError> {
        if self.members.is_empty() {
            return Err(invalid("at least one team member is required"));
        }

        let mut names = HashSet::new();
        let mut nicknames = HashSet::new();

        for (idx, member) in self.members.iter().enumerate() {
            if member.name.trim().is_empty() {
                return Err(invalid(format!("member #{} has an empty name", idx + 1)));
            }
            if member.name.trim() == UNASSIGNED {
                return Err(invalid(format!(
                    "member #{} uses the reserved name '{}'",
                    idx + 1,
                    UNASSIGNED
                )));
            }
            if member.nickname.trim().is_empty() {
                return Err(invalid(format!("{} has an empty nickname", member.name)));
            }
            if !(member.work_days > 0.0 && member.work_days <= MAX_WORK_DAYS) {
                return Err(invalid(format!(
                    "{}: work days must be in (0, {}], got {}",
                    member.name, MAX_WORK_DAYS, member.work_days
                )));
            }
            if !(member.velocity > 0.0 && member.velocity.is_finite()) {
                return Err(invalid(format!(
                    "{}: velocity must be positive, got {}",
                    member.name, member.velocity
                )));
            }
            if !names.insert(member.name.as_str()) {
                return Err(invalid(format!("duplicate member name '{}'", member.name)));
            }
            if !nicknames.insert(member.nickname.as_str()) {
                return Err(invalid(format!(
                    "duplicate nickname '{}'",
                    member.nickname
                )));
            }
        }

        for (release, days) in &self.releases {
            if !(*days > 0.0 && days.is_finite()) {
                return Err(invalid(format!(
                    "release {}: working days must be positive, got {}",
                    release, days
                )));
            }
        }

        Ok(())
    }

    pub fn member_by_nickname(&self, nickname: &str) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.nickname == nickname)
    }

    /// Availability per full name with overrides applied.
    ///
    /// Overrides for nicknames that are not configured are skipped. When the
    /// same nickname is overridden twice the later one wins.
    pub fn resolve(&self, overrides: &[MemberOverride]) -> BTreeMap<String, Availability> {
        let mut resolved: BTreeMap<String, Availability> = self
            .members
            .iter()
            .map(|m| (m.name.clone(), m.availability()))
            .collect();

        for (member, ovr) in self.applicable(overrides) {
            resolved.insert(member.name.clone(), ovr.availability());
        }

        resolved
    }

    /// One line per override that matched a configured member.
    pub fn override_summary(&self, overrides: &[MemberOverride]) -> Vec<String> {
        self.applicable(overrides)
            .map(|(member, ovr)| {
                format!(
                    "{} ({}): wd={}, vel={}",
                    ovr.nickname, member.name, ovr.work_days, ovr.velocity
                )
            })
            .collect()
    }

    fn applicable<'a>(
        &'a self,
        overrides: &'a [MemberOverride],
    ) -> impl Iterator<Item = (&'a TeamMember, &'a MemberOverride)> + 'a {
        overrides
            .iter()
            .filter_map(|ovr| self.member_by_nickname(&ovr.nickname).map(|m| (m, ovr)))
    }
}

fn invalid(message: impl Into<String>) -> TeamConfigError {
    TeamConfigError::Invalid(message.into())
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid member format '{input}': {reason}. Expected: nickname=wd,vel (e.g. peter=7.0,0.3)")]
pub struct OverrideParseError {
    pub input: String,
    pub reason: String,
}

/// A `nickname=wd,vel` command line override.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberOverride {
    pub nickname: String,
    pub work_days: f64,
    pub velocity: f64,
}

impl MemberOverride {
    pub fn availability(&self) -> Availability {
        Availability::new(self.work_days, self.velocity)
    }
}

impl FromStr for MemberOverride {
    type Err = OverrideParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason: &str| OverrideParseError {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let (nickname, values) = s.split_once('=').ok_or_else(|| fail("missing '='"))?;
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(fail("empty nickname"));
        }

        let (wd, vel) = values
            .split_once(',')
            .ok_or_else(|| fail("expected two comma-separated values"))?;
        let parse = |v: &str, what: &str| -> Result<f64, OverrideParseError> {
            match v.trim().parse::<f64>() {
                Ok(n) if n.is_finite() && n >= 0.0 => Ok(n),
                Ok(_) => Err(fail(&format!("{} must be a non-negative number", what))),
                Err(_) => Err(fail(&format!("{} is not a number", what))),
            }
        };

        Ok(Self {
            nickname: nickname.to_string(),
            work_days: parse(wd, "work days")?,
            velocity: parse(vel, "velocity")?,
        })
    }
}
