//! Sprint planning: tasks grouped per assignee against team capacity.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::Serialize;

use crate::models::{RatioType, Task, UNASSIGNED};
use crate::team::{team_capacity, Availability};
use crate::utils::share;

/// A member's availability and the tasks assigned to them.
#[derive(Debug, Clone, Serialize)]
pub struct MemberPlan<'a> {
    #[serde(flatten)]
    pub availability: Availability,
    pub tasks: Vec<&'a Task>,
    pub total_estimate: f64,
}

impl<'a> MemberPlan<'a> {
    pub fn new(availability: Availability) -> Self {
        Self {
            availability,
            tasks: Vec::new(),
            total_estimate: 0.0,
        }
    }

    /// Plan collecting tasks nobody in the team owns; it has no capacity.
    pub fn unassigned() -> Self {
        Self::new(Availability::new(0.0, 0.0))
    }

    pub fn assign(&mut self, task: &'a Task) {
        self.total_estimate += task.estimate;
        self.tasks.push(task);
    }

    pub fn capacity(&self) -> f64 {
        self.availability.capacity()
    }
}

/// Build empty plans for resolved team members.
pub fn member_plans<'a>(
    resolved: &BTreeMap<String, Availability>,
) -> BTreeMap<String, MemberPlan<'a>> {
    resolved
        .iter()
        .map(|(name, availability)| (name.clone(), MemberPlan::new(*availability)))
        .collect()
}

/// Estimate sums per ratio category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RatioBreakdown {
    pub maintenance: f64,
    pub bug: f64,
    pub product: f64,
    pub excluded: f64,
}

impl RatioBreakdown {
    pub fn add(&mut self, ratio_type: RatioType, estimate: f64) {
        match ratio_type {
            RatioType::Maintenance => self.maintenance += estimate,
            RatioType::Bug => self.bug += estimate,
            RatioType::Product => self.product += estimate,
            RatioType::Excluded => self.excluded += estimate,
        }
    }

    pub fn get(&self, ratio_type: RatioType) -> f64 {
        match ratio_type {
            RatioType::Maintenance => self.maintenance,
            RatioType::Bug => self.bug,
            RatioType::Product => self.product,
            RatioType::Excluded => self.excluded,
        }
    }

    /// Load that counts towards the ratio (everything except excluded work).
    pub fn ratio_total(&self) -> f64 {
        self.maintenance + self.bug + self.product
    }

    pub fn total(&self) -> f64 {
        self.ratio_total() + self.excluded
    }

    /// Share of `ratio_type` in the ratio total; `None` when that total is zero.
    pub fn percentage(&self, ratio_type: RatioType) -> Option<f64> {
        share(self.get(ratio_type), self.ratio_total())
    }
}

/// One row group of the planning table.
#[derive(Debug, Clone, Serialize)]
pub struct AssigneeRow<'a> {
    pub name: String,
    #[serde(flatten)]
    pub plan: MemberPlan<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanningReport<'a> {
    /// Team members alphabetically, then the unassigned bucket
    pub rows: Vec<AssigneeRow<'a>>,
    pub team_capacity: f64,
    /// Breakdown over tasks that have an assignee
    pub assigned: RatioBreakdown,
    /// Breakdown over every task
    pub all: RatioBreakdown,
    /// Sum of WSJF over assigned tasks
    pub sprint_goal: u64,
}

impl PlanningReport<'_> {
    /// Capacity left once ratio-excluded work is taken out.
    pub fn capacity_without_excluded(&self) -> f64 {
        self.team_capacity - self.all.excluded
    }

    pub fn row(&self, name: &str) -> Option<&AssigneeRow<'_>> {
        self.rows.iter().find(|r| r.name == name)
    }

    pub fn unassigned(&self) -> &AssigneeRow<'_> {
        // aggregate() always pushes the unassigned row last
        &self.rows[self.rows.len() - 1]
    }
}

/// Distribute tasks over member plans.
///
/// Tasks without an assignee, or assigned to someone outside the team, land in
/// the unassigned plan, which is always part of the report.
pub fn aggregate<'a>(
    tasks: &'a [Task],
    mut plans: BTreeMap<String, MemberPlan<'a>>,
) -> PlanningReport<'a> {
    let mut unassigned = MemberPlan::unassigned();
    let mut assigned = RatioBreakdown::default();
    let mut all = RatioBreakdown::default();
    let mut sprint_goal = 0u64;

    for task in tasks {
        match plans.get_mut(&task.assignee).filter(|_| task.is_assigned) {
            Some(plan) => plan.assign(task),
            None => {
                if let Some(message) = outside_team_warning(task) {
                    warn!("{}", message);
                }
                unassigned.assign(task);
            }
        }

        all.add(task.ratio_type, task.estimate);
        if task.is_assigned {
            assigned.add(task.ratio_type, task.estimate);
            sprint_goal += u64::from(task.priority_score);
        }
    }

    let team_capacity = team_capacity(plans.values().map(|p| &p.availability));
    debug!(
        "Planned {} tasks for {} members ({} unassigned)",
        tasks.len(),
        plans.len(),
        unassigned.tasks.len()
    );

    let mut rows: Vec<AssigneeRow<'a>> = plans
        .into_iter()
        .map(|(name, plan)| AssigneeRow { name, plan })
        .collect();
    rows.push(AssigneeRow {
        name: UNASSIGNED.to_string(),
        plan: unassigned,
    });

    PlanningReport {
        rows,
        team_capacity,
        assigned,
        all,
        sprint_goal,
    }
}

/// Why an assigned task could not be matched to a team member.
fn outside_team_warning(task: &Task) -> Option<String> {
    if !task.is_assigned {
        None
    } else if task.assignee == UNASSIGNED {
        Some(format!("{} has an assignee without a display name", task.key))
    } else {
        Some(format!(
            "{} is assigned to {}, who is not in the team config",
            task.key, task.assignee
        ))
    }
}
