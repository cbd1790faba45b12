//! Maintenance/product ratio per release.
//!
//! Bugs count as product work here; the planning view keeps them apart.

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::models::{RatioType, Task};
use crate::utils::share;

/// Estimate sums of a release, bugs merged into product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EstimateSplit {
    pub maintenance: f64,
    pub product: f64,
    pub excluded: f64,
}

impl EstimateSplit {
    pub fn add(&mut self, ratio_type: RatioType, estimate: f64) {
        match ratio_type {
            RatioType::Maintenance => self.maintenance += estimate,
            RatioType::Bug | RatioType::Product => self.product += estimate,
            RatioType::Excluded => self.excluded += estimate,
        }
    }

    pub fn merge(&mut self, other: &EstimateSplit) {
        self.maintenance += other.maintenance;
        self.product += other.product;
        self.excluded += other.excluded;
    }

    pub fn ratio_total(&self) -> f64 {
        self.maintenance + self.product
    }

    pub fn total(&self) -> f64 {
        self.ratio_total() + self.excluded
    }

    /// `None` when there is neither maintenance nor product work.
    pub fn maintenance_percentage(&self) -> Option<f64> {
        share(self.maintenance, self.ratio_total())
    }

    pub fn product_percentage(&self) -> Option<f64> {
        share(self.product, self.ratio_total())
    }
}

/// Logged seconds of a release, split like [`EstimateSplit`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeSplit {
    pub maintenance: u64,
    pub product: u64,
    pub excluded: u64,
}

impl TimeSplit {
    pub fn add(&mut self, ratio_type: RatioType, seconds: u64) {
        match ratio_type {
            RatioType::Maintenance => self.maintenance += seconds,
            RatioType::Bug | RatioType::Product => self.product += seconds,
            RatioType::Excluded => self.excluded += seconds,
        }
    }

    pub fn merge(&mut self, other: &TimeSplit) {
        self.maintenance += other.maintenance;
        self.product += other.product;
        self.excluded += other.excluded;
    }

    pub fn ratio_total(&self) -> u64 {
        self.maintenance + self.product
    }

    pub fn total(&self) -> u64 {
        self.ratio_total() + self.excluded
    }

    pub fn maintenance_percentage(&self) -> Option<f64> {
        share(self.maintenance as f64, self.ratio_total() as f64)
    }

    pub fn product_percentage(&self) -> Option<f64> {
        share(self.product as f64, self.ratio_total() as f64)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseBucket<'a> {
    /// Release token, or the fallback label for tasks without one
    pub release: String,
    /// Sorted by assignee, fetch order within the same assignee
    pub tasks: Vec<&'a Task>,
    pub estimate: EstimateSplit,
    pub time_spent: TimeSplit,
    /// Planned working days, when configured for this release
    pub working_days: Option<f64>,
    /// Total estimate per planned working day
    pub efficiency: Option<f64>,
}

impl<'a> ReleaseBucket<'a> {
    fn new(release: String) -> Self {
        Self {
            release,
            tasks: Vec::new(),
            estimate: EstimateSplit::default(),
            time_spent: TimeSplit::default(),
            working_days: None,
            efficiency: None,
        }
    }

    fn push(&mut self, task: &'a Task) {
        self.estimate.add(task.ratio_type, task.estimate);
        self.time_spent.add(task.ratio_type, task.time_spent_seconds);
        self.tasks.push(task);
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReleaseTotals {
    pub estimate: EstimateSplit,
    pub time_spent: TimeSplit,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseReport<'a> {
    /// Ordered by release label
    pub buckets: Vec<ReleaseBucket<'a>>,
    pub totals: ReleaseTotals,
}

impl ReleaseReport<'_> {
    pub fn bucket(&self, release: &str) -> Option<&ReleaseBucket<'_>> {
        self.buckets.iter().find(|b| b.release == release)
    }
}

/// Group tasks by release and sum their estimates and logged time.
///
/// `working_days` maps a release token to its planned working days; buckets
/// without an entry get no efficiency.
pub fn aggregate<'a>(
    tasks: &'a [Task],
    working_days: &BTreeMap<String, f64>,
) -> ReleaseReport<'a> {
    let mut grouped: BTreeMap<&str, ReleaseBucket<'a>> = BTreeMap::new();
    for task in tasks {
        let label = task.release_label();
        grouped
            .entry(label)
            .or_insert_with(|| ReleaseBucket::new(label.to_string()))
            .push(task);
    }

    let mut totals = ReleaseTotals::default();
    let buckets: Vec<ReleaseBucket<'a>> = grouped
        .into_values()
        .map(|mut bucket| {
            bucket.tasks.sort_by(|a, b| a.assignee.cmp(&b.assignee));
            bucket.working_days = working_days.get(&bucket.release).copied();
            bucket.efficiency = bucket
                .working_days
                .filter(|days| *days > 0.0)
                .map(|days| bucket.estimate.total() / days);

            totals.estimate.merge(&bucket.estimate);
            totals.time_spent.merge(&bucket.time_spent);
            bucket
        })
        .collect();

    debug!("Grouped {} tasks into {} releases", tasks.len(), buckets.len());

    ReleaseReport { buckets, totals }
}
