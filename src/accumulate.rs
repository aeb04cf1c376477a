use crate::dates::{was_active_before, ReportWindow};
use crate::flatten::{NaturalKey, SiteOccurrence};
use crate::schema::WorkStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which work statuses count as "to be refunded". Department-configurable;
/// supplied by the caller, never assumed by the accumulator beyond the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundPolicy(BTreeSet<WorkStatus>);

impl Default for RefundPolicy {
    fn default() -> Self {
        Self(BTreeSet::from([WorkStatus::ToBeRefunded]))
    }
}

impl RefundPolicy {
    pub fn new(statuses: impl IntoIterator<Item = WorkStatus>) -> Self {
        Self(statuses.into_iter().collect())
    }

    pub fn counts_as_refund(&self, status: Option<WorkStatus>) -> bool {
        status.map(|s| self.0.contains(&s)).unwrap_or(false)
    }
}

/// One displayed number plus the exact records behind it. `count` always
/// equals `records.len()`; membership is by natural key, so the same site
/// arriving twice contributes once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    pub count: usize,
    pub records: Vec<SiteOccurrence>,
    #[serde(skip)]
    keys: BTreeSet<NaturalKey>,
}

impl MetricSet {
    /// Returns false (and changes nothing) when the key is already present.
    pub fn insert(&mut self, occ: &SiteOccurrence) -> bool {
        if !self.keys.insert(occ.natural_key()) {
            return false;
        }
        self.records.push(occ.clone());
        self.count = self.records.len();
        true
    }

    pub fn contains(&self, key: &NaturalKey) -> bool {
        self.keys.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Everything in `self` whose key is not in `excluded`, as a fresh set.
    pub fn difference(&self, excluded: &MetricSet) -> MetricSet {
        let mut out = MetricSet::default();
        for occ in &self.records {
            if !excluded.contains(&occ.natural_key()) {
                out.insert(occ);
            }
        }
        out
    }

    /// Union of the two sets, first-seen-wins on key collisions.
    pub fn union(&self, other: &MetricSet) -> MetricSet {
        let mut out = MetricSet::default();
        for occ in self.records.iter().chain(other.records.iter()) {
            out.insert(occ);
        }
        out
    }
}

/// Stable metric names for drill-down lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    PreviousBalance,
    CurrentApplications,
    ToBeRefunded,
    TotalApplications,
    Completed,
    Balance,
}

/// Reconciled application movement for one bucket over the window.
///
/// The four input metrics are filled by [`observe`](Self::observe); the two
/// derived metrics are built by [`finalize`](Self::finalize) from key-based
/// set operations, never by counter arithmetic, so the count/list invariant
/// survives occurrences that belong to several input sets at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub previous_balance: MetricSet,
    pub current_applications: MetricSet,
    pub to_be_refunded: MetricSet,
    pub total_applications: MetricSet,
    pub completed: MetricSet,
    pub balance: MetricSet,
}

impl ProgressStats {
    /// Evaluate the four input memberships for one occurrence.
    pub fn observe(&mut self, occ: &SiteOccurrence, window: &ReportWindow, policy: &RefundPolicy) {
        if window.contains_opt(occ.first_remittance_date) {
            self.current_applications.insert(occ);
        }
        if was_active_before(occ.first_remittance_date, occ.completion_date, window.start()) {
            self.previous_balance.insert(occ);
        }
        if window.contains_opt(occ.completion_date) {
            self.completed.insert(occ);
        }
        if policy.counts_as_refund(occ.work_status) {
            self.to_be_refunded.insert(occ);
        }
    }

    /// Derive totals: carried-over plus new arrivals, minus refunds; balance
    /// is what remains after removing completions.
    pub fn finalize(&mut self) {
        self.total_applications = self
            .previous_balance
            .union(&self.current_applications)
            .difference(&self.to_be_refunded);
        self.balance = self.total_applications.difference(&self.completed);
    }

    pub fn metric(&self, metric: Metric) -> &MetricSet {
        match metric {
            Metric::PreviousBalance => &self.previous_balance,
            Metric::CurrentApplications => &self.current_applications,
            Metric::ToBeRefunded => &self.to_be_refunded,
            Metric::TotalApplications => &self.total_applications,
            Metric::Completed => &self.completed,
            Metric::Balance => &self.balance,
        }
    }
}
