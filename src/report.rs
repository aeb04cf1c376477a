use crate::accumulate::{Metric, ProgressStats, RefundPolicy};
use crate::classify::{recognized_diameters, summary_bucket, well_table_bucket, WellBucket};
use crate::dates::ReportWindow;
use crate::finance::{rollup_finances, scan_revenue_head, FinanceStats, RevenueLedger};
use crate::flatten::{dedupe_occurrences, flatten_files, SiteOccurrence};
use crate::schema::{ApplicationType, Diameter, FileRecord, Purpose, Sector};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Application-type rows split by recognized diameter, one per drilling table.
pub type WellTable = BTreeMap<ApplicationType, BTreeMap<Diameter, ProgressStats>>;

/// Stable address of one on-screen table cell group, for drill-down lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BucketRef {
    BoreWell(WellBucket),
    TubeWell(WellBucket),
    Summary(Purpose),
}

/// The complete snapshot for one window: two drilling tables, the purpose
/// summary, both financial summaries, the revenue-head ledger, and a combined
/// grand total. Every counter's backing records are inside the structure, so
/// a UI resolves any number to its record list without recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    pub window: ReportWindow,
    pub bore_well: WellTable,
    pub tube_well: WellTable,
    pub purpose_summary: BTreeMap<Purpose, ProgressStats>,
    pub private_finance: BTreeMap<Purpose, FinanceStats>,
    pub government_finance: BTreeMap<Purpose, FinanceStats>,
    pub revenue_ledger: RevenueLedger,
    pub grand_total: f64,
}

fn seeded_well_table(purpose: Purpose) -> WellTable {
    let mut table = WellTable::new();
    for application_type in ApplicationType::ALL {
        let row = table.entry(application_type).or_default();
        for &diameter in recognized_diameters(purpose) {
            row.insert(diameter, ProgressStats::default());
        }
    }
    table
}

fn seeded_summary() -> BTreeMap<Purpose, ProgressStats> {
    Purpose::ALL
        .into_iter()
        .map(|p| (p, ProgressStats::default()))
        .collect()
}

/// Build the full report for one window. Pure: reads the snapshot, mutates
/// nothing, and two runs over the same inputs produce identical output.
pub fn assemble_report(
    files: &[FileRecord],
    window: ReportWindow,
    policy: &RefundPolicy,
) -> PeriodReport {
    let mut bore_well = seeded_well_table(Purpose::BoreWell);
    let mut tube_well = seeded_well_table(Purpose::TubeWell);
    let mut purpose_summary = seeded_summary();

    // Two scan passes feed the same sets: the direct file walk, and a
    // completed-in-window pre-pass kept separate so renewal scans elsewhere
    // can reuse it. The same site can arrive through both, hence the dedupe.
    let direct = flatten_files(files);
    let completed_in_window: Vec<SiteOccurrence> = direct
        .iter()
        .filter(|occ| window.contains_opt(occ.completion_date))
        .cloned()
        .collect();
    let mut combined = completed_in_window;
    combined.extend(direct);
    let occurrences = dedupe_occurrences(combined);

    for occ in &occurrences {
        if let Some((table_purpose, bucket)) = well_table_bucket(occ) {
            let table = match table_purpose {
                Purpose::BoreWell => &mut bore_well,
                Purpose::TubeWell => &mut tube_well,
                // Only the two drilling purposes own a table.
                _ => continue,
            };
            if let Some(stats) = table
                .get_mut(&bucket.application_type)
                .and_then(|row| row.get_mut(&bucket.diameter))
            {
                stats.observe(occ, &window, policy);
            }
        }
        if let Some(purpose) = summary_bucket(occ) {
            if let Some(stats) = purpose_summary.get_mut(&purpose) {
                stats.observe(occ, &window, policy);
            }
        }
    }

    for row in bore_well.values_mut().chain(tube_well.values_mut()) {
        for stats in row.values_mut() {
            stats.finalize();
        }
    }
    for stats in purpose_summary.values_mut() {
        stats.finalize();
    }

    let mut private_finance = BTreeMap::new();
    let mut government_finance = BTreeMap::new();
    for ((purpose, sector), stats) in rollup_finances(files, &occurrences, &window) {
        match sector {
            Sector::Private => private_finance.insert(purpose, stats),
            Sector::Government => government_finance.insert(purpose, stats),
        };
    }

    let revenue_ledger = scan_revenue_head(files, &window);

    let finance_total: f64 = private_finance
        .values()
        .chain(government_finance.values())
        .map(|s| s.remitted + s.paid)
        .sum();
    let grand_total = finance_total + revenue_ledger.total;

    debug!(
        "Assembled report: {} occurrences, {} ledger entries, grand total {:.2}",
        occurrences.len(),
        revenue_ledger.entries.len(),
        grand_total
    );

    PeriodReport {
        window,
        bore_well,
        tube_well,
        purpose_summary,
        private_finance,
        government_finance,
        revenue_ledger,
        grand_total,
    }
}

impl PeriodReport {
    /// Resolve one displayed number to the exact records behind it. Direct
    /// lookup over the already-built lists; nothing is recomputed.
    pub fn drill_down(&self, bucket: &BucketRef, metric: Metric) -> Option<&[SiteOccurrence]> {
        let stats = match bucket {
            BucketRef::BoreWell(b) => self.bore_well.get(&b.application_type)?.get(&b.diameter)?,
            BucketRef::TubeWell(b) => self.tube_well.get(&b.application_type)?.get(&b.diameter)?,
            BucketRef::Summary(purpose) => self.purpose_summary.get(purpose)?,
        };
        Some(&stats.metric(metric).records)
    }
}
