//! # Period Reconciliation & Aggregation Engine
//!
//! Turns a full in-memory snapshot of departmental case files (each owning
//! site sub-records with independent lifecycle dates) into a drill-down-capable
//! period report: applications open before the window, arrived during it,
//! refunded, completed, and still outstanding, bucketed by purpose, diameter
//! and application type, with parallel financial rollups and a revenue-head
//! ledger.
//!
//! ## Core Concepts
//!
//! - **Snapshot**: the complete set of [`FileRecord`]s, fetched by an external
//!   data-access layer; the engine only reads it
//! - **Window**: the caller's inclusive date range, [`ReportWindow`]
//! - **Natural key**: `(file number, site name, purpose)`, the site's
//!   identity across scan passes; every set operation keys on it
//! - **Drill-down**: every counter in the report carries the exact backing
//!   record list, resolvable via [`PeriodReport::drill_down`]
//!
//! The engine is a pure function of (snapshot, window, refund policy): no
//! I/O, no mutation of source records, and repeat runs over unchanged inputs
//! serialize to identical bytes.
//!
//! ## Example
//!
//! ```rust,ignore
//! use period_recon_engine::*;
//! use chrono::NaiveDate;
//!
//! let files: Vec<FileRecord> = fetch_snapshot();
//! let window = ReportWindow::new(
//!     NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2023, 6, 30).unwrap(),
//! )?;
//!
//! let report = generate_period_report(&files, window, &RefundPolicy::default())?;
//! let backing = report.drill_down(
//!     &BucketRef::Summary(Purpose::BoreWell),
//!     Metric::Balance,
//! );
//! ```

pub mod accumulate;
pub mod classify;
pub mod dates;
pub mod error;
pub mod finance;
pub mod flatten;
pub mod report;
pub mod schema;

pub use accumulate::{Metric, MetricSet, ProgressStats, RefundPolicy};
pub use classify::{recognized_diameters, summary_bucket, well_table_bucket, WellBucket};
pub use dates::{normalize, was_active_before, ReportWindow};
pub use error::{ReconciliationError, Result};
pub use finance::{
    rollup_finances, scan_revenue_head, FinanceEntry, FinanceStats, LedgerEntry, LedgerSource,
    RevenueLedger,
};
pub use flatten::{dedupe_occurrences, flatten_files, NaturalKey, SiteOccurrence};
pub use report::{assemble_report, BucketRef, PeriodReport, WellTable};
pub use schema::*;

use log::{debug, info};

pub struct ReconciliationProcessor;

impl ReconciliationProcessor {
    pub fn process(
        files: &[FileRecord],
        window: ReportWindow,
        policy: &RefundPolicy,
    ) -> Result<PeriodReport> {
        info!(
            "Generating period report over {} files, window {} to {}",
            files.len(),
            window.start(),
            window.end()
        );
        debug!(
            "Snapshot holds {} sites across {} files",
            files.iter().map(|f| f.sites.len()).sum::<usize>(),
            files.len()
        );

        Ok(assemble_report(files, window, policy))
    }
}

pub fn generate_period_report(
    files: &[FileRecord],
    window: ReportWindow,
    policy: &RefundPolicy,
) -> Result<PeriodReport> {
    ReconciliationProcessor::process(files, window, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn june_window() -> ReportWindow {
        ReportWindow::new(
            NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 6, 30).unwrap(),
        )
        .unwrap()
    }

    fn minimal_file(number: &str) -> FileRecord {
        FileRecord {
            file_number: number.to_string(),
            applicant_name: "Applicant".to_string(),
            application_type: Some(ApplicationType::Domestic),
            sites: vec![],
            remittances: vec![],
            payments: vec![],
        }
    }

    #[test]
    fn test_end_to_end_empty_snapshot() {
        let report =
            generate_period_report(&[], june_window(), &RefundPolicy::default()).unwrap();
        assert_eq!(report.grand_total, 0.0);
        assert_eq!(report.purpose_summary.len(), Purpose::ALL.len());
    }

    #[test]
    fn test_duplicate_file_numbers_tolerated_and_collapsed() {
        // A repeated file number is dirty data, not a caller error: the run
        // succeeds and colliding sites collapse on their natural key.
        let refunded_site = |name: &str| SiteRecord {
            name: name.to_string(),
            purpose: Some(Purpose::BoreWell),
            diameter: None,
            work_status: Some(WorkStatus::ToBeRefunded),
            completion_date: None,
            total_expenditure: None,
        };
        let mut first = minimal_file("GW/900/2023");
        first.sites.push(refunded_site("Plot A"));
        let mut second = minimal_file("GW/900/2023");
        second.sites.push(refunded_site("Plot A"));
        second.sites.push(refunded_site("Plot B"));

        let report =
            generate_period_report(&[first, second], june_window(), &RefundPolicy::default())
                .unwrap();
        let stats = report.purpose_summary.get(&Purpose::BoreWell).unwrap();

        // Three occurrences, two distinct natural keys: Plot A counts once,
        // Plot B still gets through.
        assert_eq!(stats.to_be_refunded.count, 2);
        let names: Vec<&str> = report
            .drill_down(&BucketRef::Summary(Purpose::BoreWell), Metric::ToBeRefunded)
            .unwrap()
            .iter()
            .map(|o| o.site_name.as_str())
            .collect();
        assert_eq!(names, ["Plot A", "Plot B"]);
    }

    #[test]
    fn test_sites_with_garbage_dates_are_kept_not_dropped() {
        let mut file = minimal_file("GW/2/2023");
        file.sites.push(SiteRecord {
            name: "Plot A".to_string(),
            purpose: Some(Purpose::BoreWell),
            diameter: None,
            work_status: Some(WorkStatus::ToBeRefunded),
            completion_date: Some(RawDate::Text("not a date".to_string())),
            total_expenditure: None,
        });

        let report =
            generate_period_report(&[file], june_window(), &RefundPolicy::default()).unwrap();
        let stats = report.purpose_summary.get(&Purpose::BoreWell).unwrap();

        // Unparseable dates exclude the site from interval tests only; the
        // status-driven membership still sees it.
        assert_eq!(stats.completed.count, 0);
        assert_eq!(stats.current_applications.count, 0);
        assert_eq!(stats.to_be_refunded.count, 1);
    }
}
