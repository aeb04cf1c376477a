use crate::dates::{normalize, ReportWindow};
use crate::flatten::{NaturalKey, SiteOccurrence};
use crate::schema::{AccountHead, FileRecord, Purpose, Sector};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One file-level money fact backing a financial counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceEntry {
    pub file_number: String,
    pub applicant_name: String,
    pub amount: f64,
    pub date: Option<NaiveDateTime>,
}

/// Money and movement totals for one (purpose, sector) bucket. Each counter
/// keeps the records behind it, same drill-down contract as the progress
/// tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceStats {
    pub remitted: f64,
    pub applications: usize,
    pub application_records: Vec<FinanceEntry>,
    pub paid: f64,
    pub completed: usize,
    pub completed_records: Vec<SiteOccurrence>,
}

impl FinanceStats {
    fn record_application(&mut self, entry: FinanceEntry) {
        self.remitted += entry.amount;
        self.application_records.push(entry);
        self.applications = self.application_records.len();
    }

    fn record_completion(&mut self, occ: &SiteOccurrence) {
        self.paid += occ.total_expenditure;
        self.completed_records.push(occ.clone());
        self.completed = self.completed_records.len();
    }
}

/// Build the two financial summary tables.
///
/// A file whose first remittance lands in the window is counted once per
/// distinct purpose among its sites, and the first-remittance amount is
/// attributed to every one of those purpose buckets. The fan-out across
/// purposes is deliberate departmental accounting, not a merge bug.
/// Completions are attributed per site, deduplicated by natural key.
pub fn rollup_finances(
    files: &[FileRecord],
    occurrences: &[SiteOccurrence],
    window: &ReportWindow,
) -> BTreeMap<(Purpose, Sector), FinanceStats> {
    let mut stats: BTreeMap<(Purpose, Sector), FinanceStats> = BTreeMap::new();
    for purpose in Purpose::ALL {
        stats.insert((purpose, Sector::Private), FinanceStats::default());
        stats.insert((purpose, Sector::Government), FinanceStats::default());
    }

    for file in files {
        let sector = match file.application_type {
            Some(at) => at.sector(),
            None => continue,
        };
        let first = file.first_remittance();
        let first_date = first.and_then(|r| r.date.as_ref()).and_then(normalize);
        if !window.contains_opt(first_date) {
            continue;
        }
        let amount = first.and_then(|r| r.amount).unwrap_or(0.0);

        let purposes: BTreeSet<Purpose> =
            file.sites.iter().filter_map(|s| s.purpose).collect();
        for purpose in purposes {
            stats
                .entry((purpose, sector))
                .or_default()
                .record_application(FinanceEntry {
                    file_number: file.file_number.clone(),
                    applicant_name: file.applicant_name.clone(),
                    amount,
                    date: first_date,
                });
        }
    }

    let mut seen_completed: BTreeSet<NaturalKey> = BTreeSet::new();
    for occ in occurrences {
        let (purpose, application_type) = match (occ.purpose, occ.application_type) {
            (Some(p), Some(at)) => (p, at),
            _ => continue,
        };
        if !window.contains_opt(occ.completion_date) {
            continue;
        }
        if !seen_completed.insert(occ.natural_key()) {
            continue;
        }
        stats
            .entry((purpose, application_type.sector()))
            .or_default()
            .record_completion(occ);
    }

    stats
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum LedgerSource {
    Remittance,
    Payment,
}

/// One credit to the shared revenue head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub file_number: String,
    pub applicant_name: String,
    pub source: LedgerSource,
    pub amount: f64,
    pub date: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueLedger {
    pub total: f64,
    pub entries: Vec<LedgerEntry>,
}

/// Scan every file's remittances and payments for credits to the revenue head
/// inside the window. This pass is independent of the bucket reconciliation
/// and needs no deduplication: ledger entries are money facts, not site-keyed.
pub fn scan_revenue_head(files: &[FileRecord], window: &ReportWindow) -> RevenueLedger {
    let mut ledger = RevenueLedger::default();

    for file in files {
        for remittance in &file.remittances {
            if remittance.account_head != Some(AccountHead::Revenue) {
                continue;
            }
            let date = match remittance.date.as_ref().and_then(normalize) {
                Some(d) if window.contains(d) => d,
                _ => continue,
            };
            let amount = remittance.amount.unwrap_or(0.0);
            ledger.total += amount;
            ledger.entries.push(LedgerEntry {
                file_number: file.file_number.clone(),
                applicant_name: file.applicant_name.clone(),
                source: LedgerSource::Remittance,
                amount,
                date,
            });
        }

        for payment in &file.payments {
            let date = match payment.date.as_ref().and_then(normalize) {
                Some(d) if window.contains(d) => d,
                _ => continue,
            };
            let amount = payment.revenue_head_amount.unwrap_or(0.0);
            ledger.total += amount;
            ledger.entries.push(LedgerEntry {
                file_number: file.file_number.clone(),
                applicant_name: file.applicant_name.clone(),
                source: LedgerSource::Payment,
                amount,
                date,
            });
        }
    }

    ledger
}
