use crate::dates::normalize;
use crate::schema::{ApplicationType, Diameter, FileRecord, Purpose, WorkStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identity of a site across scan passes: owning file number, site name,
/// purpose. Two occurrences with the same key are the same entity for every
/// set operation, regardless of which pass produced them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NaturalKey {
    pub file_number: String,
    pub site_name: String,
    pub purpose: Option<Purpose>,
}

/// One site with its owning file's context denormalized onto it, dates already
/// run through the normalizer. This is the unit every bucket list holds, so the
/// drill-down view has both file- and site-level fields without a second fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteOccurrence {
    pub file_number: String,
    pub applicant_name: String,
    pub application_type: Option<ApplicationType>,
    pub site_name: String,
    pub purpose: Option<Purpose>,
    pub diameter: Option<Diameter>,
    pub work_status: Option<WorkStatus>,
    pub completion_date: Option<NaiveDateTime>,
    pub first_remittance_date: Option<NaiveDateTime>,
    pub first_remittance_amount: f64,
    pub total_expenditure: f64,
}

impl SiteOccurrence {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            file_number: self.file_number.clone(),
            site_name: self.site_name.clone(),
            purpose: self.purpose,
        }
    }
}

/// Emit one occurrence per site per file. No filtering happens here; routing
/// and window tests belong to the classifier and accumulator.
pub fn flatten_files(files: &[FileRecord]) -> Vec<SiteOccurrence> {
    let mut occurrences = Vec::new();

    for file in files {
        let first = file.first_remittance();
        let first_date = first.and_then(|r| r.date.as_ref()).and_then(normalize);
        let first_amount = first.and_then(|r| r.amount).unwrap_or(0.0);

        for site in &file.sites {
            occurrences.push(SiteOccurrence {
                file_number: file.file_number.clone(),
                applicant_name: file.applicant_name.clone(),
                application_type: file.application_type,
                site_name: site.name.clone(),
                purpose: site.purpose,
                diameter: site.diameter,
                work_status: site.work_status,
                completion_date: site.completion_date.as_ref().and_then(normalize),
                first_remittance_date: first_date,
                first_remittance_amount: first_amount,
                total_expenditure: site.total_expenditure.unwrap_or(0.0),
            });
        }
    }

    occurrences
}

/// Collapse occurrences sharing a natural key, keeping the first seen. Applied
/// wherever one logical site can arrive through more than one scan pass.
pub fn dedupe_occurrences(occurrences: Vec<SiteOccurrence>) -> Vec<SiteOccurrence> {
    let mut seen: BTreeSet<NaturalKey> = BTreeSet::new();
    occurrences
        .into_iter()
        .filter(|occ| seen.insert(occ.natural_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RawDate, Remittance, SiteRecord};
    use chrono::NaiveDate;

    fn site(name: &str, purpose: Purpose) -> SiteRecord {
        SiteRecord {
            name: name.to_string(),
            purpose: Some(purpose),
            diameter: None,
            work_status: Some(WorkStatus::Pending),
            completion_date: None,
            total_expenditure: None,
        }
    }

    fn file_with_sites(number: &str, sites: Vec<SiteRecord>) -> FileRecord {
        FileRecord {
            file_number: number.to_string(),
            applicant_name: "Applicant".to_string(),
            application_type: Some(ApplicationType::Domestic),
            sites,
            remittances: vec![Remittance {
                amount: Some(3000.0),
                date: Some(RawDate::Text("2023-06-05".to_string())),
                account_head: None,
            }],
            payments: vec![],
        }
    }

    #[test]
    fn test_flatten_carries_file_context_onto_every_site() {
        let files = vec![file_with_sites(
            "GW/2001/2023",
            vec![site("Plot A", Purpose::BoreWell), site("Plot B", Purpose::TubeWell)],
        )];

        let occurrences = flatten_files(&files);
        assert_eq!(occurrences.len(), 2);
        for occ in &occurrences {
            assert_eq!(occ.file_number, "GW/2001/2023");
            assert_eq!(occ.applicant_name, "Applicant");
            assert_eq!(occ.first_remittance_amount, 3000.0);
            assert_eq!(
                occ.first_remittance_date,
                NaiveDate::from_ymd_opt(2023, 6, 5)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
            );
        }
    }

    #[test]
    fn test_flatten_defaults_absent_currency_to_zero() {
        let mut file = file_with_sites("GW/2002/2023", vec![site("Plot A", Purpose::BoreWell)]);
        file.remittances.clear();

        let occurrences = flatten_files(&[file]);
        assert_eq!(occurrences[0].first_remittance_amount, 0.0);
        assert_eq!(occurrences[0].total_expenditure, 0.0);
        assert_eq!(occurrences[0].first_remittance_date, None);
    }

    #[test]
    fn test_dedupe_keeps_first_seen() {
        let files = vec![file_with_sites(
            "GW/2003/2023",
            vec![site("Plot A", Purpose::BoreWell)],
        )];
        let mut first_pass = flatten_files(&files);
        let mut second_pass = flatten_files(&files);
        // Second pass carries divergent metadata; the first pass must win.
        second_pass[0].applicant_name = "Altered".to_string();
        first_pass.append(&mut second_pass);

        let deduped = dedupe_occurrences(first_pass);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].applicant_name, "Applicant");
    }

    #[test]
    fn test_same_site_name_different_purpose_is_distinct() {
        let files = vec![file_with_sites(
            "GW/2004/2023",
            vec![site("Plot A", Purpose::BoreWell), site("Plot A", Purpose::TubeWell)],
        )];
        let deduped = dedupe_occurrences(flatten_files(&files));
        assert_eq!(deduped.len(), 2);
    }
}
