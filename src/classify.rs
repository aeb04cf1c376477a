use crate::flatten::SiteOccurrence;
use crate::schema::{ApplicationType, Diameter, Purpose};
use serde::{Deserialize, Serialize};

/// Row key inside one of the two drilling-well tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WellBucket {
    pub application_type: ApplicationType,
    pub diameter: Diameter,
}

/// Diameters a drilling purpose is registered at. Non-drilling purposes have
/// no diameter split.
pub fn recognized_diameters(purpose: Purpose) -> &'static [Diameter] {
    match purpose {
        Purpose::BoreWell => &[Diameter::Mm110, Diameter::Mm140],
        Purpose::TubeWell => &[Diameter::Mm150, Diameter::Mm200],
        _ => &[],
    }
}

/// Route an occurrence to its drilling-table bucket: drilling purpose, one of
/// that purpose's recognized diameters, and a known application type. Returns
/// the owning table's purpose alongside the bucket.
pub fn well_table_bucket(occ: &SiteOccurrence) -> Option<(Purpose, WellBucket)> {
    let purpose = occ.purpose?;
    let diameter = occ.diameter?;
    let application_type = occ.application_type?;

    if !recognized_diameters(purpose).contains(&diameter) {
        return None;
    }

    Some((
        purpose,
        WellBucket {
            application_type,
            diameter,
        },
    ))
}

/// Route to the purpose-only summary. Independent of the well-table routing:
/// one occurrence may land in both views.
pub fn summary_bucket(occ: &SiteOccurrence) -> Option<Purpose> {
    occ.purpose
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::WorkStatus;

    fn occurrence(
        purpose: Option<Purpose>,
        diameter: Option<Diameter>,
        application_type: Option<ApplicationType>,
    ) -> SiteOccurrence {
        SiteOccurrence {
            file_number: "GW/3001/2023".to_string(),
            applicant_name: "Applicant".to_string(),
            application_type,
            site_name: "Plot A".to_string(),
            purpose,
            diameter,
            work_status: Some(WorkStatus::Pending),
            completion_date: None,
            first_remittance_date: None,
            first_remittance_amount: 0.0,
            total_expenditure: 0.0,
        }
    }

    #[test]
    fn test_bore_well_routes_to_its_table() {
        let occ = occurrence(
            Some(Purpose::BoreWell),
            Some(Diameter::Mm140),
            Some(ApplicationType::Domestic),
        );
        let (table, bucket) = well_table_bucket(&occ).unwrap();
        assert_eq!(table, Purpose::BoreWell);
        assert_eq!(bucket.application_type, ApplicationType::Domestic);
        assert_eq!(bucket.diameter, Diameter::Mm140);
    }

    #[test]
    fn test_unrecognized_diameter_is_not_routed() {
        // A tube-well diameter on a bore-well site stays out of both tables.
        let occ = occurrence(
            Some(Purpose::BoreWell),
            Some(Diameter::Mm200),
            Some(ApplicationType::Domestic),
        );
        assert_eq!(well_table_bucket(&occ), None);
    }

    #[test]
    fn test_missing_application_type_is_not_routed() {
        let occ = occurrence(Some(Purpose::TubeWell), Some(Diameter::Mm150), None);
        assert_eq!(well_table_bucket(&occ), None);
    }

    #[test]
    fn test_non_drilling_purpose_only_reaches_summary() {
        let occ = occurrence(
            Some(Purpose::PumpInstallation),
            None,
            Some(ApplicationType::Institution),
        );
        assert_eq!(well_table_bucket(&occ), None);
        assert_eq!(summary_bucket(&occ), Some(Purpose::PumpInstallation));
    }

    #[test]
    fn test_drilling_occurrence_lands_in_both_views() {
        let occ = occurrence(
            Some(Purpose::TubeWell),
            Some(Diameter::Mm200),
            Some(ApplicationType::Industry),
        );
        assert!(well_table_bucket(&occ).is_some());
        assert_eq!(summary_bucket(&occ), Some(Purpose::TubeWell));
    }
}
