use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::dates::normalize;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "PascalCase")]
pub enum ApplicationType {
    #[schemars(description = "Household drinking-water application (private sector)")]
    Domestic,

    #[schemars(description = "Agricultural irrigation application (private sector)")]
    Irrigation,

    #[schemars(
        description = "Schools, hospitals, local bodies and other institutions (government sector)"
    )]
    Institution,

    #[schemars(description = "Industrial and commercial establishments (government sector)")]
    Industry,
}

impl ApplicationType {
    pub const ALL: [ApplicationType; 4] = [
        ApplicationType::Domestic,
        ApplicationType::Irrigation,
        ApplicationType::Institution,
        ApplicationType::Industry,
    ];

    /// Sector attribution used by the financial summary tables.
    pub fn sector(&self) -> Sector {
        match self {
            ApplicationType::Domestic | ApplicationType::Irrigation => Sector::Private,
            ApplicationType::Institution | ApplicationType::Industry => Sector::Government,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "PascalCase")]
pub enum Sector {
    Private,
    Government,
}

/// Service purpose of a single site. `BoreWell` and `TubeWell` are the two
/// drilling purposes that get their own diameter-split tables; every purpose
/// participates in the purpose-only summary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "PascalCase")]
pub enum Purpose {
    BoreWell,
    TubeWell,
    FilterPoint,
    OpenWellRecharge,
    PumpInstallation,
}

impl Purpose {
    pub const ALL: [Purpose; 5] = [
        Purpose::BoreWell,
        Purpose::TubeWell,
        Purpose::FilterPoint,
        Purpose::OpenWellRecharge,
        Purpose::PumpInstallation,
    ];
}

/// Drilled diameter. Only meaningful for the drilling purposes: bore wells are
/// registered at 110mm or 140mm, tube wells at 150mm or 200mm.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Diameter {
    #[serde(rename = "110mm")]
    Mm110,
    #[serde(rename = "140mm")]
    Mm140,
    #[serde(rename = "150mm")]
    Mm150,
    #[serde(rename = "200mm")]
    Mm200,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "PascalCase")]
pub enum WorkStatus {
    Pending,

    InProgress,

    #[schemars(description = "Terminal: work finished, completion date recorded")]
    Completed,

    #[schemars(description = "Terminal: drilling attempted and abandoned")]
    Failed,

    #[schemars(
        description = "Terminal: application withdrawn or rejected, remitted fee to be returned"
    )]
    ToBeRefunded,
}

/// Account a remittance was credited to. `Revenue` marks money destined for
/// the shared departmental revenue head and is what the ledger scan filters on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "PascalCase")]
pub enum AccountHead {
    Revenue,
    Deposit,
}

/// A stored date in whichever shape the upstream store happened to persist it.
/// Always run through [`normalize`](crate::dates::normalize) before comparison;
/// the engine never interprets these shapes directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RawDate {
    #[schemars(description = "Object-shaped timestamp: seconds since epoch plus nanoseconds")]
    Timestamp {
        seconds: i64,
        #[serde(default)]
        nanoseconds: u32,
    },

    #[schemars(
        description = "Numeric epoch, seconds or milliseconds (distinguished by magnitude)"
    )]
    Epoch(i64),

    #[schemars(description = "ISO-8601 datetime, yyyy-MM-dd, or dd/MM/yyyy")]
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Remittance {
    #[schemars(description = "Amount remitted; absent is treated as zero")]
    pub amount: Option<f64>,

    pub date: Option<RawDate>,

    pub account_head: Option<AccountHead>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Payment {
    pub date: Option<RawDate>,

    #[schemars(description = "Portion of the payment credited to the revenue head")]
    pub revenue_head_amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SiteRecord {
    #[schemars(description = "Site name; part of the (file, site, purpose) natural key")]
    pub name: String,

    pub purpose: Option<Purpose>,

    pub diameter: Option<Diameter>,

    pub work_status: Option<WorkStatus>,

    pub completion_date: Option<RawDate>,

    #[schemars(description = "Total expenditure booked against the site; absent is zero")]
    pub total_expenditure: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FileRecord {
    #[schemars(description = "Unique file number; the natural key for the case file")]
    pub file_number: String,

    pub applicant_name: String,

    pub application_type: Option<ApplicationType>,

    #[serde(default)]
    pub sites: Vec<SiteRecord>,

    #[serde(default)]
    pub remittances: Vec<Remittance>,

    #[serde(default)]
    pub payments: Vec<Payment>,
}

impl FileRecord {
    /// The remittance with the earliest normalizable date. Entries whose date
    /// does not normalize sort after dated ones; ties keep list order.
    pub fn first_remittance(&self) -> Option<&Remittance> {
        self.remittances
            .iter()
            .enumerate()
            .min_by_key(|(idx, r)| {
                let at = r.date.as_ref().and_then(normalize);
                (at.is_none(), at, *idx)
            })
            .map(|(_, r)| r)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(FileRecord)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
