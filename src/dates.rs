use crate::error::{ReconciliationError, Result};
use crate::schema::RawDate;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Epoch values at or above this are millisecond-resolution; below, seconds.
const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// Coerce a stored date into a comparable instant. Fallback order: timestamp
/// object, numeric epoch (seconds vs. milliseconds by magnitude), ISO-8601
/// datetime, `yyyy-MM-dd`, `dd/MM/yyyy`. Anything unparseable is `None`,
/// never an error.
pub fn normalize(raw: &RawDate) -> Option<NaiveDateTime> {
    match raw {
        RawDate::Timestamp {
            seconds,
            nanoseconds,
        } => DateTime::from_timestamp(*seconds, *nanoseconds).map(|dt| dt.naive_utc()),
        RawDate::Epoch(n) => {
            let (secs, nanos) = if n.abs() >= MILLIS_THRESHOLD {
                (n / 1000, (n.rem_euclid(1000) * 1_000_000) as u32)
            } else {
                (*n, 0)
            };
            DateTime::from_timestamp(secs, nanos).map(|dt| dt.naive_utc())
        }
        RawDate::Text(s) => normalize_text(s.trim()),
    }
}

fn normalize_text(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%d/%m/%Y") {
        return d.and_hms_opt(0, 0, 0);
    }
    None
}

/// The caller-chosen inclusive reporting period. Bounds are materialized as
/// start-of-day on the start date and the last nanosecond of the end date, so
/// "From 1 June, To 30 June" covers all of June 30th.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReportWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl ReportWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(ReconciliationError::InvalidWindow { start, end });
        }
        Ok(Self {
            start: start.and_hms_opt(0, 0, 0).unwrap_or_default(),
            end: end
                .and_hms_nano_opt(23, 59, 59, 999_999_999)
                .unwrap_or_default(),
        })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Inclusive on both bounds.
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at <= self.end
    }

    /// Absent dates never qualify.
    pub fn contains_opt(&self, at: Option<NaiveDateTime>) -> bool {
        at.map(|d| self.contains(d)).unwrap_or(false)
    }
}

/// True when the entity already existed and was not yet finished at the moment
/// the window opened: first activity strictly before the window start, and
/// either no completion or a completion strictly after the window start.
pub fn was_active_before(
    first_activity: Option<NaiveDateTime>,
    completion: Option<NaiveDateTime>,
    window_start: NaiveDateTime,
) -> bool {
    match first_activity {
        Some(first) => first < window_start && completion.map_or(true, |c| c > window_start),
        None => false,
    }
}
