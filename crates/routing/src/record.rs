//! Normalized case records handed over by the ingestion layer.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use flowledger_core::CaseId;

/// Equipment vendor of a case.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Vendor {
    Hitachi,
    Siemens,
    #[serde(other)]
    Other,
}

/// Date cell value as delivered by ingestion.
///
/// Structured values are taken as-is; text is parsed leniently and may fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDate {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(String),
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

impl RawDate {
    /// Resolve to a calendar day.
    ///
    /// `Ok(None)` for blank text, `Err` with the offending text when nothing
    /// parses. Datetimes are truncated to their day.
    pub fn to_date(&self) -> Result<Option<NaiveDate>, String> {
        match self {
            RawDate::Date(d) => Ok(Some(*d)),
            RawDate::DateTime(dt) => Ok(Some(dt.date())),
            RawDate::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(None);
                }
                DATE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                    .or_else(|| {
                        DATETIME_FORMATS
                            .iter()
                            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                            .map(|dt| dt.date())
                    })
                    .map(Some)
                    .ok_or_else(|| text.to_string())
            }
        }
    }
}

impl From<NaiveDate> for RawDate {
    fn from(value: NaiveDate) -> Self {
        RawDate::Date(value)
    }
}

/// One shipment case: identity plus location arrival dates.
///
/// Keys of `locations` are normalized location names; a `None` value means the
/// column exists but is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub case_id: CaseId,
    pub vendor: Vendor,
    pub package_count: u32,
    #[serde(default)]
    pub locations: BTreeMap<String, Option<RawDate>>,
}

impl CaseRecord {
    pub fn new(case_id: impl Into<CaseId>, vendor: Vendor) -> Self {
        Self {
            case_id: case_id.into(),
            vendor,
            package_count: 1,
            locations: BTreeMap::new(),
        }
    }

    pub fn with_packages(mut self, package_count: u32) -> Self {
        self.package_count = package_count;
        self
    }

    pub fn with_date(self, location: impl Into<String>, date: NaiveDate) -> Self {
        self.with_raw(location, RawDate::Date(date))
    }

    pub fn with_raw(mut self, location: impl Into<String>, raw: RawDate) -> Self {
        self.locations.insert(location.into(), Some(raw));
        self
    }

    pub fn with_empty(mut self, location: impl Into<String>) -> Self {
        self.locations.insert(location.into(), None);
        self
    }
}
