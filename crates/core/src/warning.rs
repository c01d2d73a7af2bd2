//! Fail-soft warning channel.
//!
//! Data-quality problems and ledger balance breaches are collected and
//! returned alongside normal results; they never abort a run.

use serde::{Deserialize, Serialize};

use crate::id::CaseId;
use crate::period::Period;

/// Category of a warning.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningKind {
    DataQualityWarning,
    BalanceViolation,
}

/// Specific data-quality finding attached to a `DATA_QUALITY_WARNING`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataQualityIssue {
    /// Date text could not be parsed.
    UnparsableDate,
    /// Date parsed but lies outside the configured plausible window.
    ImplausibleDate,
    /// Record carries a date for a location that is not configured.
    UnknownLocation,
    /// Warehouse/offshore movement dated after the first site arrival.
    PostSiteMovement,
    /// A second record with an already-seen case id.
    DuplicateCase,
}

/// One warning: `(location_name, period, kind, magnitude)` plus context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    /// Location the warning is recorded against (`"*"` for global checks).
    pub location_name: String,
    /// Ledger period, when one applies.
    pub period: Option<Period>,
    pub kind: WarningKind,
    /// Size of the breach (units or ratio, depending on the check); `1.0` for
    /// single data-quality findings.
    pub magnitude: f64,
    /// Case the warning originates from, if any.
    pub case_id: Option<CaseId>,
    pub issue: Option<DataQualityIssue>,
    pub detail: String,
}

impl Warning {
    pub fn data_quality(
        case_id: CaseId,
        location_name: impl Into<String>,
        issue: DataQualityIssue,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            location_name: location_name.into(),
            period: None,
            kind: WarningKind::DataQualityWarning,
            magnitude: 1.0,
            case_id: Some(case_id),
            issue: Some(issue),
            detail: detail.into(),
        }
    }

    pub fn balance(
        location_name: impl Into<String>,
        period: Period,
        magnitude: f64,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            location_name: location_name.into(),
            period: Some(period),
            kind: WarningKind::BalanceViolation,
            magnitude,
            case_id: None,
            issue: None,
            detail: detail.into(),
        }
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    pub fn is_balance_violation(&self) -> bool {
        self.kind == WarningKind::BalanceViolation
    }
}
