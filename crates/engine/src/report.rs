//! Run output handed to downstream report generators.

use serde::{Deserialize, Serialize};

use flowledger_core::{CaseId, RunId, Warning, WarningKind};
use flowledger_ledger::{SiteLedger, WarehouseLedger};
use flowledger_routing::{FlowClassification, FlowSummary};

/// Whether every case was processed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Complete,
    /// The deadline passed; ledgers cover only the processed cases.
    PartialResult { processed: usize, total: usize },
}

/// Everything one engine run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub status: RunStatus,
    /// Sorted by `case_id`.
    pub classifications: Vec<FlowClassification>,
    pub summary: FlowSummary,
    pub warehouse_ledger: WarehouseLedger,
    pub site_ledger: SiteLedger,
    pub warnings: Vec<Warning>,
}

impl RunReport {
    pub fn is_partial(&self) -> bool {
        matches!(self.status, RunStatus::PartialResult { .. })
    }

    pub fn classification(&self, case_id: &CaseId) -> Option<&FlowClassification> {
        self.classifications
            .binary_search_by(|c| c.case_id.cmp(case_id))
            .ok()
            .map(|i| &self.classifications[i])
    }

    pub fn balance_violations(&self) -> impl Iterator<Item = &Warning> {
        self.warnings
            .iter()
            .filter(|w| w.kind == WarningKind::BalanceViolation)
    }

    pub fn data_quality_warnings(&self) -> impl Iterator<Item = &Warning> {
        self.warnings
            .iter()
            .filter(|w| w.kind == WarningKind::DataQualityWarning)
    }
}
