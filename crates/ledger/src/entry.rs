use serde::{Deserialize, Serialize};

use flowledger_core::Period;
use flowledger_routing::LocationKind;

/// Direct vs. warehouse-routed split of site arrivals.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrivalSplit {
    /// Arrivals of direct-to-site cases.
    pub direct: u64,
    /// Arrivals of cases routed through a warehouse or the offshore point.
    pub routed: u64,
}

/// One ledger row: a location in a month.
///
/// `inventory_balance(p) = inventory_balance(p - 1) + inbound(p) - outbound(p)`,
/// starting from zero before the first period of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub location_name: String,
    pub location_kind: LocationKind,
    pub period: Period,
    pub inbound_count: u64,
    /// `None` for sites (terminal, no outbound leg).
    pub outbound_count: Option<u64>,
    pub inventory_balance: i64,
    /// Only set on site rows.
    pub arrival_split: Option<ArrivalSplit>,
}

impl LedgerEntry {
    /// Net movement of the month.
    pub fn net_change(&self) -> i64 {
        to_i64(self.inbound_count) - to_i64(self.outbound_count.unwrap_or(0))
    }
}

pub(crate) fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
