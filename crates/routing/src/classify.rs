//! Flow classification of a case's delivery route.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use flowledger_core::CaseId;

use crate::config::LocationKind;
use crate::extract::LocationEvent;

/// Ordinal routing complexity of a case.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum FlowCode {
    /// No recorded arrival yet.
    PreArrival = 0,
    /// Straight to a site.
    DirectToSite = 1,
    /// Through exactly one warehouse.
    SingleWarehouse = 2,
    /// Through the offshore point, with at most one warehouse.
    WarehouseOffshore = 3,
    /// Through two or more warehouses.
    MultiWarehouse = 4,
}

impl FlowCode {
    pub const ALL: [FlowCode; 5] = [
        FlowCode::PreArrival,
        FlowCode::DirectToSite,
        FlowCode::SingleWarehouse,
        FlowCode::WarehouseOffshore,
        FlowCode::MultiWarehouse,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            FlowCode::PreArrival => "Pre-Arrival",
            FlowCode::DirectToSite => "Direct-to-Site",
            FlowCode::SingleWarehouse => "Single-Warehouse Routed",
            FlowCode::WarehouseOffshore => "Warehouse + Offshore Routed",
            FlowCode::MultiWarehouse => "Multi-Warehouse Routed",
        }
    }
}

impl From<FlowCode> for u8 {
    fn from(value: FlowCode) -> Self {
        value.as_u8()
    }
}

impl TryFrom<u8> for FlowCode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        FlowCode::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| format!("flow code out of range: {value}"))
    }
}

impl core::fmt::Display for FlowCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({})", self.as_u8(), self.label())
    }
}

/// Classification result for one case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowClassification {
    pub case_id: CaseId,
    pub flow_code: FlowCode,
    /// Distinct warehouses before the first site arrival (or so far).
    pub warehouse_hop_count: u32,
    pub passed_offshore: bool,
    pub reached_site: bool,
}

/// Maps an ordered event sequence to a [`FlowClassification`].
///
/// Only the outbound route counts: everything up to (not including) the first
/// site arrival, or the whole sequence while no site has been reached. Later
/// movements never change the result.
#[derive(Debug, Copy, Clone, Default)]
pub struct FlowClassifier;

impl FlowClassifier {
    pub fn new() -> Self {
        Self
    }

    /// `events` must already be in extraction order.
    pub fn classify(&self, case_id: &CaseId, events: &[LocationEvent]) -> FlowClassification {
        let first_site = events
            .iter()
            .position(|e| e.location_kind == LocationKind::Site);
        let route = &events[..first_site.unwrap_or(events.len())];

        let warehouses: BTreeSet<&str> = route
            .iter()
            .filter(|e| e.location_kind == LocationKind::Warehouse)
            .map(|e| e.location_name.as_str())
            .collect();
        let passed_offshore = route
            .iter()
            .any(|e| e.location_kind == LocationKind::Offshore);
        let hops = warehouses.len();

        let flow_code = if events.is_empty() {
            FlowCode::PreArrival
        } else if hops >= 2 {
            FlowCode::MultiWarehouse
        } else if passed_offshore {
            FlowCode::WarehouseOffshore
        } else if hops == 1 {
            FlowCode::SingleWarehouse
        } else {
            FlowCode::DirectToSite
        };

        FlowClassification {
            case_id: case_id.clone(),
            flow_code,
            warehouse_hop_count: u32::try_from(hops).unwrap_or(u32::MAX),
            passed_offshore,
            reached_site: first_site.is_some(),
        }
    }
}

/// Per-flow-code case and package totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowSummary {
    pub cases: [u64; 5],
    pub packages: [u64; 5],
}

impl FlowSummary {
    pub fn record(&mut self, classification: &FlowClassification, package_count: u32) {
        let slot = usize::from(classification.flow_code.as_u8());
        self.cases[slot] += 1;
        self.packages[slot] += u64::from(package_count);
    }

    pub fn merge(&mut self, other: &FlowSummary) {
        for slot in 0..FlowCode::ALL.len() {
            self.cases[slot] += other.cases[slot];
            self.packages[slot] += other.packages[slot];
        }
    }

    pub fn cases_with(&self, code: FlowCode) -> u64 {
        self.cases[usize::from(code.as_u8())]
    }

    pub fn packages_with(&self, code: FlowCode) -> u64 {
        self.packages[usize::from(code.as_u8())]
    }

    pub fn total_cases(&self) -> u64 {
        self.cases.iter().sum()
    }
}
