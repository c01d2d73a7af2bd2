//! Warehouse ledger: monthly inbound, outbound and running inventory.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use flowledger_core::Period;
use flowledger_routing::{LocationEvent, LocationKind, ValidatedConfig};

use crate::entry::{LedgerEntry, to_i64};
use crate::span::PeriodSpan;

type Key = (String, Period);

/// Partial accumulator for warehouse movements.
///
/// - inbound: one per warehouse event, in the month of the event
/// - outbound: one per warehouse visit, in the month of the case's next event
///   of any kind (same-day moves included); a visit with no next event is
///   still in stock
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarehouseLedgerBuilder {
    inbound: BTreeMap<Key, u64>,
    outbound: BTreeMap<Key, u64>,
    span: PeriodSpan,
}

impl WarehouseLedgerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one case's ordered events into the accumulator.
    pub fn record_case(&mut self, events: &[LocationEvent]) {
        let mut visited: HashSet<&str> = HashSet::new();

        for (i, event) in events.iter().enumerate() {
            self.span.include(event.period());

            if event.location_kind != LocationKind::Warehouse {
                continue;
            }
            if !visited.insert(event.location_name.as_str()) {
                debug!(
                    case_id = %event.case_id,
                    location = %event.location_name,
                    "repeated warehouse visit ignored"
                );
                continue;
            }

            *self
                .inbound
                .entry((event.location_name.clone(), event.period()))
                .or_default() += 1;

            if let Some(next) = events.get(i + 1) {
                *self
                    .outbound
                    .entry((event.location_name.clone(), next.period()))
                    .or_default() += 1;
            }
        }
    }

    /// Merge another partial accumulator into this one.
    pub fn merge(&mut self, other: WarehouseLedgerBuilder) {
        for (key, n) in other.inbound {
            *self.inbound.entry(key).or_default() += n;
        }
        for (key, n) in other.outbound {
            *self.outbound.entry(key).or_default() += n;
        }
        self.span = self.span.union(other.span);
    }

    /// Periods touched by the recorded events.
    pub fn span(&self) -> PeriodSpan {
        self.span
    }

    /// Lay the totals out for every configured warehouse over `span`.
    pub fn finish(self, config: &ValidatedConfig, span: PeriodSpan) -> WarehouseLedger {
        let mut entries = Vec::new();

        for warehouse in config.warehouses() {
            let mut inventory: i64 = 0;
            for period in span.periods() {
                let key = (warehouse.clone(), period);
                let inbound = self.inbound.get(&key).copied().unwrap_or(0);
                let outbound = self.outbound.get(&key).copied().unwrap_or(0);
                inventory += to_i64(inbound) - to_i64(outbound);

                entries.push(LedgerEntry {
                    location_name: warehouse.clone(),
                    location_kind: LocationKind::Warehouse,
                    period,
                    inbound_count: inbound,
                    outbound_count: Some(outbound),
                    inventory_balance: inventory,
                    arrival_split: None,
                });
            }
        }

        WarehouseLedger { entries }
    }
}

/// Finished warehouse ledger, ordered by configured warehouse then period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseLedger {
    entries: Vec<LedgerEntry>,
}

impl WarehouseLedger {
    /// Wrap rows produced elsewhere (e.g. reloaded for re-validation).
    pub fn from_entries(entries: Vec<LedgerEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LedgerEntry> {
        self.entries
    }

    pub fn get(&self, location: &str, period: Period) -> Option<&LedgerEntry> {
        self.entries
            .iter()
            .find(|e| e.location_name == location && e.period == period)
    }

    pub fn rows<'a>(&'a self, location: &'a str) -> impl Iterator<Item = &'a LedgerEntry> + 'a {
        self.entries.iter().filter(move |e| e.location_name == location)
    }

    /// Sum of outbound over all warehouses in `period`.
    pub fn total_outbound(&self, period: Period) -> u64 {
        self.entries
            .iter()
            .filter(|e| e.period == period)
            .filter_map(|e| e.outbound_count)
            .sum()
    }
}
