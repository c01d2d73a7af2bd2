//! Ledger balance validation.
//!
//! Checks, in order:
//! - warehouse rows: exact inventory identity and non-negative inventory
//! - site rows: exact cumulative identity and non-decreasing inventory
//! - global, per period: warehouse outbound plus direct deliveries should
//!   approximate total site arrivals within `tolerance`

use std::collections::BTreeSet;

use tracing::warn;

use flowledger_core::{ConfigError, ConfigResult, Period, Warning};
use flowledger_ledger::{LedgerEntry, SiteLedger, WarehouseLedger};

/// Default relative tolerance of the global flow check.
pub const DEFAULT_TOLERANCE: f64 = 0.05;

/// Location name used for warnings that are not tied to one location.
pub const GLOBAL_LOCATION: &str = "*";

/// Cross-ledger invariant checker.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BalanceValidator {
    tolerance: f64,
}

impl Default for BalanceValidator {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl BalanceValidator {
    /// `tolerance` is a ratio in `[0, 1]`.
    pub fn new(tolerance: f64) -> ConfigResult<Self> {
        if !(tolerance.is_finite() && (0.0..=1.0).contains(&tolerance)) {
            return Err(ConfigError::InvalidTolerance(tolerance));
        }
        Ok(Self { tolerance })
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Run every check and collect the violations.
    pub fn validate(&self, warehouses: &WarehouseLedger, sites: &SiteLedger) -> Vec<Warning> {
        let mut warnings = Vec::new();
        check_warehouse_rows(warehouses.entries(), &mut warnings);
        check_site_rows(sites.entries(), &mut warnings);
        self.check_global_flow(warehouses, sites, &mut warnings);
        warnings
    }

    fn check_global_flow(&self, warehouses: &WarehouseLedger, sites: &SiteLedger, out: &mut Vec<Warning>) {
        let periods: BTreeSet<Period> = warehouses
            .entries()
            .iter()
            .chain(sites.entries())
            .map(|e| e.period)
            .collect();

        for period in periods {
            let expected = warehouses.total_outbound(period) + sites.direct_deliveries(period);
            let actual = sites.total_inbound(period);
            if expected == actual {
                continue;
            }

            let deviation = expected.abs_diff(actual) as f64 / actual.max(1) as f64;
            if deviation > self.tolerance {
                let detail = format!(
                    "warehouse outbound + direct deliveries = {expected}, site inbound = {actual} (deviation {:.1}%, tolerance {:.1}%)",
                    deviation * 100.0,
                    self.tolerance * 100.0
                );
                out.push(violation(GLOBAL_LOCATION, period, deviation, detail));
            }
        }
    }
}

fn check_warehouse_rows(rows: &[LedgerEntry], out: &mut Vec<Warning>) {
    let mut prev: Option<(&str, i64)> = None;

    for row in rows {
        let opening = opening_balance(prev, row);
        let drift = row.inventory_balance - (opening + row.net_change());
        if drift != 0 {
            out.push(violation(
                &row.location_name,
                row.period,
                drift.unsigned_abs() as f64,
                format!("inventory identity drifted by {drift}"),
            ));
        }
        if row.inventory_balance < 0 {
            out.push(violation(
                &row.location_name,
                row.period,
                row.inventory_balance.unsigned_abs() as f64,
                format!(
                    "cumulative outbound exceeds inbound; inventory {}",
                    row.inventory_balance
                ),
            ));
        }
        prev = Some((row.location_name.as_str(), row.inventory_balance));
    }
}

fn check_site_rows(rows: &[LedgerEntry], out: &mut Vec<Warning>) {
    let mut prev: Option<(&str, i64)> = None;

    for row in rows {
        let opening = opening_balance(prev, row);
        let drift = row.inventory_balance - (opening + row.net_change());
        if drift != 0 {
            out.push(violation(
                &row.location_name,
                row.period,
                drift.unsigned_abs() as f64,
                format!("cumulative arrivals drifted by {drift}"),
            ));
        }
        if row.inventory_balance < opening {
            out.push(violation(
                &row.location_name,
                row.period,
                (opening - row.inventory_balance) as f64,
                format!(
                    "site inventory decreased from {opening} to {}",
                    row.inventory_balance
                ),
            ));
        }
        prev = Some((row.location_name.as_str(), row.inventory_balance));
    }
}

/// Previous row's balance for the same location, zero at a location's first row.
fn opening_balance(prev: Option<(&str, i64)>, row: &LedgerEntry) -> i64 {
    match prev {
        Some((location, balance)) if location == row.location_name => balance,
        _ => 0,
    }
}

fn violation(location: &str, period: Period, magnitude: f64, detail: String) -> Warning {
    warn!(location, period = %period, magnitude, "balance violation: {detail}");
    Warning::balance(location, period, magnitude, detail)
}
