//! Cross-ledger balance checks.
//!
//! Findings are returned as [`Warning`](flowledger_core::Warning)s; nothing in
//! this crate aborts a run.

pub mod balance;

pub use balance::{BalanceValidator, DEFAULT_TOLERANCE, GLOBAL_LOCATION};
