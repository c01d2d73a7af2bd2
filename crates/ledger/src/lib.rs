//! Monthly inbound/outbound/inventory ledgers for warehouses and sites.
//!
//! Ledgers are built in two steps: per-case events are folded into a builder
//! (one builder per worker if the caller shards), builders are merged
//! sequentially, and `finish` lays the totals out densely over a period span.

pub mod entry;
pub mod site;
pub mod span;
pub mod warehouse;

pub use entry::{ArrivalSplit, LedgerEntry};
pub use site::{SiteLedger, SiteLedgerBuilder};
pub use span::PeriodSpan;
pub use warehouse::{WarehouseLedger, WarehouseLedgerBuilder};
