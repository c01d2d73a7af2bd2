//! Batch engine: turns a batch of case records into flow classifications,
//! warehouse/site ledgers and validation warnings.
//!
//! Loading records and rendering reports stay outside; nothing in the compute
//! phase performs IO.

pub mod config;
pub mod report;
pub mod runner;

#[cfg(test)]
mod integration_tests;

pub use config::{EngineConfig, EngineError, load_location_config};
pub use report::{RunReport, RunStatus};
pub use runner::FlowEngine;
