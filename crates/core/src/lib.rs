//! `flowledger-core`: shared building blocks for case routing and ledgers.
//!
//! This crate contains **pure** primitives (no IO, no threading, no logging).

pub mod error;
pub mod id;
pub mod period;
pub mod value_object;
pub mod warning;

pub use error::{ConfigError, ConfigResult};
pub use id::{CaseId, RunId};
pub use period::Period;
pub use value_object::ValueObject;
pub use warning::{DataQualityIssue, Warning, WarningKind};
