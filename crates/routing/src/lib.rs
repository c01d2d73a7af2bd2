//! Case routing: location configuration, event extraction, flow classification.
//!
//! Pure per-case logic only: no shared mutable state, no IO. Every function
//! here is safe to run for different cases on different threads.

pub mod classify;
pub mod config;
pub mod extract;
pub mod record;

pub use classify::{FlowClassification, FlowClassifier, FlowCode, FlowSummary};
pub use config::{LocationConfig, LocationKind, ValidatedConfig};
pub use extract::{EventExtractor, Extraction, LocationEvent};
pub use record::{CaseRecord, RawDate, Vendor};
