//! Configuration error model.

use thiserror::Error;

/// Result type used while validating static configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Fatal configuration error.
///
/// These are the only errors that abort a run, and they are raised before any
/// case is processed. Per-case problems are reported as
/// [`Warning`](crate::Warning)s instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// A required location set (warehouses or sites) has no entries.
    #[error("location set is empty: {0}")]
    EmptyLocationSet(&'static str),

    /// A location name is blank after trimming.
    #[error("blank location name in {0}")]
    BlankLocationName(&'static str),

    /// The same name appears twice within one location set.
    #[error("duplicate location name in {set}: {name}")]
    DuplicateLocation { set: &'static str, name: String },

    /// A name is configured as both a warehouse and a site.
    #[error("location configured as both warehouse and site: {0}")]
    OverlappingLocation(String),

    /// The offshore name is blank or collides with a warehouse/site.
    #[error("invalid offshore location: {0}")]
    InvalidOffshore(String),

    /// The tie-break priority names a location that is not configured.
    #[error("tie-break priority references unknown location: {0}")]
    UnknownPriorityLocation(String),

    /// The tie-break priority lists a location more than once.
    #[error("tie-break priority lists location twice: {0}")]
    DuplicatePriorityLocation(String),

    /// The plausibility window is inverted.
    #[error("plausible date window is empty ({from} > {until})")]
    InvalidPlausibleWindow { from: String, until: String },

    /// Balance tolerance outside `[0, 1]` or not finite.
    #[error("balance tolerance must be a finite ratio in [0, 1], got {0}")]
    InvalidTolerance(f64),

    /// Worker count of zero.
    #[error("worker count must be at least 1")]
    InvalidWorkerCount,
}

impl ConfigError {
    pub fn duplicate(set: &'static str, name: impl Into<String>) -> Self {
        Self::DuplicateLocation {
            set,
            name: name.into(),
        }
    }
}
