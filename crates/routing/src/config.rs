//! Static location configuration.
//!
//! A [`LocationConfig`] is plain data (deserializable from JSON). It must be
//! turned into a [`ValidatedConfig`] before any case is processed; only a
//! validated config can build an extractor, so an ambiguous location setup
//! can never reach classification.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use flowledger_core::{ConfigError, ConfigResult};

/// Role a location plays in a case's route.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationKind {
    Warehouse,
    Site,
    Offshore,
}

/// Raw location configuration as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Warehouse names, in reporting order.
    pub warehouses: Vec<String>,
    /// Final site names, in reporting order.
    pub sites: Vec<String>,
    /// The designated offshore marshalling point.
    pub offshore: String,
    /// Same-day tie-break order. Empty means warehouses, offshore, sites.
    #[serde(default)]
    pub tie_break_priority: Vec<String>,
    /// Dates before this day are implausible.
    #[serde(default)]
    pub plausible_from: Option<NaiveDate>,
    /// Dates after this day are implausible.
    #[serde(default)]
    pub plausible_until: Option<NaiveDate>,
}

impl LocationConfig {
    pub fn new<W, S>(warehouses: W, sites: S, offshore: impl Into<String>) -> Self
    where
        W: IntoIterator,
        W::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            warehouses: warehouses.into_iter().map(Into::into).collect(),
            sites: sites.into_iter().map(Into::into).collect(),
            offshore: offshore.into(),
            tie_break_priority: Vec::new(),
            plausible_from: None,
            plausible_until: None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_tie_break_priority<P>(mut self, priority: P) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
    {
        self.tie_break_priority = priority.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_plausible_window(mut self, from: Option<NaiveDate>, until: Option<NaiveDate>) -> Self {
        self.plausible_from = from;
        self.plausible_until = until;
        self
    }

    /// Check the configuration and precompute lookup tables.
    ///
    /// Fails on empty sets, blank or duplicated names, warehouse/site overlap,
    /// an offshore name that collides with either set, and tie-break entries
    /// that are unknown or repeated.
    pub fn validate(&self) -> ConfigResult<ValidatedConfig> {
        check_set("warehouses", &self.warehouses)?;
        check_set("sites", &self.sites)?;

        let warehouse_names: HashSet<&str> = self.warehouses.iter().map(String::as_str).collect();
        if let Some(name) = self.sites.iter().find(|s| warehouse_names.contains(s.as_str())) {
            return Err(ConfigError::OverlappingLocation(name.clone()));
        }

        if self.offshore.trim().is_empty() {
            return Err(ConfigError::InvalidOffshore("name is blank".to_string()));
        }
        if warehouse_names.contains(self.offshore.as_str()) || self.sites.contains(&self.offshore) {
            return Err(ConfigError::InvalidOffshore(format!(
                "{} is also configured as a warehouse or site",
                self.offshore
            )));
        }

        if let (Some(from), Some(until)) = (self.plausible_from, self.plausible_until) {
            if from > until {
                return Err(ConfigError::InvalidPlausibleWindow {
                    from: from.to_string(),
                    until: until.to_string(),
                });
            }
        }

        // Default order: warehouses, then offshore, then sites.
        let default_order: Vec<(&str, LocationKind)> = self
            .warehouses
            .iter()
            .map(|w| (w.as_str(), LocationKind::Warehouse))
            .chain(core::iter::once((self.offshore.as_str(), LocationKind::Offshore)))
            .chain(self.sites.iter().map(|s| (s.as_str(), LocationKind::Site)))
            .collect();

        let mut listed: HashMap<&str, usize> = HashMap::new();
        for (rank, name) in self.tie_break_priority.iter().enumerate() {
            if !default_order.iter().any(|(n, _)| *n == name.as_str()) {
                return Err(ConfigError::UnknownPriorityLocation(name.clone()));
            }
            if listed.insert(name.as_str(), rank).is_some() {
                return Err(ConfigError::DuplicatePriorityLocation(name.clone()));
            }
        }

        let index = default_order
            .iter()
            .enumerate()
            .map(|(default_rank, (name, kind))| {
                let priority = listed
                    .get(name)
                    .copied()
                    .unwrap_or(self.tie_break_priority.len() + default_rank);
                (name.to_string(), LocationInfo { kind: *kind, priority })
            })
            .collect();

        Ok(ValidatedConfig {
            warehouses: self.warehouses.clone(),
            sites: self.sites.clone(),
            offshore: self.offshore.clone(),
            index,
            plausible_from: self.plausible_from,
            plausible_until: self.plausible_until,
        })
    }
}

fn check_set(set: &'static str, names: &[String]) -> ConfigResult<()> {
    if names.is_empty() {
        return Err(ConfigError::EmptyLocationSet(set));
    }
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(ConfigError::BlankLocationName(set));
        }
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::duplicate(set, name.clone()));
        }
    }
    Ok(())
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct LocationInfo {
    kind: LocationKind,
    priority: usize,
}

/// Configuration that passed [`LocationConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    warehouses: Vec<String>,
    sites: Vec<String>,
    offshore: String,
    index: HashMap<String, LocationInfo>,
    plausible_from: Option<NaiveDate>,
    plausible_until: Option<NaiveDate>,
}

impl ValidatedConfig {
    pub fn warehouses(&self) -> &[String] {
        &self.warehouses
    }

    pub fn sites(&self) -> &[String] {
        &self.sites
    }

    pub fn offshore(&self) -> &str {
        &self.offshore
    }

    pub fn kind_of(&self, name: &str) -> Option<LocationKind> {
        self.index.get(name).map(|info| info.kind)
    }

    /// Tie-break rank (lower sorts first on the same day). Unique per location.
    pub fn priority_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).map(|info| info.priority)
    }

    pub fn is_plausible(&self, date: NaiveDate) -> bool {
        self.plausible_from.is_none_or(|from| date >= from)
            && self.plausible_until.is_none_or(|until| date <= until)
    }
}
