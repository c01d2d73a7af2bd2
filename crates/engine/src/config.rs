//! Engine configuration and the configuration-loading boundary.

use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use flowledger_core::{ConfigError, ConfigResult};
use flowledger_routing::{LocationConfig, ValidatedConfig};
use flowledger_validation::{BalanceValidator, DEFAULT_TOLERANCE};

pub const ENV_BALANCE_TOLERANCE: &str = "FLOWLEDGER_BALANCE_TOLERANCE";
pub const ENV_WORKERS: &str = "FLOWLEDGER_WORKERS";
pub const ENV_DEADLINE_MS: &str = "FLOWLEDGER_DEADLINE_MS";

/// Run-level tuning knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Relative tolerance of the global flow balance check.
    pub balance_tolerance: f64,
    /// Number of worker threads for per-case work (1 = inline).
    pub workers: usize,
    /// Stop picking up new cases after this long and report a partial result.
    pub deadline: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: DEFAULT_TOLERANCE,
            workers: 1,
            deadline: None,
        }
    }
}

impl EngineConfig {
    pub fn with_balance_tolerance(mut self, tolerance: f64) -> Self {
        self.balance_tolerance = tolerance;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Defaults overridden by `FLOWLEDGER_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns. Unparsable values are
    /// logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(tolerance) = parse_var(&lookup, ENV_BALANCE_TOLERANCE) {
            config.balance_tolerance = tolerance;
        }
        if let Some(workers) = parse_var(&lookup, ENV_WORKERS) {
            config.workers = workers;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_DEADLINE_MS) {
            config.deadline = Some(Duration::from_millis(ms));
        }

        config
    }

    pub fn validate(&self) -> ConfigResult<()> {
        BalanceValidator::new(self.balance_tolerance)?;
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkerCount);
        }
        Ok(())
    }
}

fn parse_var<T: core::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable engine setting; using default");
            None
        }
    }
}

/// Failure to obtain a usable location configuration.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to read location config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed location config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Read, parse and validate a JSON location configuration file.
pub fn load_location_config(path: impl AsRef<Path>) -> Result<ValidatedConfig, EngineError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(LocationConfig::from_json_str(&json)?.validate()?)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = EngineConfig::from_lookup(lookup(&[]));
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.balance_tolerance, 0.05);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reads_overrides_and_skips_garbage() {
        let config = EngineConfig::from_lookup(lookup(&[
            (ENV_BALANCE_TOLERANCE, "0.1"),
            (ENV_WORKERS, "four"),
            (ENV_DEADLINE_MS, "250"),
        ]));
        assert_eq!(config.balance_tolerance, 0.1);
        assert_eq!(config.workers, 1);
        assert_eq!(config.deadline, Some(Duration::from_millis(250)));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let zero_workers = EngineConfig::default().with_workers(0);
        assert_eq!(zero_workers.validate(), Err(ConfigError::InvalidWorkerCount));

        let tolerance = EngineConfig::default().with_balance_tolerance(2.0);
        assert_eq!(tolerance.validate(), Err(ConfigError::InvalidTolerance(2.0)));
    }

    #[test]
    fn load_reports_missing_file_and_bad_config() {
        let missing = load_location_config("/definitely/not/here.json");
        assert!(matches!(missing, Err(EngineError::Io { .. })));

        let dir = std::env::temp_dir().join(format!("flowledger-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let bad = dir.join("overlap.json");
        std::fs::write(&bad, r#"{"warehouses":["A"],"sites":["A"],"offshore":"MOSB"}"#).unwrap();
        assert!(matches!(
            load_location_config(&bad),
            Err(EngineError::Config(ConfigError::OverlappingLocation(_)))
        ));

        let good = dir.join("good.json");
        std::fs::write(&good, r#"{"warehouses":["A"],"sites":["S"],"offshore":"MOSB"}"#).unwrap();
        let cfg = load_location_config(&good).unwrap();
        assert_eq!(cfg.offshore(), "MOSB");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
