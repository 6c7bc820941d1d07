//! Engine configuration.
//!
//! [`Config`] is the serde form read from a config file. [`Config::compile`]
//! validates it and compiles the rule tables into [`Policies`], which is what
//! the decision operations take.

use crate::error::{Error, Result};
use crate::headroom;
use crate::predicates::{AcceptConfig, AcceptPolicy, CountConfig, ExpiryPolicy, ExpiryRule};
use crate::solver::MAX_TABLE_UNITS;
use crate::units::{GB, KB, MB, serde_size};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the engine learns how much space is free on disk.
///
/// The download manager's own free-space figure can lag the device by a
/// full reporting interval, so deployments may prefer to configure the
/// usable capacity and subtract the reported used space instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum FreeSpaceSource {
    /// Free space = configured capacity − snapshot used space
    Capacity {
        /// Usable capacity of the download volume
        #[serde(with = "serde_size")]
        total: u64,
    },
    /// Free space = the snapshot's reported figure
    Reported,
}

/// Settings for the headroom monitor and reclamation solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReclaimConfig {
    /// How free space is determined
    pub free_space: FreeSpaceSource,
    /// Highest rate at which downloads can fill the disk (bytes/s)
    #[serde(with = "serde_size", default = "default_max_ingest_rate")]
    pub max_ingest_rate: u64,
    /// Seconds between authoritative state reports
    #[serde(default = "default_report_interval_secs")]
    pub report_interval_secs: u64,
    /// Extra space kept on top of the ingest estimate
    #[serde(with = "serde_size", default = "default_reserve")]
    pub reserve: u64,
    /// Accounting unit for candidate weights and targets
    #[serde(with = "serde_size", default = "default_weight_unit")]
    pub weight_unit: u64,
    /// Complete items uploading slower than this are idle (bytes/s)
    #[serde(with = "serde_size", default = "default_idle_threshold")]
    pub idle_threshold: u64,
    /// Upload speed under which items are purged when state is missing (bytes/s)
    #[serde(with = "serde_size", default = "default_emergency_threshold")]
    pub emergency_threshold: u64,
}

fn default_max_ingest_rate() -> u64 {
    150 * MB
}

fn default_report_interval_secs() -> u64 {
    60
}

fn default_reserve() -> u64 {
    GB
}

fn default_weight_unit() -> u64 {
    GB
}

fn default_idle_threshold() -> u64 {
    KB
}

fn default_emergency_threshold() -> u64 {
    2 * MB
}

impl ReclaimConfig {
    /// Config deriving free space from a fixed volume capacity
    pub fn with_capacity(total: u64) -> Self {
        Self::with_source(FreeSpaceSource::Capacity { total })
    }

    /// Config trusting the download manager's reported free space
    pub fn with_reported() -> Self {
        Self::with_source(FreeSpaceSource::Reported)
    }

    fn with_source(free_space: FreeSpaceSource) -> Self {
        Self {
            free_space,
            max_ingest_rate: default_max_ingest_rate(),
            report_interval_secs: default_report_interval_secs(),
            reserve: default_reserve(),
            weight_unit: default_weight_unit(),
            idle_threshold: default_idle_threshold(),
            emergency_threshold: default_emergency_threshold(),
        }
    }

    /// Set the maximum ingest rate
    pub fn max_ingest_rate(mut self, bytes_per_sec: u64) -> Self {
        self.max_ingest_rate = bytes_per_sec;
        self
    }

    /// Set the report interval
    pub fn report_interval(mut self, interval: Duration) -> Self {
        self.report_interval_secs = interval.as_secs();
        self
    }

    /// Set the reserve margin
    pub fn reserve(mut self, bytes: u64) -> Self {
        self.reserve = bytes;
        self
    }

    /// Set the weight unit
    pub fn weight_unit(mut self, bytes: u64) -> Self {
        self.weight_unit = bytes;
        self
    }

    /// Interval between authoritative state reports
    pub fn report_interval_duration(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs)
    }

    /// Check values the engine divides by or relies on being positive
    pub fn validate(&self) -> Result<()> {
        if self.weight_unit == 0 {
            return Err(Error::InvalidConfig(
                "disk.weight_unit must be positive".to_string(),
            ));
        }
        if self.report_interval_secs == 0 {
            return Err(Error::InvalidConfig(
                "disk.report_interval_secs must be positive".to_string(),
            ));
        }
        if let FreeSpaceSource::Capacity { total: 0 } = self.free_space {
            return Err(Error::InvalidConfig(
                "disk.free_space.total must be positive".to_string(),
            ));
        }
        let units = self.span_units();
        if units > u128::from(MAX_TABLE_UNITS) {
            return Err(Error::InvalidConfig(format!(
                "disk.weight_unit ({} bytes) is too small: the disk spans {} units, limit is {}",
                self.weight_unit, units, MAX_TABLE_UNITS
            )));
        }
        Ok(())
    }

    /// Weight units between an empty disk and the light-tier margin.
    ///
    /// Bounds the solver target for any snapshot whose used space stays
    /// within the configured capacity.
    fn span_units(&self) -> u128 {
        let capacity = match self.free_space {
            FreeSpaceSource::Capacity { total } => total,
            FreeSpaceSource::Reported => 0,
        };
        let span = 2 * u128::from(headroom::increment(self)) + u128::from(capacity);
        span.div_ceil(u128::from(self.weight_unit))
    }
}

/// Complete engine configuration as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Headroom monitor and reclamation settings
    pub disk: ReclaimConfig,
    /// Acceptance rules for newly announced releases
    #[serde(default)]
    pub accept: AcceptConfig,
    /// Per-category free-window table
    #[serde(default = "crate::predicates::expiry::default_rules")]
    pub expiry: Vec<ExpiryRule>,
    /// Item-count eviction thresholds
    #[serde(default)]
    pub count: CountConfig,
}

impl Config {
    /// Config with the given disk settings and default rule tables
    pub fn new(disk: ReclaimConfig) -> Self {
        Self {
            disk,
            accept: AcceptConfig::default(),
            expiry: crate::predicates::expiry::default_rules(),
            count: CountConfig::default(),
        }
    }

    /// Validate every section and compile the rule tables
    pub fn compile(&self) -> Result<Policies> {
        self.disk.validate()?;
        self.count.validate()?;
        Ok(Policies {
            disk: self.disk.clone(),
            accept: AcceptPolicy::compile(&self.accept)?,
            expiry: ExpiryPolicy::compile(&self.expiry)?,
            count: self.count.clone(),
        })
    }
}

/// Validated configuration with compiled matchers, immutable for a cycle.
#[derive(Debug, Clone)]
pub struct Policies {
    /// Headroom monitor and reclamation settings
    pub disk: ReclaimConfig,
    /// Compiled acceptance rules
    pub accept: AcceptPolicy,
    /// Compiled free-window table
    pub expiry: ExpiryPolicy,
    /// Item-count thresholds
    pub count: CountConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::TB;

    #[test]
    fn test_defaults_match_deployment() {
        let config = ReclaimConfig::with_capacity(140 * GB);
        assert_eq!(config.max_ingest_rate, 150 * MB);
        assert_eq!(config.report_interval_duration(), Duration::from_secs(60));
        assert_eq!(config.reserve, GB);
        assert_eq!(config.weight_unit, GB);
        assert_eq!(config.idle_threshold, KB);
        assert_eq!(config.emergency_threshold, 2 * MB);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        assert!(ReclaimConfig::with_reported().weight_unit(0).validate().is_err());
        assert!(
            ReclaimConfig::with_reported()
                .report_interval(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(ReclaimConfig::with_capacity(0).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_tiny_weight_unit() {
        let err = ReclaimConfig::with_capacity(140 * GB)
            .weight_unit(1)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("disk.weight_unit"));
        assert!(ReclaimConfig::with_reported().weight_unit(KB).validate().is_err());

        assert!(ReclaimConfig::with_capacity(140 * GB).weight_unit(10 * MB).validate().is_ok());
        assert!(ReclaimConfig::with_capacity(16 * TB).validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: Config = toml::from_str(
            r#"
[disk.free_space]
source = "capacity"
total = "140GB"
"#,
        )
        .unwrap();

        assert_eq!(
            config.disk.free_space,
            FreeSpaceSource::Capacity { total: 140 * GB }
        );
        assert_eq!(config.disk.max_ingest_rate, 150 * MB);
        assert!(!config.expiry.is_empty());
        assert!(config.compile().is_ok());
    }

    #[test]
    fn test_parse_reported_source_and_overrides() {
        let config: Config = toml::from_str(
            r#"
[disk]
max_ingest_rate = "100MB"
report_interval_secs = 30
reserve = 0

[disk.free_space]
source = "reported"

[count]
soft_limit = 5
hard_limit = 8
"#,
        )
        .unwrap();

        assert_eq!(config.disk.free_space, FreeSpaceSource::Reported);
        assert_eq!(config.disk.max_ingest_rate, 100 * MB);
        assert_eq!(config.disk.report_interval_secs, 30);
        assert_eq!(config.disk.reserve, 0);
        assert_eq!(config.count.soft_limit, 5);
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let parsed: std::result::Result<Config, _> = toml::from_str("[disk]\nreserve = 0\n");
        assert!(parsed.is_err());
    }
}
