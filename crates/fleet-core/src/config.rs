//! Configuration loading and typed config structures for the fleet simulation.
//!
//! The canonical configuration lives in `fleet-config.yaml` at the project
//! root. Every section and field has a default, so a partial (or empty)
//! file is valid and a missing file simply means "all defaults".

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but makes no sense for a simulation run.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level fleet configuration.
///
/// Mirrors the structure of `fleet-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FleetConfig {
    /// Run-level settings (name, seed, number of ticks).
    #[serde(default)]
    pub world: WorldConfig,

    /// Initial fleet layout.
    #[serde(default)]
    pub fleet: FleetLayoutConfig,

    /// Supervision thresholds.
    #[serde(default)]
    pub supervision: SupervisionConfig,

    /// Redistribution strategy selection.
    #[serde(default)]
    pub redistribution: RedistributionConfig,

    /// Simulated customer activity between ticks.
    #[serde(default)]
    pub activity: ActivityConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FleetConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let percentages = [
            ("fleet.accessory_chance_percent", self.fleet.accessory_chance_percent),
            ("supervision.theft_chance_percent", self.supervision.theft_chance_percent),
            ("activity.return_chance_percent", self.activity.return_chance_percent),
        ];
        for (name, value) in percentages {
            if value > 100 {
                return Err(ConfigError::Invalid {
                    reason: format!("{name} must be between 0 and 100, got {value}"),
                });
            }
        }
        if self.supervision.streak_threshold == 0 {
            return Err(ConfigError::Invalid {
                reason: "supervision.streak_threshold must be at least 1".to_owned(),
            });
        }
        if self.supervision.maintenance_threshold == 0 {
            return Err(ConfigError::Invalid {
                reason: "supervision.maintenance_threshold must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

/// Run-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of ticks to run.
    #[serde(default = "default_ticks")]
    pub ticks: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            ticks: default_ticks(),
        }
    }
}

/// Initial fleet layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FleetLayoutConfig {
    /// Number of stations to create.
    #[serde(default = "default_station_count")]
    pub station_count: usize,

    /// Capacity of each station (clamped to 10..=20 by the station).
    #[serde(default = "default_station_capacity")]
    pub station_capacity: usize,

    /// Vehicles spawned into each station at start.
    #[serde(default = "default_vehicles_per_station")]
    pub vehicles_per_station: usize,

    /// Chance (0-100) that a spawned vehicle gets each accessory.
    #[serde(default = "default_accessory_chance_percent")]
    pub accessory_chance_percent: u32,
}

impl Default for FleetLayoutConfig {
    fn default() -> Self {
        Self {
            station_count: default_station_count(),
            station_capacity: default_station_capacity(),
            vehicles_per_station: default_vehicles_per_station(),
            accessory_chance_percent: default_accessory_chance_percent(),
        }
    }
}

/// Supervision thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SupervisionConfig {
    /// Rentals before a vehicle must go through maintenance.
    #[serde(default = "default_maintenance_threshold")]
    pub maintenance_threshold: u32,

    /// Idle ticks a lone vehicle must accumulate before it can be stolen.
    #[serde(default = "default_theft_threshold")]
    pub theft_threshold: u32,

    /// Chance (0-100) that an exposed lone vehicle is stolen on a tick.
    #[serde(default = "default_theft_chance_percent")]
    pub theft_chance_percent: u32,

    /// Consecutive empty or full ticks that trigger redistribution.
    #[serde(default = "default_streak_threshold")]
    pub streak_threshold: u32,
}

impl Default for SupervisionConfig {
    fn default() -> Self {
        Self {
            maintenance_threshold: default_maintenance_threshold(),
            theft_threshold: default_theft_threshold(),
            theft_chance_percent: default_theft_chance_percent(),
            streak_threshold: default_streak_threshold(),
        }
    }
}

/// Available redistribution algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Move one vehicle at a time from the fullest to the emptiest station.
    #[default]
    RoundRobin,
}

/// Redistribution configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RedistributionConfig {
    /// Which algorithm to use.
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Upper bound on vehicle moves per redistribution run.
    #[serde(default = "default_max_moves")]
    pub max_moves: u32,
}

impl Default for RedistributionConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            max_moves: default_max_moves(),
        }
    }
}

/// Simulated customer activity between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ActivityConfig {
    /// Rental attempts per tick.
    #[serde(default = "default_rentals_per_tick")]
    pub rentals_per_tick: u32,

    /// Chance (0-100) that each rented vehicle is returned on a tick.
    #[serde(default = "default_return_chance_percent")]
    pub return_chance_percent: u32,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            rentals_per_tick: default_rentals_per_tick(),
            return_chance_percent: default_return_chance_percent(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins if set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Fleet".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_ticks() -> u64 {
    20
}

const fn default_station_count() -> usize {
    5
}

const fn default_station_capacity() -> usize {
    10
}

const fn default_vehicles_per_station() -> usize {
    5
}

const fn default_accessory_chance_percent() -> u32 {
    30
}

const fn default_maintenance_threshold() -> u32 {
    10
}

const fn default_theft_threshold() -> u32 {
    2
}

const fn default_theft_chance_percent() -> u32 {
    50
}

const fn default_streak_threshold() -> u32 {
    2
}

const fn default_max_moves() -> u32 {
    20
}

const fn default_rentals_per_tick() -> u32 {
    3
}

const fn default_return_chance_percent() -> u32 {
    60
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = FleetConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.supervision.maintenance_threshold, 10);
        assert_eq!(config.supervision.theft_threshold, 2);
        assert_eq!(config.supervision.theft_chance_percent, 50);
        assert_eq!(config.supervision.streak_threshold, 2);
        assert_eq!(config.redistribution.max_moves, 20);
        assert_eq!(config.redistribution.strategy, StrategyKind::RoundRobin);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  name: "Test Fleet"
  seed: 123
  ticks: 50

fleet:
  station_count: 3
  station_capacity: 15
  vehicles_per_station: 7
  accessory_chance_percent: 10

supervision:
  maintenance_threshold: 4
  theft_threshold: 3
  theft_chance_percent: 100
  streak_threshold: 1

redistribution:
  strategy: round_robin
  max_moves: 5

activity:
  rentals_per_tick: 2
  return_chance_percent: 90

logging:
  level: "debug"
  format: json
"#;

        let config = FleetConfig::parse(yaml).unwrap();
        assert_eq!(config.world.name, "Test Fleet");
        assert_eq!(config.world.ticks, 50);
        assert_eq!(config.fleet.station_capacity, 15);
        assert_eq!(config.supervision.theft_chance_percent, 100);
        assert_eq!(config.supervision.streak_threshold, 1);
        assert_eq!(config.redistribution.max_moves, 5);
        assert_eq!(config.activity.return_chance_percent, 90);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = FleetConfig::parse("world:\n  seed: 7\n").unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.fleet, FleetLayoutConfig::default());
        assert_eq!(config.supervision, SupervisionConfig::default());
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(FleetConfig::parse("").is_ok());
    }

    #[test]
    fn out_of_range_percentage_is_rejected() {
        let err = FleetConfig::parse("supervision:\n  theft_chance_percent: 150\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("theft_chance_percent"));
    }

    #[test]
    fn zero_streak_threshold_is_rejected() {
        let err = FleetConfig::parse("supervision:\n  streak_threshold: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn unknown_strategy_is_a_yaml_error() {
        let err = FleetConfig::parse("redistribution:\n  strategy: teleport\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("fleet-config.yaml");
        if path.exists() {
            let config = FleetConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
