//! Configuration loading and typed config structures for the BioSim simulation.
//!
//! The canonical configuration lives in `biosim-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure and a loader that reads the file. Every section is optional
//! and falls back to the defaults of the reference model.

use std::collections::BTreeMap;
use std::path::Path;

use biosim_types::PopulationRecord;
use biosim_world::DEFAULT_MAP;
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
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `biosim-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Seed and run length.
    #[serde(default)]
    pub simulation: RunConfig,

    /// The island map.
    #[serde(default)]
    pub island: IslandConfig,

    /// Initial population, placed before the first year.
    #[serde(default)]
    pub population: Vec<PopulationRecord>,

    /// Species parameter overrides, keyed by species name.
    #[serde(default)]
    pub species: BTreeMap<String, BTreeMap<String, f64>>,

    /// Terrain parameter overrides, keyed by terrain code.
    #[serde(default)]
    pub landscape: BTreeMap<char, BTreeMap<String, f64>>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Seed and run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Seed of the simulation's random-number generator.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of years the engine simulates.
    #[serde(default = "default_years")]
    pub years: u32,

    /// Years between progress reports from the engine. 0 disables them.
    #[serde(default = "default_report_every")]
    pub report_every: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            years: default_years(),
            report_every: default_report_every(),
        }
    }
}

/// Island geography.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IslandConfig {
    /// Multi-line map of terrain codes (`W`, `L`, `H`, `D`).
    #[serde(default = "default_map")]
    pub map: String,
}

impl Default for IslandConfig {
    fn default() -> Self {
        Self { map: default_map() }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes
    /// precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `text` for human-readable lines, `json` for one JSON
    /// object per event.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

const fn default_seed() -> u64 {
    123
}

const fn default_years() -> u32 {
    100
}

const fn default_report_every() -> u32 {
    1
}

fn default_map() -> String {
    DEFAULT_MAP.to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_log_format() -> String {
    "text".to_owned()
}

#[cfg(test)]
mod tests {
    use biosim_types::Coord;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.simulation.seed, 123);
        assert_eq!(config.simulation.years, 100);
        assert_eq!(config.island.map, DEFAULT_MAP);
        assert!(config.population.is_empty());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
simulation:
  seed: 42
  years: 10
  report_every: 5

island:
  map: |
    WWWW
    WLHW
    WWWW

population:
  - loc: { row: 2, col: 2 }
    pop:
      - { species: Herbivore, age: 5, weight: 20.0 }
      - { species: Herbivore, age: 5, weight: 20.0 }
  - loc: { row: 2, col: 3 }
    pop:
      - { species: Carnivore, age: 5, weight: 20.0 }

species:
  Herbivore:
    mu: 0.3
  Carnivore:
    F: 40.0
    DeltaPhiMax: 9.0

landscape:
  L:
    f_max: 700.0

logging:
  level: debug
  format: json
";
        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.simulation.years, 10);
        assert_eq!(config.simulation.report_every, 5);
        assert_eq!(config.island.map.lines().count(), 3);
        assert_eq!(config.population.len(), 2);
        assert_eq!(
            config.population.first().map(|r| r.loc),
            Some(Coord::new(2, 2))
        );
        assert_eq!(config.population.first().map(|r| r.pop.len()), Some(2));
        let appetite = config.species.get("Carnivore").and_then(|p| p.get("F"));
        assert!(appetite.is_some_and(|v| (v - 40.0).abs() < 1e-9));
        let f_max = config.landscape.get(&'L').and_then(|p| p.get("f_max"));
        assert!(f_max.is_some_and(|v| (v - 700.0).abs() < 1e-9));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "simulation:\n  seed: 7\n";
        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        // Seed is overridden
        assert_eq!(config.simulation.seed, 7);
        // Everything else uses defaults
        assert_eq!(config.simulation.years, 100);
        assert_eq!(config.simulation.report_every, 1);
        assert_eq!(config.island.map, DEFAULT_MAP);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = SimulationConfig::parse("");
        assert_eq!(config.ok(), Some(SimulationConfig::default()));
    }

    #[test]
    fn parse_invalid_yaml() {
        let config = SimulationConfig::parse("simulation: [unclosed");
        assert!(matches!(config, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("biosim-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
