//! Configuration loading and typed config structures for Waggle.
//!
//! The canonical configuration lives in `waggle-config.yaml` at the project
//! root. Every field has a default, so an empty file (or no file at all)
//! yields a working configuration.

use std::path::Path;

use serde::Deserialize;
use waggle_world::{DEFAULT_GRID_SIZE, MAX_GRID_SIZE};

/// Upper bound on `survey.agents`.
pub const MAX_AGENTS: u32 = 64;

/// Environment variable overriding `survey.seed`.
pub const ENV_SEED: &str = "WAGGLE_SEED";

/// Environment variable overriding `logging.level`.
pub const ENV_LOG_LEVEL: &str = "WAGGLE_LOG_LEVEL";

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

    /// The YAML parsed but a value is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `waggle-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WaggleConfig {
    /// Grid dimensions shared by every agent.
    #[serde(default)]
    pub grid: GridConfig,

    /// Survey harness parameters.
    #[serde(default)]
    pub survey: SurveyConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WaggleConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `WAGGLE_SEED` overrides `survey.seed`
    /// - `WAGGLE_LOG_LEVEL` overrides `logging.level`
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
        // An empty document deserializes to unit, not to an empty map.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override fields from the process environment when set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override fields from an arbitrary key lookup.
    ///
    /// Unparseable values are ignored and the configured value is kept.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(seed) = lookup(ENV_SEED).and_then(|v| v.trim().parse().ok()) {
            self.survey.seed = seed;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            self.logging.level = level;
        }
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.size == 0 || self.grid.size > MAX_GRID_SIZE {
            return Err(ConfigError::Invalid {
                field: "grid.size",
                reason: format!("must be in 1..={MAX_GRID_SIZE}, got {}", self.grid.size),
            });
        }
        if self.survey.agents == 0 || self.survey.agents > MAX_AGENTS {
            return Err(ConfigError::Invalid {
                field: "survey.agents",
                reason: format!("must be in 1..={MAX_AGENTS}, got {}", self.survey.agents),
            });
        }
        let blocked = u16::from(self.survey.wall_percent)
            .saturating_add(u16::from(self.survey.food_percent));
        if blocked > 100 {
            return Err(ConfigError::Invalid {
                field: "survey.wall_percent",
                reason: format!("wall_percent + food_percent must not exceed 100, got {blocked}"),
            });
        }
        Ok(())
    }
}

/// Grid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GridConfig {
    /// Side length of the square toroidal grid.
    #[serde(default = "default_grid_size")]
    pub size: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: default_grid_size(),
        }
    }
}

/// Survey harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SurveyConfig {
    /// Number of scouts released from the origin.
    #[serde(default = "default_agents")]
    pub agents: u32,

    /// Turn limit before the survey gives up.
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    /// Random seed for terrain generation.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Chance, in percent, that a cell is a wall.
    #[serde(default = "default_wall_percent")]
    pub wall_percent: u8,

    /// Chance, in percent, that an open cell holds food.
    #[serde(default = "default_food_percent")]
    pub food_percent: u8,

    /// Upper bound on the food units placed on one cell.
    #[serde(default = "default_max_food")]
    pub max_food: u32,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            agents: default_agents(),
            max_turns: default_max_turns(),
            seed: default_seed(),
            wall_percent: default_wall_percent(),
            food_percent: default_food_percent(),
            max_food: default_max_food(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter
    /// directive. `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

const fn default_grid_size() -> usize {
    DEFAULT_GRID_SIZE
}

const fn default_agents() -> u32 {
    4
}

const fn default_max_turns() -> u32 {
    1000
}

const fn default_seed() -> u64 {
    42
}

const fn default_wall_percent() -> u8 {
    20
}

const fn default_food_percent() -> u8 {
    8
}

const fn default_max_food() -> u32 {
    5
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = WaggleConfig::default();
        assert_eq!(config.grid.size, 20);
        assert_eq!(config.survey.seed, 42);
        assert_eq!(config.survey.agents, 4);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
grid:
  size: 32

survey:
  agents: 6
  max_turns: 250
  seed: 123
  wall_percent: 15
  food_percent: 10
  max_food: 3

logging:
  level: "debug"
  json: true
"#;
        let config = WaggleConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.unwrap();

        assert_eq!(config.grid.size, 32);
        assert_eq!(config.survey.agents, 6);
        assert_eq!(config.survey.max_turns, 250);
        assert_eq!(config.survey.wall_percent, 15);
        assert_eq!(config.survey.max_food, 3);
        assert!(config.logging.json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "grid:\n  size: 8\n";
        let config = WaggleConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.unwrap();

        // Size is overridden
        assert_eq!(config.grid.size, 8);
        // Everything else uses defaults
        assert_eq!(config.survey.max_turns, 1000);
        assert_eq!(config.survey.food_percent, 8);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = WaggleConfig::parse("");
        assert!(config.is_ok());
    }

    #[test]
    fn parse_rejects_bad_yaml() {
        let config = WaggleConfig::parse("grid: [unclosed");
        assert!(matches!(config, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn zero_grid_is_invalid() {
        let config = WaggleConfig::parse("grid:\n  size: 0\n");
        assert!(matches!(
            config,
            Err(ConfigError::Invalid {
                field: "grid.size",
                ..
            })
        ));
    }

    #[test]
    fn oversized_grid_is_invalid() {
        let mut config = WaggleConfig::default();
        config.grid.size = MAX_GRID_SIZE.saturating_add(1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn percentages_must_fit() {
        let mut config = WaggleConfig::default();
        config.survey.wall_percent = 70;
        config.survey.food_percent = 40;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "survey.wall_percent",
                ..
            })
        ));
    }

    #[test]
    fn no_agents_is_invalid() {
        let mut config = WaggleConfig::default();
        config.survey.agents = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn too_many_agents_is_invalid() {
        let config = WaggleConfig::parse("survey:\n  agents: 100000\n");
        assert!(matches!(
            config,
            Err(ConfigError::Invalid {
                field: "survey.agents",
                ..
            })
        ));

        let mut config = WaggleConfig::default();
        config.survey.agents = MAX_AGENTS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overrides_replace_seed_and_level() {
        let vars: BTreeMap<&str, &str> = [(ENV_SEED, " 777 "), (ENV_LOG_LEVEL, "trace")].into();
        let mut config = WaggleConfig::default();
        config.apply_overrides(|k| vars.get(k).map(|v| (*v).to_owned()));
        assert_eq!(config.survey.seed, 777);
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn unparseable_seed_override_is_ignored() {
        let mut config = WaggleConfig::default();
        config.apply_overrides(|k| (k == ENV_SEED).then(|| "many".to_owned()));
        assert_eq!(config.survey.seed, 42);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn missing_file_is_io_error() {
        let config = WaggleConfig::from_file(Path::new("/nonexistent/waggle-config.yaml"));
        assert!(matches!(config, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("waggle-config.yaml");
        if path.exists() {
            let config = WaggleConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
