//! Configuration
//!
//! Tuning for the hunt, loaded from a TOML file. Every section is optional;
//! anything left out falls back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Complete hunt configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HuntConfig {
    /// How many rabbits live in the forest
    #[serde(default)]
    pub population: PopulationConfig,
    /// Random walk weights
    #[serde(default)]
    pub movement: MovementConfig,
    /// Idle and flee timers for new rabbits
    #[serde(default)]
    pub timing: TimingConfig,
    /// Scent tracks
    #[serde(default)]
    pub tracks: TrackConfig,
}

impl HuntConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Returns this configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Loads `path` if it exists, falling back to defaults otherwise.
    ///
    /// A missing file is normal. An unreadable or malformed one is logged and
    /// ignored so a bad tuning file never blocks play.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        Self::from_file(path).unwrap_or_else(|e| {
            tracing::warn!("Could not load {}: {}. Using defaults.", path.display(), e);
            Self::default()
        })
    }
}

/// Population control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// The forest is refilled to this many rabbits after every check
    pub min_rabbits: usize,
    /// Spawning never pushes the forest past this many rabbits
    pub max_rabbits: usize,
    /// Chance per check that one extra rabbit appears
    pub spawn_chance: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            min_rabbits: 1,
            max_rabbits: 15,
            spawn_chance: 0.20,
        }
    }
}

impl PopulationConfig {
    /// The effective floor: never above the ceiling.
    pub fn floor(&self) -> usize {
        self.min_rabbits.min(self.max_rabbits)
    }
}

/// Random walk weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Chance a step goes up instead of down. Kept low because there is only
    /// ever one way up but usually several ways down.
    pub ascend_chance: f64,
    /// Chance a move takes two steps instead of one
    pub two_step_chance: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            ascend_chance: 0.30,
            two_step_chance: 0.50,
        }
    }
}

/// Rabbit timers, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// How long a wandering rabbit stays put before moving on
    pub idle_secs: u64,
    /// How long a spotted rabbit keeps fleeing
    pub flee_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            idle_secs: crate::rabbit::DEFAULT_IDLE_DURATION.as_secs(),
            flee_secs: crate::rabbit::DEFAULT_FLEE_DURATION.as_secs(),
        }
    }
}

impl TimingConfig {
    pub fn idle_duration(&self) -> Duration {
        Duration::from_secs(self.idle_secs)
    }

    pub fn flee_duration(&self) -> Duration {
        Duration::from_secs(self.flee_secs)
    }
}

/// Scent track settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Whether wandering rabbits leave tracks at all
    pub enabled: bool,
    /// Tracks fade after the idle duration divided by this
    pub fade_divisor: u32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fade_divisor: 5,
        }
    }
}

impl TrackConfig {
    /// How long tracks last for rabbits idling `idle`.
    pub fn fade_after(&self, idle: Duration) -> Duration {
        idle / self.fade_divisor.max(1)
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Rabbit configuration

[population]
min_rabbits = 1
max_rabbits = 15
spawn_chance = 0.2

[movement]
ascend_chance = 0.3
two_step_chance = 0.5

[timing]
idle_secs = 300
flee_secs = 5

[tracks]
enabled = true
fade_divisor = 5
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = HuntConfig::default();

        assert_eq!(config.population.min_rabbits, 1);
        assert_eq!(config.population.max_rabbits, 15);
        assert_eq!(config.population.spawn_chance, 0.20);
        assert_eq!(config.movement.ascend_chance, 0.30);
        assert_eq!(config.timing.idle_duration(), Duration::from_secs(300));
        assert_eq!(config.timing.flee_duration(), Duration::from_secs(5));
        assert!(config.tracks.enabled);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
            [population]
            min_rabbits = 3

            [timing]
            flee_secs = 30
        "#;

        let config = HuntConfig::from_str(toml).unwrap();

        assert_eq!(config.population.min_rabbits, 3);
        assert_eq!(config.population.max_rabbits, 15);
        assert_eq!(config.timing.flee_secs, 30);
        assert_eq!(config.timing.idle_secs, 300);
        assert_eq!(config.movement, MovementConfig::default());
    }

    #[test]
    fn test_default_config_toml_parses() {
        let config = HuntConfig::from_str(&default_config_toml()).unwrap();
        assert_eq!(config, HuntConfig::default());
    }

    #[test]
    fn test_config_to_toml() {
        let toml = HuntConfig::default().to_toml().unwrap();

        assert!(toml.contains("[population]"));
        assert!(toml.contains("[movement]"));
        assert!(toml.contains("[timing]"));
        assert!(toml.contains("[tracks]"));
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let result = HuntConfig::from_str("[population]\nmin_rabbits = \"lots\"");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert_eq!(HuntConfig::load_or_default(&missing), HuntConfig::default());

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "not = [valid").unwrap();
        assert_eq!(HuntConfig::load_or_default(&broken), HuntConfig::default());

        let tuned = dir.path().join("tuned.toml");
        std::fs::write(&tuned, "[movement]\nascend_chance = 0.1\n").unwrap();
        assert_eq!(HuntConfig::load_or_default(&tuned).movement.ascend_chance, 0.1);
    }

    #[test]
    fn test_floor_never_exceeds_ceiling() {
        let population = PopulationConfig {
            min_rabbits: 20,
            max_rabbits: 4,
            spawn_chance: 0.0,
        };
        assert_eq!(population.floor(), 4);
    }

    #[test]
    fn test_track_fade() {
        let tracks = TrackConfig::default();
        assert_eq!(tracks.fade_after(Duration::from_secs(300)), Duration::from_secs(60));

        let odd = TrackConfig {
            enabled: true,
            fade_divisor: 0,
        };
        assert_eq!(odd.fade_after(Duration::from_secs(10)), Duration::from_secs(10));
    }
}
