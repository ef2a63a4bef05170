//! Configuration for the Blinkwatch agent.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Blink detection tuning
    pub detector: DetectorConfig,

    /// Window aggregation sizing
    pub window: WindowConfig,

    /// Path for storing metrics and session stats
    pub data_path: PathBuf,

    /// Metrics store filename inside the data path
    pub store_file: String,

    /// Whether session counters persist across runs
    pub persist_stats: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("blinkwatch");

        Self {
            detector: DetectorConfig::default(),
            window: WindowConfig::default(),
            data_path: data_dir,
            store_file: "metrics.jsonl".to_string(),
            persist_stats: true,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("blinkwatch")
            .join("config.json")
    }

    /// Location of the metrics store file.
    pub fn store_path(&self) -> PathBuf {
        self.data_path.join(&self.store_file)
    }

    /// Location of the persisted session counters.
    pub fn stats_path(&self) -> PathBuf {
        self.data_path.join("session_stats.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }
}

/// Blink detection tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// EAR readings below this value count as a closed eye
    pub ear_close_threshold: f64,
    /// Observed frames between registrable blinks
    pub blink_cooldown_frames: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            ear_close_threshold: crate::analyzer::DEFAULT_EAR_CLOSE_THRESHOLD,
            blink_cooldown_frames: crate::analyzer::DEFAULT_BLINK_COOLDOWN_FRAMES,
        }
    }
}

/// Window aggregation sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Frames per aggregation window
    pub frames_per_window: u32,
    /// Rolling CPU sample capacity
    pub cpu_sample_capacity: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            frames_per_window: crate::analyzer::DEFAULT_FRAMES_PER_WINDOW,
            cpu_sample_capacity: crate::analyzer::DEFAULT_CPU_SAMPLE_CAPACITY,
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.detector.ear_close_threshold, 0.25);
        assert_eq!(config.detector.blink_cooldown_frames, 10);
        assert_eq!(config.window.frames_per_window, 30);
        assert_eq!(config.store_file, "metrics.jsonl");
        assert!(config.persist_stats);
    }

    #[test]
    fn test_store_path_joins_data_dir() {
        let mut config = Config::default();
        config.data_path = PathBuf::from("/tmp/bw");
        assert_eq!(config.store_path(), PathBuf::from("/tmp/bw/metrics.jsonl"));
        assert_eq!(
            config.stats_path(),
            PathBuf::from("/tmp/bw/session_stats.json")
        );
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let mut config = Config::default();
        config.detector.ear_close_threshold = 0.21;
        config.window.frames_per_window = 24;

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.detector.ear_close_threshold, 0.21);
        assert_eq!(parsed.window.frames_per_window, 24);
    }
}
