use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::warn;

const MIN_INTERVAL_MS: u64 = 1_000;
const MAX_INTERVAL_MS: u64 = 3_600_000;

/// Collector configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root under which `proc`, `sys` and the listing utilities are found
    pub root: PathBuf,

    /// Sampling interval in milliseconds
    pub interval_ms: u64,

    /// Number of samples to emit; runs until killed when absent
    pub samples: Option<u64>,

    /// Block devices to sample; every device found at baseline when empty
    pub disks: Vec<String>,

    /// Filesystem types reported by the filesystem inventory
    pub filesystem_types: Vec<String>,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/"),
            interval_ms: 60_000,
            samples: None,
            disks: Vec::new(),
            filesystem_types: vec!["ext2".to_string(), "ext3".to_string(), "ext4".to_string()],
            pretty: false,
        }
    }
}

impl Config {
    /// Load configuration from multiple sources in order of preference:
    /// 1. CLI arguments override everything
    /// 2. JSON config file if specified
    /// 3. Default config file locations
    /// 4. Built-in defaults
    pub fn load(cli_config: Option<&CliConfig>, json_path: Option<&Path>) -> Result<Self> {
        let mut config = match json_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_default_config().unwrap_or_default(),
        };

        if let Some(cli) = cli_config {
            config.apply_cli_overrides(cli);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CoreError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            CoreError::config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }

    /// First readable file among the default locations
    fn load_default_config() -> Option<Self> {
        for path in Self::default_config_paths() {
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(&path) {
                Ok(config) => return Some(config),
                Err(e) => warn!(path = %path.display(), error = %e, "ignoring config file"),
            }
        }
        None
    }

    /// Get default configuration file search paths
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("hostmon").join("config.json"));
        }

        // Home directory
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".hostmon.json"));
        }

        // Current directory
        paths.push(PathBuf::from("hostmon.json"));

        paths
    }

    /// Apply CLI argument overrides
    fn apply_cli_overrides(&mut self, cli: &CliConfig) {
        if let Some(root) = &cli.root {
            self.root = root.clone();
        }
        if let Some(interval) = cli.interval_ms {
            self.interval_ms = interval;
        }
        if let Some(samples) = cli.samples {
            self.samples = Some(samples);
        }
        if !cli.disks.is_empty() {
            self.disks = cli.disks.clone();
        }
        if cli.pretty {
            self.pretty = true;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.interval_ms < MIN_INTERVAL_MS {
            return Err(CoreError::config("Interval must be at least 1 second"));
        }

        if self.interval_ms > MAX_INTERVAL_MS {
            return Err(CoreError::config("Interval must be at most 1 hour"));
        }

        if !self.root.is_absolute() {
            return Err(CoreError::config(format!(
                "Root must be an absolute path: {}",
                self.root.display()
            )));
        }

        if self.samples == Some(0) {
            return Err(CoreError::config("Sample count must be positive"));
        }

        Ok(())
    }

    /// Get sampling interval as Duration
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// CLI configuration (temporary struct for CLI parsing)
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub root: Option<PathBuf>,
    pub interval_ms: Option<u64>,
    pub samples: Option<u64>,
    pub disks: Vec<String>,
    pub pretty: bool,
}
