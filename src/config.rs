//! Performance configuration — loaded from ~/.reflections/config.yaml.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

fn default_sample_rate() -> u32 {
    44100
}

fn default_volume() -> f64 {
    1.0
}

/// Tunable settings for a performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Sample rate for offline rendering, in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Master volume, 0.0 to 1.0.
    #[serde(default = "default_volume")]
    pub volume: f64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            volume: default_volume(),
        }
    }
}

impl PerformanceConfig {
    /// Standard config path: ~/.reflections/config.yaml.
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".reflections");
        path.push("config.yaml");
        path
    }

    /// Load from the standard path, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn load_default() -> Self {
        std::fs::read_to_string(Self::default_path())
            .ok()
            .and_then(|content| serde_yaml::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Load from an explicit path. Errors are the caller's to surface.
    pub fn load_from(path: &Path) -> Result<Self, io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save to a path, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self).map_err(io::Error::other)?;
        std::fs::write(path, yaml)
    }
}
