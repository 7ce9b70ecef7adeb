//! Configuration types for camyuv

use crate::error::{Error, Result};
use crate::types::Rotation;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration, loadable from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Last-frame store settings
    pub store: StoreConfig,
    /// Rotation applied by default
    pub rotation: RotationConfig,
}

impl Config {
    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    pub fn with_rotation(mut self, degrees: i32) -> Self {
        self.rotation.degrees = degrees;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.store.ring_size == 0 {
            return Err(Error::Config("store.ring_size must be at least 1".into()));
        }
        Ok(())
    }
}

/// Last-frame store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Minimum time between accepted frames in ms (0 accepts every frame)
    pub min_interval_ms: u64,
    /// Number of output buffers cycled between frames
    pub ring_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 200, // 5 fps
            ring_size: 3,
        }
    }
}

impl StoreConfig {
    pub fn with_min_interval_ms(mut self, ms: u64) -> Self {
        self.min_interval_ms = ms;
        self
    }

    pub fn with_ring_size(mut self, size: usize) -> Self {
        self.ring_size = size;
        self
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

/// Rotation configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Clockwise rotation in degrees; any integer, normalized on use
    pub degrees: i32,
}

impl RotationConfig {
    pub fn rotation(&self) -> Rotation {
        Rotation::from_degrees(self.degrees)
    }
}
