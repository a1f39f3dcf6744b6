use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, SampleRelayError};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parses a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises the configuration to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads a configuration from a JSON file on disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Writes the configuration to a JSON file on disk.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Checks that the configuration describes a usable pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.capacity == 0 {
            return Err(SampleRelayError::InvalidInput(
                "pipeline capacity must be at least one block",
            ));
        }
        if self.pipeline.block_size == 0 {
            return Err(SampleRelayError::InvalidInput(
                "pipeline block size must be at least one sample",
            ));
        }
        Ok(())
    }
}

/// Configuration specific to the sample handoff pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Ring buffer capacity in samples.
    pub capacity: usize,
    /// Number of samples exchanged per producer/consumer call.
    pub block_size: usize,
    pub sample_rate: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capacity: 8_192,
            block_size: 1_024,
            sample_rate: 48_000,
        }
    }
}
