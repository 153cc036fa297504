//! Run configuration
//!
//! Defaults reproduce the classic dataset (5 managers, 10 designers,
//! 15 programmers, 12 artists, 50 products, fan-out 1..=3). A JSON file can
//! override any subset of fields; the CLI then applies its flags on top.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, GenerationError};

/// Default location of the embedded store
pub const DEFAULT_STORAGE_DIR: &str = "orggraph-db";

/// Inclusive range for the number of relationships drawn per entity and type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FanOut {
    pub min: u32,
    pub max: u32,
}

impl Default for FanOut {
    fn default() -> Self {
        Self { min: 1, max: 3 }
    }
}

/// Sizes and sampling policy of the synthetic dataset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub managers: usize,
    pub designers: usize,
    pub programmers: usize,
    pub artists: usize,
    pub products: usize,
    pub fan_out: FanOut,
    /// Attempts at committing the generation transaction; transient storage
    /// failures are retried until this many attempts have been made
    pub commit_attempts: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            managers: 5,
            designers: 10,
            programmers: 15,
            artists: 12,
            products: 50,
            fan_out: FanOut::default(),
            commit_attempts: 3,
        }
    }
}

impl GeneratorConfig {
    /// Reject configurations that cannot produce a valid graph
    ///
    /// Every manager and every product needs at least one designer, programmer
    /// and artist to draw from.
    pub fn validate(&self) -> Result<(), GenerationError> {
        let invalid = |reason: String| Err(GenerationError::InvalidConfig { reason });

        if self.fan_out.min < 1 {
            return invalid("fan-out minimum must be at least 1".to_string());
        }
        if self.fan_out.min > self.fan_out.max {
            return invalid(format!(
                "fan-out minimum {} exceeds maximum {}",
                self.fan_out.min, self.fan_out.max
            ));
        }
        if self.commit_attempts == 0 {
            return invalid("commit_attempts must be at least 1".to_string());
        }
        if self.managers > 0 || self.products > 0 {
            for (pool, size) in [
                ("designers", self.designers),
                ("programmers", self.programmers),
                ("artists", self.artists),
            ] {
                if size == 0 {
                    return invalid(format!(
                        "{pool} must be non-empty when managers or products are generated"
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Everything a run needs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Directory of the embedded store; wiped at startup
    pub storage_dir: PathBuf,
    /// Seed for reproducible datasets; entropy when absent
    pub seed: Option<u64>,
    pub generator: GeneratorConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            seed: None,
            generator: GeneratorConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load a JSON config file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
