//! Command-line arguments
//!
//! Flags override values from `--config`, which in turn override the built-in
//! defaults.

use std::path::PathBuf;

use clap::Parser;
use orggraph_core::{AnalysisConfig, ConfigError};

/// orggraph - synthetic organisation graph and sales analysis
#[derive(Debug, Parser)]
#[command(name = "orggraph")]
#[command(version)] // Auto-pull version from Cargo.toml
#[command(
    about = "Generate a synthetic organisation graph and report on product sales",
    long_about = None
)]
pub struct Cli {
    /// JSON file with an analysis configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Storage directory; deleted and recreated on every run
    #[arg(long)]
    pub storage_dir: Option<PathBuf>,

    /// Seed for a reproducible dataset
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub managers: Option<usize>,

    #[arg(long)]
    pub designers: Option<usize>,

    #[arg(long)]
    pub programmers: Option<usize>,

    #[arg(long)]
    pub artists: Option<usize>,

    #[arg(long)]
    pub products: Option<usize>,
}

impl Cli {
    /// Resolve the effective configuration
    pub fn into_config(self) -> Result<AnalysisConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_file(path)?,
            None => AnalysisConfig::default(),
        };

        if let Some(dir) = self.storage_dir {
            config.storage_dir = dir;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        let generator = &mut config.generator;
        for (flag, field) in [
            (self.managers, &mut generator.managers),
            (self.designers, &mut generator.designers),
            (self.programmers, &mut generator.programmers),
            (self.artists, &mut generator.artists),
            (self.products, &mut generator.products),
        ] {
            if let Some(value) = flag {
                *field = value;
            }
        }

        Ok(config)
    }
}
