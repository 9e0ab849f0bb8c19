// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-channel-impairment project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration management for the channel impairment simulator
//!
//! This module provides functionality for loading, validating, and applying
//! configuration settings. The configuration is backed by a YAML file and
//! validated against a JSON schema before it is deserialized.
//!
//! ## Configuration Structure
//!
//! - `version`: configuration format version
//! - `filter`: channel filter length
//! - `noise`: raw noise deviation and optional seed
//! - `silence`: silence detector thresholds
//! - `output`: where run directories are created
//!
//! ## Usage
//!
//! ```no_run
//! use rust_channel_impairment::config::Config;
//! use std::path::Path;
//!
//! // Load config from file, creates a default if not found
//! let mut config = Config::from_file(Path::new("config.yaml")).unwrap();
//!
//! // Apply command line overrides if needed
//! config.apply_args(Some(42));
//!
//! println!("Taps: {}", config.filter.tap_count);
//! ```

pub mod impairment;
pub mod output;
pub mod utils;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::error::ImpairmentError;
use crate::impairment::EngineSettings;

pub use impairment::{FilterConfig, NoiseConfig, SilenceConfig};
pub use output::OutputConfig;
pub use utils::{output_config_schema, validate_specific_rules};

/// Newest configuration format this build understands
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure.
///
/// Every section falls back to its defaults when absent, so an empty file
/// is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Format version of the file
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub noise: NoiseConfig,

    #[serde(default)]
    pub silence: SilenceConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            filter: FilterConfig::default(),
            noise: NoiseConfig::default(),
            silence: SilenceConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Helper method to create a sample config file when validation fails
    fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let sample_path = path.as_ref().with_extension("sample.yaml");
        debug!("Creating sample configuration file at {:?}", sample_path);

        if let Some(parent) = sample_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "Failed to create parent directory for sample config at {:?}",
                        parent
                    )
                })?;
            }
        }

        Self::default()
            .save_to_file(&sample_path)
            .with_context(|| format!("Failed to save sample config to {:?}", sample_path))?;

        error!(
            "Sample configuration file created at {:?}\nPlease edit and rename it",
            sample_path
        );
        Ok(())
    }

    /// Load configuration from a file
    ///
    /// A missing file is created with default values. A file declaring a
    /// newer `version` fails with [`ImpairmentError::UnsupportedRuntime`]
    /// wrapped in the returned error.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(
                "Configuration file not found at {:?}, creating default",
                path
            );
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;
        Self::from_yaml_str(&contents, Some(path))
    }

    /// Parse and validate configuration from YAML text.
    ///
    /// `origin` is used for messages and for the location of the sample file
    /// written when validation fails.
    pub fn from_yaml_str(contents: &str, origin: Option<&Path>) -> Result<Self> {
        let label = origin
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<inline>".to_string());

        // An empty document means all defaults
        let yaml_value: serde_yml::Value = if contents.trim().is_empty() {
            serde_yml::Value::Mapping(Default::default())
        } else {
            serde_yml::from_str(contents)
                .with_context(|| format!("Failed to parse YAML configuration from {}", label))?
        };

        let json_value = serde_json::to_value(&yaml_value)
            .with_context(|| format!("Failed to convert YAML to JSON for validation: {}", label))?;

        if let Some(found) = json_value.get("version").and_then(|v| v.as_u64()) {
            if found > CONFIG_VERSION as u64 {
                return Err(ImpairmentError::UnsupportedRuntime {
                    found: u32::try_from(found).unwrap_or(u32::MAX),
                    supported: CONFIG_VERSION,
                }
                .into());
            }
        }

        let schema: serde_json::Value =
            serde_json::from_str(utils::CONFIG_SCHEMA).context("Failed to parse JSON schema")?;
        let validator = jsonschema::draft202012::options()
            .should_validate_formats(true)
            .build(&schema)?;

        debug!("Validating {} configuration against schema", label);
        if let Err(error) = validator.validate(&json_value) {
            error!("Configuration validation error before deserialization");
            if let Some(path) = origin {
                Self::create_sample_config(path)?;
            }
            anyhow::bail!("Configuration validation failed: {}", error);
        }

        let config: Config = serde_json::from_value(json_value)
            .with_context(|| format!("Failed to deserialize configuration from {}", label))?;

        if let Err(err) = validate_specific_rules(&config) {
            error!("Configuration specific validation error: {}", err);
            if let Some(path) = origin {
                Self::create_sample_config(path)?;
            }
            return Err(err);
        }

        Ok(config)
    }

    /// Save the configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml =
            serde_yml::to_string(self).context("Failed to serialize configuration to YAML")?;

        let mut file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create config file at {:?}", path.as_ref()))?;

        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Apply command line arguments to override configuration values.
    ///
    /// Only values that are explicitly provided override the configuration.
    ///
    /// # Parameters
    ///
    /// * `seed` - Optional fixed noise seed
    pub fn apply_args(&mut self, seed: Option<u64>) {
        if let Some(seed) = seed {
            debug!("Overriding noise seed from command line: {}", seed);
            self.noise.seed = Some(seed);
        }
    }

    /// Engine parameters derived from this configuration
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            tap_count: self.filter.tap_count,
            reference_sigma: self.noise.reference_sigma,
            seed: self.noise.seed,
            silence: self.silence.settings(),
        }
    }
}
