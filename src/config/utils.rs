// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-channel-impairment project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides utility functions for working with configuration
//! settings, including validation and schema management.

use anyhow::{Context, Result};
use log::debug;

use super::Config;

/// Embedded JSON schema for the configuration file
pub(crate) const CONFIG_SCHEMA: &str = include_str!("../../resources/config.schema.json");

/// Output the embedded JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line.
///
/// # Example
///
/// ```bash
/// ./rust_channel_impairment --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let schema: serde_json::Value =
        serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;

    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;

    println!("{}", formatted_schema);

    Ok(())
}

/// Validates the configuration against rules the JSON schema cannot express.
///
/// # Validation Rules
///
/// - **Filter**: at least 3 taps
/// - **Noise**: reference deviation strictly positive and finite
/// - **Silence**: margins non-negative and finite, `high_margin_db < low_margin_db`
///   so the detector has a dead band, minimum duration non-negative
/// - **Output**: non-empty run prefix without path separators, at least one attempt
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");

    if config.filter.tap_count < 3 {
        anyhow::bail!(
            "Filter needs at least 3 taps, got {}",
            config.filter.tap_count
        );
    }

    let sigma = config.noise.reference_sigma;
    if !sigma.is_finite() || sigma <= 0.0 {
        anyhow::bail!("Noise reference sigma must be positive, got {}", sigma);
    }

    let silence = &config.silence;
    for (name, value) in [
        ("high_margin_db", silence.high_margin_db),
        ("low_margin_db", silence.low_margin_db),
        ("min_duration_seconds", silence.min_duration_seconds),
    ] {
        if !value.is_finite() || value < 0.0 {
            anyhow::bail!("Silence {} must be a non-negative number, got {}", name, value);
        }
    }
    if silence.high_margin_db >= silence.low_margin_db {
        anyhow::bail!(
            "Silence high_margin_db ({}) must be smaller than low_margin_db ({})",
            silence.high_margin_db,
            silence.low_margin_db
        );
    }

    let prefix = &config.output.run_prefix;
    if prefix.is_empty() || prefix.contains(['/', '\\']) {
        anyhow::bail!("Invalid run directory prefix {:?}", prefix);
    }
    if config.output.max_attempts == 0 {
        anyhow::bail!("Output max_attempts must be at least 1");
    }

    Ok(())
}
