// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-channel-impairment project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Impairment engine configuration
//!
//! This module defines the configuration sections that tune the channel
//! filter, the noise source and the silence detector.

use crate::impairment::SilenceSettings;
use crate::preprocessing::filters::DEFAULT_TAP_COUNT;
use crate::preprocessing::silence::SegmenterState;
use crate::utility::noise_generator::DEFAULT_REFERENCE_SIGMA;
use serde::{Deserialize, Serialize};

/// Channel filter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Number of FIR taps
    #[serde(default = "default_tap_count")]
    pub tap_count: usize,
}

fn default_tap_count() -> usize {
    DEFAULT_TAP_COUNT
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            tap_count: default_tap_count(),
        }
    }
}

/// Noise source settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// Standard deviation of the raw draw before calibration
    #[serde(default = "default_reference_sigma")]
    pub reference_sigma: f64,

    /// Fixed seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_reference_sigma() -> f64 {
    DEFAULT_REFERENCE_SIGMA
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            reference_sigma: default_reference_sigma(),
            seed: None,
        }
    }
}

/// Silence detector settings.
///
/// # Thresholds
///
/// With `E` the average instantaneous energy of the filtered signal, silence
/// starts below `E - low_margin_db` and ends above `E - high_margin_db`.
/// `high_margin_db` must be the smaller of the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SilenceConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_initial_state")]
    pub initial_state: SegmenterState,

    #[serde(default = "default_high_margin")]
    pub high_margin_db: f64,

    #[serde(default = "default_low_margin")]
    pub low_margin_db: f64,

    #[serde(default = "default_min_duration")]
    pub min_duration_seconds: f64,
}

fn default_enabled() -> bool {
    true
}

fn default_initial_state() -> SegmenterState {
    SegmenterState::Active
}

fn default_high_margin() -> f64 {
    3.0
}

fn default_low_margin() -> f64 {
    20.0
}

fn default_min_duration() -> f64 {
    0.01
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            initial_state: default_initial_state(),
            high_margin_db: default_high_margin(),
            low_margin_db: default_low_margin(),
            min_duration_seconds: default_min_duration(),
        }
    }
}

impl SilenceConfig {
    /// Detector settings, `None` when silence removal is disabled
    pub fn settings(&self) -> Option<SilenceSettings> {
        self.enabled.then(|| SilenceSettings {
            initial_state: self.initial_state,
            high_margin_db: self.high_margin_db,
            low_margin_db: self.low_margin_db,
            min_duration_seconds: self.min_duration_seconds,
        })
    }
}
