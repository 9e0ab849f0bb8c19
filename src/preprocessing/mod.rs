// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-channel-impairment project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).
//! Signal preprocessing module
//!
//! This module band-limits the recording, measures its energy and strips
//! dead air before the noise level is calibrated.

pub mod energy;
pub mod filters;
pub mod silence;
#[cfg(test)]
mod filters_test;

pub use energy::EnergyLevel;
pub use filters::{ConvolutionMode, Filter, FilterKernel, FirLowpassDesigner};
pub use silence::{SegmenterState, SilenceInterval, SilenceSegmenter};

use crate::error::Result;

/// Design a unity-gain low-pass kernel for the given pass-band edge
pub fn create_lowpass_kernel(
    cutoff_freq: f64,
    sample_rate: u32,
    tap_count: usize,
) -> Result<FilterKernel> {
    FirLowpassDesigner::new(cutoff_freq)
        .with_sample_rate(sample_rate)
        .with_tap_count(tap_count)
        .design()
}
