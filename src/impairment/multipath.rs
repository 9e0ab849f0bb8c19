// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-channel-impairment project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Two-path channel with a moving reflector
//!
//! The echo is read from a snapshot of the input through a circular delay
//! line whose delay ramps linearly from the start to the end value over the
//! buffer. Reads wrap in both directions, so any delay is a valid index.

use super::normalizer::normalize_to_i16;
use super::{ImpairmentOutcome, ImpairmentStats};
use crate::acquisition::SampleBuffer;
use crate::error::{ImpairmentError, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Delay in samples as a linear function of the sample index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayProfile {
    start_samples: f64,
    increment: f64,
}

impl DelayProfile {
    /// Ramp from `start_samples` at index 0 towards `end_samples` at index `length`
    pub fn new(start_samples: f64, end_samples: f64, length: usize) -> Self {
        let increment = if length == 0 {
            0.0
        } else {
            (end_samples - start_samples) / length as f64
        };
        Self {
            start_samples,
            increment,
        }
    }

    /// Delay at `index`, rounded to whole samples
    pub fn delay_at(&self, index: usize) -> i64 {
        (self.start_samples + self.increment * index as f64).round() as i64
    }

    /// Index of the delayed sample for output `index` in a buffer of `length`
    pub fn source_index(&self, index: usize, length: usize) -> usize {
        // Delays saturate at the i64 range, widen so the difference cannot overflow
        (index as i128 - self.delay_at(index) as i128).rem_euclid(length as i128) as usize
    }
}

/// Reflected path parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultipathProfile {
    /// Echo delay at the start of the buffer, in milliseconds
    pub start_delay_ms: f64,
    /// Echo delay at the end of the buffer, in milliseconds
    pub end_delay_ms: f64,
    /// Echo gain in dB; negative values attenuate
    pub attenuation_db: f64,
}

impl MultipathProfile {
    pub fn new(start_delay_ms: f64, end_delay_ms: f64, attenuation_db: f64) -> Result<Self> {
        for (name, value) in [
            ("start delay", start_delay_ms),
            ("end delay", end_delay_ms),
            ("path attenuation", attenuation_db),
        ] {
            if !value.is_finite() {
                return Err(ImpairmentError::Parameter(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        Ok(Self {
            start_delay_ms,
            end_delay_ms,
            attenuation_db,
        })
    }

    /// Delay ramp for a buffer of `length` samples at `sample_rate`
    pub fn delay_profile(&self, length: usize, sample_rate: u32) -> DelayProfile {
        let per_ms = sample_rate as f64 / 1000.0;
        DelayProfile::new(self.start_delay_ms * per_ms, self.end_delay_ms * per_ms, length)
    }

    /// Linear echo gain
    pub fn echo_gain(&self) -> f64 {
        10f64.powf(self.attenuation_db / 20.0)
    }

    /// Direct path plus echo, widened to `f64` and not yet normalised
    pub fn combine(&self, samples: &[i32], sample_rate: u32) -> Vec<f64> {
        let length = samples.len();
        if length == 0 {
            return Vec::new();
        }
        let delays = self.delay_profile(length, sample_rate);
        let gain = self.echo_gain();

        // `samples` is never written, so echoes cannot feed back into later reads
        samples
            .iter()
            .enumerate()
            .map(|(i, &direct)| {
                let echo = samples[delays.source_index(i, length)] as f64 * gain;
                direct as f64 + echo
            })
            .collect()
    }

    /// Add the echo to a recording and normalise it to 16-bit full scale
    pub fn apply(&self, buffer: &SampleBuffer) -> Result<ImpairmentOutcome> {
        if buffer.is_empty() {
            return Err(ImpairmentError::Parameter("input has no samples".to_string()));
        }
        let delays = self.delay_profile(buffer.len(), buffer.sample_rate);
        debug!(
            "Multipath delay ramps from {} to {} samples, echo gain {:.3}",
            delays.delay_at(0),
            delays.delay_at(buffer.len()),
            self.echo_gain()
        );

        let combined = self.combine(&buffer.samples, buffer.sample_rate);
        info!(
            "Added echo at {}-{} ms, {} dB",
            self.start_delay_ms, self.end_delay_ms, self.attenuation_db
        );

        Ok(ImpairmentOutcome {
            samples: normalize_to_i16(&combined),
            sample_rate: buffer.sample_rate,
            stats: ImpairmentStats::passthrough(buffer.len()),
        })
    }
}
