// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-channel-impairment project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Sinusoidal fading envelope
//!
//! ```text
//! gain(t) = (depth / 2) * sin(2π t / period) - depth / 2      [dB]
//! ```
//!
//! The envelope swings between 0 dB (at `period/4`) and `-depth` dB
//! (at `3·period/4`), starting from `-depth/2` at `t = 0`.

use super::normalizer::normalize_to_i16;
use super::{ImpairmentOutcome, ImpairmentStats};
use crate::acquisition::SampleBuffer;
use crate::error::{ImpairmentError, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Fading depth and period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadingProfile {
    /// Peak-to-trough depth in dB
    pub depth_db: f64,
    /// Period of one fade cycle in seconds
    pub period_s: f64,
}

impl FadingProfile {
    pub fn new(depth_db: f64, period_s: f64) -> Result<Self> {
        if !depth_db.is_finite() || depth_db < 0.0 {
            return Err(ImpairmentError::Parameter(format!(
                "fade depth must be a non-negative number of dB, got {}",
                depth_db
            )));
        }
        if !period_s.is_finite() || period_s <= 0.0 {
            return Err(ImpairmentError::Parameter(format!(
                "fade period must be positive, got {} s",
                period_s
            )));
        }
        Ok(Self { depth_db, period_s })
    }

    /// Gain in dB at time `t` seconds
    pub fn gain_db(&self, t: f64) -> f64 {
        let half = self.depth_db / 2.0;
        half * (2.0 * PI * t / self.period_s).sin() - half
    }

    /// Linear amplitude multiplier at time `t` seconds
    pub fn gain_linear(&self, t: f64) -> f64 {
        10f64.powf(self.gain_db(t) / 20.0)
    }

    /// Gain in dB for every sample; time runs linearly from 0 to `n / sample_rate`.
    pub fn profile_db(&self, sample_count: usize, sample_rate: u32) -> Vec<f64> {
        sample_times(sample_count, sample_rate)
            .map(|t| self.gain_db(t))
            .collect()
    }

    /// Faded copy of `samples`, still at the input scale
    pub fn fade(&self, samples: &[i32], sample_rate: u32) -> Vec<f64> {
        samples
            .iter()
            .zip(sample_times(samples.len(), sample_rate))
            .map(|(&s, t)| s as f64 * self.gain_linear(t))
            .collect()
    }

    /// Fade a recording and normalise it to 16-bit full scale
    pub fn apply(&self, buffer: &SampleBuffer) -> Result<ImpairmentOutcome> {
        if buffer.is_empty() {
            return Err(ImpairmentError::Parameter("input has no samples".to_string()));
        }
        if buffer.sample_rate == 0 {
            return Err(ImpairmentError::Parameter("sample rate is zero".to_string()));
        }
        debug!(
            "Fading {} samples, depth {} dB, period {} s",
            buffer.len(),
            self.depth_db,
            self.period_s
        );

        let faded = self.fade(&buffer.samples, buffer.sample_rate);
        info!(
            "Applied {} dB fade with a {} s period over {:.2} s",
            self.depth_db,
            self.period_s,
            buffer.duration()
        );

        Ok(ImpairmentOutcome {
            samples: normalize_to_i16(&faded),
            sample_rate: buffer.sample_rate,
            stats: ImpairmentStats::passthrough(buffer.len()),
        })
    }
}

// linspace(0, n / fs, n)
fn sample_times(sample_count: usize, sample_rate: u32) -> impl Iterator<Item = f64> {
    let duration = if sample_rate == 0 {
        0.0
    } else {
        sample_count as f64 / sample_rate as f64
    };
    let step = if sample_count > 1 {
        duration / (sample_count - 1) as f64
    } else {
        0.0
    };
    (0..sample_count).map(move |i| i as f64 * step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_landmarks() {
        let profile = FadingProfile::new(20.0, 2.0).unwrap();
        assert!((profile.gain_db(0.0) + 10.0).abs() < 1e-12);
        assert!(profile.gain_db(0.5).abs() < 1e-12);
        assert!((profile.gain_db(1.0) + 10.0).abs() < 1e-9);
        assert!((profile.gain_db(1.5) + 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_gain_stays_between_zero_and_minus_depth() {
        let profile = FadingProfile::new(12.0, 0.3).unwrap();
        for g in profile.profile_db(10_000, 8000) {
            assert!(g <= 1e-12 && g >= -12.0 - 1e-12);
        }
    }

    #[test]
    fn test_profile_is_periodic() {
        let profile = FadingProfile::new(30.0, 0.25).unwrap();
        for i in 0..100 {
            let t = i as f64 * 0.0137;
            assert!((profile.gain_db(t) - profile.gain_db(t + 0.25)).abs() < 1e-9);
            assert!((profile.gain_db(t) - profile.gain_db(t + 0.75)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_time_axis_spans_duration() {
        let times: Vec<f64> = sample_times(5, 4).collect();
        assert_eq!(times.first(), Some(&0.0));
        assert!((times[4] - 1.25).abs() < 1e-12);
        assert_eq!(sample_times(1, 8000).collect::<Vec<_>>(), vec![0.0]);
        assert_eq!(sample_times(0, 8000).count(), 0);
    }

    #[test]
    fn test_zero_depth_leaves_signal_unchanged() {
        let profile = FadingProfile::new(0.0, 1.0).unwrap();
        let samples = vec![100, -200, 300];
        assert_eq!(profile.fade(&samples, 8000), vec![100.0, -200.0, 300.0]);
    }

    #[test]
    fn test_fade_follows_envelope() {
        let profile = FadingProfile::new(20.0, 1.0).unwrap();
        let samples = vec![10000; 8001];
        let faded = profile.fade(&samples, 8000);
        // t = 0 -> -10 dB
        assert!((faded[0] - 10000.0 * 10f64.powf(-0.5)).abs() < 1e-6);
        // sample 2000 sits at t = 0.25 s -> 0 dB
        assert!((faded[2000] - 10000.0).abs() < 1e-3);
        // sample 6000 sits at t = 0.75 s -> -20 dB
        assert!((faded[6000] - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn test_apply_normalises_output() {
        let profile = FadingProfile::new(6.0, 0.5).unwrap();
        let buffer = SampleBuffer::new(vec![20000; 4000], 8000);
        let outcome = profile.apply(&buffer).unwrap();
        assert_eq!(outcome.samples.len(), 4000);
        assert_eq!(outcome.samples.iter().copied().max(), Some(i16::MAX));
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        assert!(FadingProfile::new(10.0, 0.0).is_err());
        assert!(FadingProfile::new(10.0, -1.0).is_err());
        assert!(FadingProfile::new(-3.0, 1.0).is_err());
        assert!(FadingProfile::new(f64::INFINITY, 1.0).is_err());
    }
}
