// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-channel-impairment project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Channel impairment module
//!
//! Three impairments are available, each turning a recording into a
//! normalised 16-bit buffer:
//!
//! - [`AwgnImpairment`]: band-limit, strip silence, add noise at a target SNR
//! - [`FadingProfile`]: sinusoidal gain envelope
//! - [`MultipathProfile`]: echo through a delay line with a moving reflector

pub mod fading;
pub mod multipath;
pub mod noise;
pub mod normalizer;

pub use fading::FadingProfile;
pub use multipath::{DelayProfile, MultipathProfile};
pub use noise::{AwgnImpairment, CalibratedNoise, NoiseCalibrator};
pub use normalizer::normalize_to_i16;

use crate::acquisition::SampleBuffer;
use crate::error::Result;
use crate::preprocessing::filters::DEFAULT_TAP_COUNT;
use crate::preprocessing::silence::{SegmenterState, SilenceInterval};
use crate::utility::noise_generator::{NoiseGenerator, DEFAULT_REFERENCE_SIGMA};
use serde::{Deserialize, Serialize};

/// Silence detector parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SilenceSettings {
    pub initial_state: SegmenterState,
    pub high_margin_db: f64,
    pub low_margin_db: f64,
    pub min_duration_seconds: f64,
}

impl Default for SilenceSettings {
    fn default() -> Self {
        Self {
            initial_state: SegmenterState::Active,
            high_margin_db: 3.0,
            low_margin_db: 20.0,
            min_duration_seconds: 0.01,
        }
    }
}

/// Engine parameters that do not come from the impairment itself
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// FIR length for the channel filter
    pub tap_count: usize,
    /// Standard deviation of the raw noise draw
    pub reference_sigma: f64,
    /// Fixed noise seed, OS entropy when `None`
    pub seed: Option<u64>,
    /// Silence removal before calibration, disabled when `None`
    pub silence: Option<SilenceSettings>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tap_count: DEFAULT_TAP_COUNT,
            reference_sigma: DEFAULT_REFERENCE_SIGMA,
            seed: None,
            silence: Some(SilenceSettings::default()),
        }
    }
}

/// Measurements taken while impairing a buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpairmentStats {
    pub input_samples: usize,
    pub silence_intervals: Vec<SilenceInterval>,
    pub signal_energy_db: Option<f64>,
    pub noise_energy_db: Option<f64>,
    pub achieved_snr_db: Option<f64>,
}

impl ImpairmentStats {
    /// Stats for an impairment that keeps every sample and adds no noise
    pub fn passthrough(input_samples: usize) -> Self {
        Self {
            input_samples,
            silence_intervals: Vec::new(),
            signal_energy_db: None,
            noise_energy_db: None,
            achieved_snr_db: None,
        }
    }

    pub fn removed_samples(&self) -> usize {
        self.silence_intervals.iter().map(|i| i.duration).sum()
    }
}

/// Impaired, normalised samples ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct ImpairmentOutcome {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub stats: ImpairmentStats,
}

/// One of the supported channel impairments
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Impairment {
    Awgn(AwgnImpairment),
    Fade(FadingProfile),
    Multipath(MultipathProfile),
}

impl Impairment {
    pub fn mode_name(&self) -> &'static str {
        match self {
            Impairment::Awgn(_) => "awgn",
            Impairment::Fade(_) => "fade",
            Impairment::Multipath(_) => "multipath",
        }
    }

    /// File name embedding the mode and its parameters
    pub fn output_file_name(&self) -> String {
        match self {
            Impairment::Awgn(p) => format!("output_awgn_{}Hz_{}dB.wav", p.bandwidth_hz, p.snr_db),
            Impairment::Fade(p) => format!("output_fade_{}dB_{}s.wav", p.depth_db, p.period_s),
            Impairment::Multipath(p) => format!(
                "output_multipath_{}-{}ms_{}dB.wav",
                p.start_delay_ms, p.end_delay_ms, p.attenuation_db
            ),
        }
    }

    /// Run the impairment on `buffer`
    pub fn apply(&self, buffer: &SampleBuffer, settings: &EngineSettings) -> Result<ImpairmentOutcome> {
        match self {
            Impairment::Awgn(awgn) => {
                let mut generator =
                    NoiseGenerator::from_optional_seed(settings.seed, settings.reference_sigma)?;
                awgn.apply(buffer, settings, &mut generator)
            }
            Impairment::Fade(fade) => fade.apply(buffer),
            Impairment::Multipath(multipath) => multipath.apply(buffer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_names() {
        let awgn = Impairment::Awgn(AwgnImpairment::new(3000.0, 10.5));
        assert_eq!(awgn.output_file_name(), "output_awgn_3000Hz_10.5dB.wav");

        let fade = Impairment::Fade(FadingProfile::new(20.0, 0.5).unwrap());
        assert_eq!(fade.output_file_name(), "output_fade_20dB_0.5s.wav");

        let multipath = Impairment::Multipath(MultipathProfile::new(1.0, 3.5, -6.0).unwrap());
        assert_eq!(
            multipath.output_file_name(),
            "output_multipath_1-3.5ms_-6dB.wav"
        );
        assert_eq!(multipath.mode_name(), "multipath");
    }

    #[test]
    fn test_seeded_awgn_is_reproducible() {
        let buffer = SampleBuffer::new(
            (0..4000).map(|i| ((i * 37) % 2000) - 1000).collect(),
            8000,
        );
        let settings = EngineSettings {
            seed: Some(1234),
            ..EngineSettings::default()
        };
        let impairment = Impairment::Awgn(AwgnImpairment::new(2000.0, 6.0));

        let first = impairment.apply(&buffer, &settings).unwrap();
        let second = impairment.apply(&buffer, &settings).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_serialized_with_mode_tag() {
        let impairment = Impairment::Fade(FadingProfile::new(10.0, 2.0).unwrap());
        let json = serde_json::to_value(impairment).unwrap();
        assert_eq!(json["mode"], "fade");
        assert_eq!(json["depth_db"], 10.0);
    }
}
