// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-channel-impairment project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Band-limited additive Gaussian noise at a target SNR
//!
//! The noise is drawn with a fixed reference deviation, band-limited with the
//! same kernel as the signal, measured, and then scaled by the dB error
//! between the measured level and the level the target SNR requires. Scaling
//! after measuring removes the spread between the empirical energy of one
//! finite draw and the population variance.

use super::normalizer::normalize_to_i16;
use super::{EngineSettings, ImpairmentOutcome, ImpairmentStats};
use crate::acquisition::SampleBuffer;
use crate::error::{ImpairmentError, Result};
use crate::preprocessing::energy::{self, EnergyLevel};
use crate::preprocessing::filters::{ConvolutionMode, FilterKernel};
use crate::preprocessing::silence::{self, SilenceSegmenter};
use crate::preprocessing::create_lowpass_kernel;
use crate::utility::noise_generator::NoiseGenerator;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Noise already scaled to its target level
#[derive(Debug, Clone)]
pub struct CalibratedNoise {
    /// Filtered, gain-corrected noise, same length as the signal
    pub samples: Vec<f64>,
    /// Energy of the signal the noise was calibrated against
    pub signal_energy: EnergyLevel,
    /// Energy of the filtered noise before correction
    pub raw_noise_energy: EnergyLevel,
    /// Correction applied to the filtered noise, in dB
    pub gain_error_db: f64,
    /// Energy of the noise after correction
    pub noise_energy: EnergyLevel,
}

impl CalibratedNoise {
    /// Achieved SNR in dB, `None` when the signal has no energy
    pub fn snr_db(&self) -> Option<f64> {
        energy::snr_db(self.signal_energy, self.noise_energy)
    }
}

/// Scales filtered Gaussian noise to a requested SNR against a signal
pub struct NoiseCalibrator<'a> {
    kernel: &'a FilterKernel,
    target_snr_db: f64,
}

impl<'a> NoiseCalibrator<'a> {
    pub fn new(kernel: &'a FilterKernel, target_snr_db: f64) -> Self {
        Self {
            kernel,
            target_snr_db,
        }
    }

    /// Noise for an already filtered `signal`.
    ///
    /// The draw is `len(signal) + taps - 1` long so valid-mode filtering
    /// returns exactly `len(signal)` samples.
    pub fn calibrate(
        &self,
        signal: &[f64],
        generator: &mut NoiseGenerator,
    ) -> Result<CalibratedNoise> {
        if !self.target_snr_db.is_finite() {
            return Err(ImpairmentError::Parameter(format!(
                "target SNR must be finite, got {}",
                self.target_snr_db
            )));
        }
        if signal.is_empty() {
            return Err(ImpairmentError::Parameter(
                "cannot calibrate noise against an empty signal".to_string(),
            ));
        }

        let draw = generator.generate_mono(signal.len() + self.kernel.len() - 1);
        let mut noise = self.kernel.filter(&draw, ConvolutionMode::Valid);
        let raw_noise_energy = energy::energy(&noise);
        debug!("Filtered noise energy is {}", raw_noise_energy);

        let signal_energy = energy::energy(signal);
        if signal_energy.is_silent() {
            warn!("Signal has no energy, injecting no noise");
            noise.iter_mut().for_each(|s| *s = 0.0);
            return Ok(CalibratedNoise {
                samples: noise,
                signal_energy,
                raw_noise_energy,
                gain_error_db: f64::NEG_INFINITY,
                noise_energy: EnergyLevel::SILENT,
            });
        }
        if raw_noise_energy.is_silent() {
            return Err(ImpairmentError::Parameter(
                "generated noise has no energy, check the reference deviation".to_string(),
            ));
        }

        let required = signal_energy.db() - self.target_snr_db;
        let gain_error_db = required - raw_noise_energy.db();
        debug!(
            "Energy required in noise is {:.1} dB, energy error is {:.1} dB",
            required, gain_error_db
        );

        let gain = 10f64.powf(gain_error_db / 20.0);
        noise.iter_mut().for_each(|s| *s *= gain);
        let noise_energy = energy::energy(&noise);

        Ok(CalibratedNoise {
            samples: noise,
            signal_energy,
            raw_noise_energy,
            gain_error_db,
            noise_energy,
        })
    }
}

/// Band-limit a recording and add noise at a target SNR
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AwgnImpairment {
    /// Pass-band edge of the channel filter in Hz
    pub bandwidth_hz: f64,
    /// Requested signal-to-noise ratio in dB
    pub snr_db: f64,
}

impl AwgnImpairment {
    pub fn new(bandwidth_hz: f64, snr_db: f64) -> Self {
        Self {
            bandwidth_hz,
            snr_db,
        }
    }

    pub fn apply(
        &self,
        buffer: &SampleBuffer,
        settings: &EngineSettings,
        generator: &mut NoiseGenerator,
    ) -> Result<ImpairmentOutcome> {
        if buffer.is_empty() {
            return Err(ImpairmentError::Parameter("input has no samples".to_string()));
        }

        let kernel = create_lowpass_kernel(self.bandwidth_hz, buffer.sample_rate, settings.tap_count)?;
        let mut filtered = kernel.filter(&buffer.as_f64(), ConvolutionMode::Same);

        let filtered_energy = energy::energy(&filtered);
        let average = energy::average_instantaneous_energy(&filtered);
        info!("Energy in filtered input audio is {}", filtered_energy);
        info!("Average instantaneous energy is {}", average);

        let mut intervals = Vec::new();
        if let Some(silence_settings) = &settings.silence {
            let segmenter = SilenceSegmenter::new(
                buffer.sample_rate,
                silence_settings.min_duration_seconds,
            )
            .with_initial_state(silence_settings.initial_state)
            .with_margins(silence_settings.high_margin_db, silence_settings.low_margin_db);

            intervals = segmenter.find(&filtered, average);
            if !intervals.is_empty() {
                filtered = silence::trim(&filtered, &intervals);
                info!(
                    "Energy in filtered and trimmed input audio is {}, average instantaneous energy is {}",
                    energy::energy(&filtered),
                    energy::average_instantaneous_energy(&filtered)
                );
            }
        }
        if filtered.is_empty() {
            return Err(ImpairmentError::Parameter(
                "the whole input was classified as silence".to_string(),
            ));
        }

        let noise = NoiseCalibrator::new(&kernel, self.snr_db).calibrate(&filtered, generator)?;
        if let Some(snr) = noise.snr_db() {
            info!("Average signal to noise ratio is {:.1} dB", snr);
        }

        let combined: Vec<f64> = filtered
            .iter()
            .zip(&noise.samples)
            .map(|(s, n)| s + n)
            .collect();

        Ok(ImpairmentOutcome {
            samples: normalize_to_i16(&combined),
            sample_rate: buffer.sample_rate,
            stats: ImpairmentStats {
                input_samples: buffer.len(),
                silence_intervals: intervals,
                signal_energy_db: finite_db(noise.signal_energy),
                noise_energy_db: finite_db(noise.noise_energy),
                achieved_snr_db: noise.snr_db(),
            },
        })
    }
}

fn finite_db(level: EnergyLevel) -> Option<f64> {
    (!level.is_silent()).then(|| level.db())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::FirLowpassDesigner;

    fn kernel() -> FilterKernel {
        FirLowpassDesigner::new(3000.0)
            .with_sample_rate(8000)
            .design()
            .unwrap()
    }

    fn tone(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| 8000.0 * (2.0 * std::f64::consts::PI * 440.0 * i as f64 / 8000.0).sin())
            .collect()
    }

    #[test]
    fn test_calibrated_noise_matches_signal_length() {
        let kernel = kernel();
        let signal = tone(5000);
        let mut generator = NoiseGenerator::new(1, 10000.0).unwrap();
        let noise = NoiseCalibrator::new(&kernel, 10.0)
            .calibrate(&signal, &mut generator)
            .unwrap();
        assert_eq!(noise.samples.len(), signal.len());
    }

    #[test]
    fn test_snr_of_sum_within_half_db() {
        let kernel = kernel();
        let signal = kernel.filter(&tone(100_000), ConvolutionMode::Same);
        for &target in &[0.0, 10.0, 25.0, -5.0] {
            let mut generator = NoiseGenerator::new(99, 10000.0).unwrap();
            let noise = NoiseCalibrator::new(&kernel, target)
                .calibrate(&signal, &mut generator)
                .unwrap();

            let combined: Vec<f64> = signal.iter().zip(&noise.samples).map(|(s, n)| s + n).collect();
            let residual: Vec<f64> = combined.iter().zip(&signal).map(|(c, s)| c - s).collect();
            let measured = energy::energy(&signal) - energy::energy(&residual);
            assert!(
                (measured - target).abs() < 0.5,
                "target {} dB, measured {} dB",
                target,
                measured
            );
        }
    }

    #[test]
    fn test_gain_error_compensates_draw_level() {
        let kernel = kernel();
        let signal = tone(20_000);
        // A tiny reference deviation needs a large positive correction
        let mut generator = NoiseGenerator::new(5, 1.0).unwrap();
        let noise = NoiseCalibrator::new(&kernel, 20.0)
            .calibrate(&signal, &mut generator)
            .unwrap();
        assert!(noise.gain_error_db > 40.0);
        assert!((noise.snr_db().unwrap() - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_silent_signal_gets_no_noise() {
        let kernel = kernel();
        let mut generator = NoiseGenerator::new(5, 10000.0).unwrap();
        let noise = NoiseCalibrator::new(&kernel, 10.0)
            .calibrate(&[0.0; 1000], &mut generator)
            .unwrap();
        assert!(noise.samples.iter().all(|&s| s == 0.0));
        assert!(noise.noise_energy.is_silent());
        assert_eq!(noise.snr_db(), None);
    }

    #[test]
    fn test_invalid_snr_and_empty_signal_are_rejected() {
        let kernel = kernel();
        let mut generator = NoiseGenerator::new(5, 10000.0).unwrap();
        assert!(NoiseCalibrator::new(&kernel, f64::NAN)
            .calibrate(&tone(100), &mut generator)
            .is_err());
        assert!(NoiseCalibrator::new(&kernel, 10.0)
            .calibrate(&[], &mut generator)
            .is_err());
    }

    #[test]
    fn test_awgn_rejects_bandwidth_above_nyquist() {
        let buffer = SampleBuffer::new(vec![1000; 1000], 8000);
        let mut generator = NoiseGenerator::new(5, 10000.0).unwrap();
        let err = AwgnImpairment::new(4500.0, 10.0)
            .apply(&buffer, &EngineSettings::default(), &mut generator)
            .unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_awgn_keeps_length_of_input_shorter_than_filter() {
        let buffer = SampleBuffer::new(
            (0..100)
                .map(|i| (8000.0 * (2.0 * std::f64::consts::PI * 440.0 * i as f64 / 8000.0).sin()) as i32)
                .collect(),
            8000,
        );
        let settings = EngineSettings {
            silence: None,
            ..EngineSettings::default()
        };
        let mut generator = NoiseGenerator::new(3, 10000.0).unwrap();

        let outcome = AwgnImpairment::new(3000.0, 10.0)
            .apply(&buffer, &settings, &mut generator)
            .unwrap();

        assert_eq!(outcome.samples.len(), 100);
        assert!((outcome.stats.achieved_snr_db.unwrap() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_awgn_trims_silence_before_calibrating() {
        let mut samples = vec![0i32; 2000];
        samples.extend((0..8000).map(|i| {
            (8000.0 * (2.0 * std::f64::consts::PI * 440.0 * i as f64 / 8000.0).sin()) as i32
        }));
        let buffer = SampleBuffer::new(samples, 8000);
        let mut generator = NoiseGenerator::new(11, 10000.0).unwrap();

        let outcome = AwgnImpairment::new(3000.0, 10.0)
            .apply(&buffer, &EngineSettings::default(), &mut generator)
            .unwrap();

        assert_eq!(outcome.stats.silence_intervals.len(), 1);
        let removed = outcome.stats.silence_intervals[0].duration;
        assert!(removed > 1800 && removed <= 2000 + 124);
        assert_eq!(outcome.samples.len(), buffer.len() - removed);
        assert!((outcome.stats.achieved_snr_db.unwrap() - 10.0).abs() < 1e-6);
    }
}
