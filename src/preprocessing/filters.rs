// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-channel-impairment project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! FIR low-pass filter design and convolution
//!
//! The designer follows the windowed-sinc method: an ideal low-pass impulse
//! response truncated to `tap_count` taps, tapered by a Hamming window, then
//! rescaled so the coefficients sum to one (0 dB gain at DC).

use crate::error::{ImpairmentError, Result};
use log::debug;
use std::f64::consts::PI;

/// Default FIR length
pub const DEFAULT_TAP_COUNT: usize = 250;

/// Trait for implementing digital filters
pub trait Filter: Send + Sync {
    /// Apply the filter to a signal and return the filtered signal
    fn apply(&self, signal: &[f64]) -> Vec<f64>;
}

/// Output length convention for [`convolve`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvolutionMode {
    /// `len(signal) + len(kernel) - 1` samples
    Full,
    /// `len(signal)` samples, starting `(len(kernel) - 1) / 2` into the full result
    Same,
    /// Only positions where kernel and signal overlap completely
    Valid,
}

/// Linear convolution of `signal` with `kernel`.
///
/// Returns an empty vector when either input is empty, or in
/// [`ConvolutionMode::Valid`] when the kernel is longer than the signal.
pub fn convolve(signal: &[f64], kernel: &[f64], mode: ConvolutionMode) -> Vec<f64> {
    let n = signal.len();
    let k = kernel.len();
    if n == 0 || k == 0 {
        return Vec::new();
    }

    let full_len = n + k - 1;
    let (offset, out_len) = match mode {
        ConvolutionMode::Full => (0, full_len),
        ConvolutionMode::Same => ((k - 1) / 2, n),
        ConvolutionMode::Valid => {
            if k > n {
                return Vec::new();
            }
            (k - 1, n - k + 1)
        }
    };

    (offset..offset + out_len)
        .map(|m| {
            // y[m] = sum_j h[j] * x[m - j], restricted to valid x indices
            let j_start = m.saturating_sub(n - 1);
            let j_end = m.min(k - 1);
            (j_start..=j_end)
                .map(|j| kernel[j] * signal[m - j])
                .sum::<f64>()
        })
        .collect()
}

/// Low-pass FIR coefficients with unity DC gain
#[derive(Debug, Clone, PartialEq)]
pub struct FilterKernel {
    coefficients: Vec<f64>,
}

impl FilterKernel {
    /// Build a kernel from raw coefficients, normalising them to sum to 1.0.
    pub fn from_coefficients(coefficients: Vec<f64>) -> Result<Self> {
        let sum: f64 = coefficients.iter().sum();
        if coefficients.is_empty() || !sum.is_finite() || sum.abs() < f64::EPSILON {
            return Err(ImpairmentError::Parameter(format!(
                "filter coefficients cannot be normalised (sum = {})",
                sum
            )));
        }
        Ok(Self {
            coefficients: coefficients.into_iter().map(|c| c / sum).collect(),
        })
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Filtered copy of `signal` with the requested output length convention
    pub fn filter(&self, signal: &[f64], mode: ConvolutionMode) -> Vec<f64> {
        convolve(signal, &self.coefficients, mode)
    }
}

impl Filter for FilterKernel {
    fn apply(&self, signal: &[f64]) -> Vec<f64> {
        self.filter(signal, ConvolutionMode::Same)
    }
}

/// Windowed-sinc low-pass designer
#[derive(Debug, Clone)]
pub struct FirLowpassDesigner {
    cutoff_freq: f64,
    sample_rate: u32,
    tap_count: usize,
}

impl FirLowpassDesigner {
    /// Create a designer for the given pass-band edge in Hz
    pub fn new(cutoff_freq: f64) -> Self {
        Self {
            cutoff_freq,
            sample_rate: 48000,
            tap_count: DEFAULT_TAP_COUNT,
        }
    }

    /// Set the sample rate for the filter
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the number of taps
    pub fn with_tap_count(mut self, tap_count: usize) -> Self {
        self.tap_count = tap_count;
        self
    }

    /// Design the kernel.
    ///
    /// Fails with [`ImpairmentError::Parameter`] unless the edge frequency lies
    /// strictly between 0 and the Nyquist frequency.
    pub fn design(&self) -> Result<FilterKernel> {
        let nyquist = self.sample_rate as f64 / 2.0;
        if !self.cutoff_freq.is_finite() || self.cutoff_freq <= 0.0 || self.cutoff_freq >= nyquist
        {
            return Err(ImpairmentError::Parameter(format!(
                "unable to generate filter at requested bandwidth {} Hz (sample rate {} Hz)",
                self.cutoff_freq, self.sample_rate
            )));
        }
        if self.tap_count < 3 {
            return Err(ImpairmentError::Parameter(format!(
                "filter needs at least 3 taps, got {}",
                self.tap_count
            )));
        }

        let cutoff = self.cutoff_freq / nyquist;
        let alpha = 0.5 * (self.tap_count - 1) as f64;
        let denom = (self.tap_count - 1) as f64;

        let coefficients: Vec<f64> = (0..self.tap_count)
            .map(|n| {
                let m = n as f64 - alpha;
                let window = 0.54 - 0.46 * (2.0 * PI * n as f64 / denom).cos();
                cutoff * sinc(cutoff * m) * window
            })
            .collect();

        let kernel = FilterKernel::from_coefficients(coefficients)?;
        debug!(
            "Designed {}-tap low-pass at {} Hz (fs = {} Hz)",
            kernel.len(),
            self.cutoff_freq,
            self.sample_rate
        );
        Ok(kernel)
    }
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}
