// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-channel-impairment project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Energy measurement in dB
//!
//! Aggregate energy is `10·log10(Σ x²)`. A buffer with no energy measures
//! `-inf` dB, which is carried as [`EnergyLevel::SILENT`] and never as NaN.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;

/// Logarithmic energy in dB
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct EnergyLevel(f64);

impl EnergyLevel {
    /// Energy of an all-zero or empty buffer
    pub const SILENT: EnergyLevel = EnergyLevel(f64::NEG_INFINITY);

    pub fn from_db(db: f64) -> Self {
        Self(db)
    }

    /// Level of a linear energy (sum of squares). Non-positive or NaN input is silent.
    pub fn from_linear(energy: f64) -> Self {
        if energy > 0.0 {
            Self(10.0 * energy.log10())
        } else {
            Self::SILENT
        }
    }

    pub fn db(self) -> f64 {
        self.0
    }

    /// Linear energy this level stands for
    pub fn linear(self) -> f64 {
        if self.is_silent() {
            0.0
        } else {
            10f64.powf(self.0 / 10.0)
        }
    }

    pub fn is_silent(self) -> bool {
        self.0 == f64::NEG_INFINITY
    }
}

impl Sub for EnergyLevel {
    type Output = f64;

    /// Level difference in dB. Two silent levels differ by 0 dB.
    fn sub(self, rhs: EnergyLevel) -> f64 {
        if self.is_silent() && rhs.is_silent() {
            0.0
        } else {
            self.0 - rhs.0
        }
    }
}

impl fmt::Display for EnergyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_silent() {
            write!(f, "-inf dB")
        } else {
            write!(f, "{:.1} dB", self.0)
        }
    }
}

/// Aggregate energy of a floating-point buffer
pub fn energy(samples: &[f64]) -> EnergyLevel {
    EnergyLevel::from_linear(samples.iter().map(|&s| s * s).sum())
}

/// Aggregate energy of an integer buffer.
///
/// Squares are accumulated in `u128`, which holds full-scale 32-bit samples
/// for any buffer that fits in memory.
pub fn energy_i32(samples: &[i32]) -> EnergyLevel {
    let total: u128 = samples
        .iter()
        .map(|&s| {
            let m = s.unsigned_abs() as u128;
            m * m
        })
        .sum();
    EnergyLevel::from_linear(total as f64)
}

/// Average per-sample energy: aggregate energy minus `10·log10(n)`
pub fn average_instantaneous_energy(samples: &[f64]) -> EnergyLevel {
    if samples.is_empty() {
        return EnergyLevel::SILENT;
    }
    let total = energy(samples);
    if total.is_silent() {
        return total;
    }
    EnergyLevel::from_db(total.db() - 10.0 * (samples.len() as f64).log10())
}

/// Energy of a single sample, `10·log10(x²)`
pub fn instantaneous_energy(sample: f64) -> EnergyLevel {
    EnergyLevel::from_linear(sample * sample)
}

/// Signal-to-noise ratio in dB between two measured levels.
///
/// Returns `None` when the ratio is undefined (no noise, or no signal).
pub fn snr_db(signal: EnergyLevel, noise: EnergyLevel) -> Option<f64> {
    if signal.is_silent() || noise.is_silent() {
        None
    } else {
        Some(signal - noise)
    }
}
