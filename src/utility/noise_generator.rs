// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-channel-impairment project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Gaussian Noise Generator
//!
//! White Gaussian noise source used to build the additive channel noise.
//! The raw draw only needs a plausible scale: the calibrator measures what
//! it actually got and corrects the level afterwards.
//!
//! ## Examples
//!
//! ```rust
//! use rust_channel_impairment::utility::noise_generator::NoiseGenerator;
//!
//! // Reproducible generator with a fixed seed and a standard deviation of 10000
//! let mut generator = NoiseGenerator::new(12345, 10000.0).unwrap();
//! let samples = generator.generate_mono(8000);
//! assert_eq!(samples.len(), 8000);
//! ```

use crate::error::{ImpairmentError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;

/// Standard deviation of the raw noise draw
pub const DEFAULT_REFERENCE_SIGMA: f64 = 10000.0;

/// Zero-mean white Gaussian noise source
pub struct NoiseGenerator {
    rng: StdRng,
    distribution: Normal<f64>,
}

impl NoiseGenerator {
    /// Creates a generator with a fixed seed.
    ///
    /// Using the same seed and sigma produces the same sequence of samples.
    ///
    /// # Errors
    ///
    /// Returns [`ImpairmentError::Parameter`] if `sigma` is negative or not finite.
    pub fn new(seed: u64, sigma: f64) -> Result<Self> {
        Self::with_rng(StdRng::seed_from_u64(seed), sigma)
    }

    /// Creates a generator seeded from operating system entropy
    pub fn new_from_entropy(sigma: f64) -> Result<Self> {
        Self::with_rng(StdRng::from_os_rng(), sigma)
    }

    /// Seeded when `seed` is given, entropy otherwise
    pub fn from_optional_seed(seed: Option<u64>, sigma: f64) -> Result<Self> {
        match seed {
            Some(seed) => Self::new(seed, sigma),
            None => Self::new_from_entropy(sigma),
        }
    }

    fn with_rng(rng: StdRng, sigma: f64) -> Result<Self> {
        let distribution = Normal::new(0.0, sigma).map_err(|e| {
            ImpairmentError::Parameter(format!("invalid noise standard deviation {}: {}", sigma, e))
        })?;
        Ok(Self { rng, distribution })
    }

    /// Next Gaussian sample
    pub fn random_gaussian(&mut self) -> f64 {
        self.rng.sample(self.distribution)
    }

    /// Generates `num_samples` of mono Gaussian white noise
    pub fn generate_mono(&mut self, num_samples: usize) -> Vec<f64> {
        (0..num_samples).map(|_| self.random_gaussian()).collect()
    }
}
