// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-channel-impairment project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Peak normalisation to 16-bit full scale

use crate::acquisition::FULL_SCALE_I16;

/// Largest magnitude in the buffer, `max(max, -min)`.
///
/// Returns 0.0 for an empty buffer.
pub fn peak_magnitude(samples: &[f64]) -> f64 {
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    if samples.is_empty() {
        0.0
    } else {
        max.max(-min)
    }
}

/// Scale `samples` so the peak lands exactly on ±32767 and convert to `i16`.
///
/// A buffer with no finite non-zero peak is returned as zeros.
pub fn normalize_to_i16(samples: &[f64]) -> Vec<i16> {
    let peak = peak_magnitude(samples);
    if !(peak.is_finite() && peak > 0.0) {
        return vec![0; samples.len()];
    }
    let ratio = FULL_SCALE_I16 / peak;
    samples
        .iter()
        .map(|&s| (s * ratio).round().clamp(-FULL_SCALE_I16, FULL_SCALE_I16) as i16)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_peak_maps_to_full_scale() {
        let out = normalize_to_i16(&[0.5, -0.25, 0.1]);
        assert_eq!(out[0], i16::MAX);
        assert_eq!(out.iter().map(|s| s.unsigned_abs()).max(), Some(32767));
    }

    #[test]
    fn test_negative_peak_maps_to_negative_full_scale() {
        let out = normalize_to_i16(&[100.0, -400.0, 300.0]);
        assert_eq!(out, vec![8192, -32767, 24575]);
    }

    #[test]
    fn test_wide_integer_input_is_scaled_down() {
        let combined = [70000.0, -14000.0, 0.0];
        let out = normalize_to_i16(&combined);
        assert_eq!(out, vec![32767, -6553, 0]);
    }

    #[test]
    fn test_zero_buffer_stays_zero() {
        assert_eq!(normalize_to_i16(&[0.0; 4]), vec![0; 4]);
        assert!(normalize_to_i16(&[]).is_empty());
        assert_eq!(peak_magnitude(&[]), 0.0);
    }
}
