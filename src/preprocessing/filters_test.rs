// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-channel-impairment project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use super::filters::{convolve, ConvolutionMode, Filter, FilterKernel, FirLowpassDesigner};
use crate::error::ImpairmentError;

#[cfg(test)]
mod tests {
    use super::*;

    // RMS of the steady-state part of a filtered sine
    fn filtered_rms(kernel: &FilterKernel, freq: f64, sample_rate: u32) -> f64 {
        let num_samples = 4000;
        let test_signal: Vec<f64> = (0..num_samples)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                (2.0 * std::f64::consts::PI * freq * t).sin()
            })
            .collect();
        let filtered = kernel.filter(&test_signal, ConvolutionMode::Valid);
        let squared_sum: f64 = filtered.iter().map(|&x| x * x).sum();
        (squared_sum / filtered.len() as f64).sqrt()
    }

    #[test]
    fn test_kernel_has_unity_dc_gain() {
        let pairs = [
            (3000.0, 8000),
            (300.0, 8000),
            (1.0, 8000),
            (3999.0, 8000),
            (2400.0, 44100),
            (12000.0, 48000),
        ];
        for &(edge, rate) in &pairs {
            let kernel = FirLowpassDesigner::new(edge)
                .with_sample_rate(rate)
                .design()
                .unwrap();
            assert_eq!(kernel.len(), 250);
            let sum: f64 = kernel.coefficients().iter().sum();
            assert!(
                (sum - 1.0).abs() < 1e-9,
                "sum {} for edge {} Hz at {} Hz",
                sum,
                edge,
                rate
            );
        }
    }

    #[test]
    fn test_kernel_is_symmetric() {
        let kernel = FirLowpassDesigner::new(1000.0)
            .with_sample_rate(8000)
            .design()
            .unwrap();
        let c = kernel.coefficients();
        for i in 0..c.len() / 2 {
            assert!((c[i] - c[c.len() - 1 - i]).abs() < 1e-15);
        }
    }

    #[test]
    fn test_edge_outside_nyquist_is_rejected() {
        for &edge in &[0.0, -100.0, 4000.0, 5000.0, f64::NAN] {
            let result = FirLowpassDesigner::new(edge).with_sample_rate(8000).design();
            match result {
                Err(err @ ImpairmentError::Parameter(_)) => assert_eq!(err.exit_code(), 4),
                other => panic!("edge {} should fail, got {:?}", edge, other),
            }
        }
    }

    #[test]
    fn test_custom_tap_count() {
        let kernel = FirLowpassDesigner::new(1000.0)
            .with_sample_rate(8000)
            .with_tap_count(31)
            .design()
            .unwrap();
        assert_eq!(kernel.len(), 31);
        assert!(FirLowpassDesigner::new(1000.0)
            .with_sample_rate(8000)
            .with_tap_count(2)
            .design()
            .is_err());
    }

    #[test]
    fn test_lowpass_frequency_response() {
        let sample_rate = 8000;
        let kernel = FirLowpassDesigner::new(1000.0)
            .with_sample_rate(sample_rate)
            .design()
            .unwrap();

        let pass = filtered_rms(&kernel, 300.0, sample_rate);
        let stop = filtered_rms(&kernel, 2500.0, sample_rate);

        // A unit sine has RMS 1/sqrt(2)
        assert!((pass - std::f64::consts::FRAC_1_SQRT_2).abs() < 0.01);
        assert!(stop < 0.01, "stop band RMS {} should be attenuated", stop);
    }

    #[test]
    fn test_convolution_lengths() {
        let signal = vec![1.0; 10];
        let kernel = vec![0.25; 4];
        assert_eq!(convolve(&signal, &kernel, ConvolutionMode::Full).len(), 13);
        assert_eq!(convolve(&signal, &kernel, ConvolutionMode::Same).len(), 10);
        assert_eq!(convolve(&signal, &kernel, ConvolutionMode::Valid).len(), 7);
        assert!(convolve(&kernel, &signal, ConvolutionMode::Valid).is_empty());
        assert!(convolve(&[], &kernel, ConvolutionMode::Full).is_empty());
    }

    #[test]
    fn test_same_mode_keeps_signal_length_with_longer_kernel() {
        let signal = [1.0, 2.0, 3.0];
        let kernel = [0.0, 0.0, 1.0, 0.0, 0.0];
        assert_eq!(
            convolve(&signal, &kernel, ConvolutionMode::Same),
            vec![1.0, 2.0, 3.0]
        );

        let kernel = FirLowpassDesigner::new(3000.0)
            .with_sample_rate(8000)
            .with_tap_count(250)
            .design()
            .unwrap();
        assert_eq!(kernel.filter(&[1000.0; 100], ConvolutionMode::Same).len(), 100);
    }

    #[test]
    fn test_convolution_values() {
        let signal = [1.0, 2.0, 3.0];
        let kernel = [0.0, 1.0, 0.5];
        assert_eq!(
            convolve(&signal, &kernel, ConvolutionMode::Full),
            vec![0.0, 1.0, 2.5, 4.0, 1.5]
        );
        assert_eq!(
            convolve(&signal, &kernel, ConvolutionMode::Same),
            vec![1.0, 2.5, 4.0]
        );
        assert_eq!(
            convolve(&signal, &kernel, ConvolutionMode::Valid),
            vec![2.5]
        );
    }

    #[test]
    fn test_valid_mode_of_extended_draw_matches_signal_length() {
        let kernel = FirLowpassDesigner::new(3000.0)
            .with_sample_rate(8000)
            .design()
            .unwrap();
        let signal_len = 1234;
        let draw = vec![1.0; signal_len + kernel.len() - 1];
        assert_eq!(
            kernel.filter(&draw, ConvolutionMode::Valid).len(),
            signal_len
        );
    }

    #[test]
    fn test_filter_trait_keeps_length_and_dc() {
        let kernel = FirLowpassDesigner::new(3000.0)
            .with_sample_rate(8000)
            .design()
            .unwrap();
        let signal = vec![10000.0; 2000];
        let filtered = kernel.apply(&signal);
        assert_eq!(filtered.len(), signal.len());
        // Fully overlapped region reproduces DC exactly
        assert!((filtered[1000] - 10000.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_sum_coefficients_are_rejected() {
        assert!(FilterKernel::from_coefficients(vec![1.0, -1.0]).is_err());
        assert!(FilterKernel::from_coefficients(Vec::new()).is_err());
    }
}
