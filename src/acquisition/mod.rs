// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-channel-impairment project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Audio acquisition module
//!
//! This module reads the recording under test from a WAV file and writes the
//! impaired result back. The engine itself only sees a [`SampleBuffer`].

use crate::error::{ImpairmentError, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{debug, warn};
use std::path::Path;

/// Full-scale magnitude of the 16-bit output format
pub const FULL_SCALE_I16: f64 = i16::MAX as f64;

/// Mono sample sequence plus the sample rate it was recorded at
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    /// Signed integer samples, widened to 32 bits
    pub samples: Vec<i32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(samples: Vec<i32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration of the buffer in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Samples as floating point values, same scale
    pub fn as_f64(&self) -> Vec<f64> {
        self.samples.iter().map(|&s| s as f64).collect()
    }
}

/// Reads and writes sample containers
#[cfg_attr(test, mockall::automock)]
pub trait AudioCodec {
    /// Read a mono sample buffer from `path`
    fn read(&self, path: &Path) -> Result<SampleBuffer>;

    /// Write 16-bit mono samples at `sample_rate` to `path`
    fn write(&self, path: &Path, sample_rate: u32, samples: &[i16]) -> Result<()>;
}

/// WAV codec backed by hound
#[derive(Debug, Default, Clone, Copy)]
pub struct WavCodec;

impl WavCodec {
    pub fn new() -> Self {
        Self
    }
}

fn input_error(path: &Path, source: hound::Error) -> ImpairmentError {
    ImpairmentError::InputAudio {
        path: path.to_path_buf(),
        source,
    }
}

fn output_error(path: &Path, err: hound::Error) -> ImpairmentError {
    let context = format!("Unable to write audio file {:?}", path);
    match err {
        hound::Error::IoError(source) => ImpairmentError::io(context, source),
        other => ImpairmentError::io(context, std::io::Error::other(other)),
    }
}

impl AudioCodec for WavCodec {
    fn read(&self, path: &Path) -> Result<SampleBuffer> {
        let mut reader = WavReader::open(path).map_err(|e| input_error(path, e))?;
        let spec = reader.spec();
        debug!(
            "WAV {:?}: {} Hz, {} bits, {} channel(s), {:?}",
            path, spec.sample_rate, spec.bits_per_sample, spec.channels, spec.sample_format
        );

        let interleaved: Vec<i32> = match spec.sample_format {
            SampleFormat::Int => reader
                .samples::<i32>()
                .collect::<std::result::Result<Vec<i32>, _>>()
                .map_err(|e| input_error(path, e))?,
            SampleFormat::Float => reader
                .samples::<f32>()
                .map(|s| s.map(|v| (v as f64 * FULL_SCALE_I16).round() as i32))
                .collect::<std::result::Result<Vec<i32>, _>>()
                .map_err(|e| input_error(path, e))?,
        };

        let channels = spec.channels.max(1) as usize;
        if channels > 1 {
            warn!("Input has {} channels, keeping channel 0 only", channels);
        }
        let samples = interleaved.into_iter().step_by(channels).collect();

        Ok(SampleBuffer::new(samples, spec.sample_rate))
    }

    fn write(&self, path: &Path, sample_rate: u32, samples: &[i16]) -> Result<()> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut writer = WavWriter::create(path, spec).map_err(|e| output_error(path, e))?;
        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| output_error(path, e))?;
        }
        writer.finalize().map_err(|e| output_error(path, e))?;

        debug!("Wrote {} samples to {:?}", samples.len(), path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_fixture(path: &Path, channels: u16, samples: &[i16]) {
        let spec = WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_read_mono_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        write_fixture(&path, 1, &[1, -2, 3, -4]);

        let buffer = WavCodec::new().read(&path).unwrap();
        assert_eq!(buffer.sample_rate, 8000);
        assert_eq!(buffer.samples, vec![1, -2, 3, -4]);
    }

    #[test]
    fn test_stereo_is_coerced_to_first_channel() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_fixture(&path, 2, &[10, -10, 20, -20, 30, -30]);

        let buffer = WavCodec::new().read(&path).unwrap();
        assert_eq!(buffer.samples, vec![10, 20, 30]);
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let dir = tempdir().unwrap();
        let err = WavCodec::new()
            .read(&dir.path().join("absent.wav"))
            .unwrap_err();
        assert!(matches!(err, ImpairmentError::InputAudio { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_write_then_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let codec = WavCodec::new();
        codec.write(&path, 11025, &[i16::MAX, 0, i16::MIN + 1]).unwrap();

        let buffer = codec.read(&path).unwrap();
        assert_eq!(buffer.sample_rate, 11025);
        assert_eq!(buffer.samples, vec![32767, 0, -32767]);
        assert!((buffer.duration() - 3.0 / 11025.0).abs() < 1e-12);
    }
}
