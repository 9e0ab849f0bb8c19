//! Rust channel impairment library
//!
//! This library degrades recorded modem audio in controlled ways (band-limited
//! Gaussian noise at a calibrated SNR, sinusoidal fading, and a time-varying
//! multipath echo) so that a modem's performance can be measured against
//! a known channel.

pub mod acquisition;
pub mod config;
pub mod error;
pub mod impairment;
pub mod preprocessing;
pub mod processing;
pub mod utility;

pub use acquisition::{AudioCodec, SampleBuffer, WavCodec};
pub use error::{ImpairmentError, Result};
pub use impairment::{EngineSettings, Impairment, ImpairmentOutcome};
pub use processing::{run, OutputTarget, RunReport};
