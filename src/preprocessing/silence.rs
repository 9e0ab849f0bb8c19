// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-channel-impairment project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Silence detection and removal
//!
//! Dead air in a recording would drag the measured signal energy down and make
//! the injected noise too weak. [`SilenceSegmenter`] scans the instantaneous
//! energy with two thresholds below the average level:
//!
//! ```text
//! hi = E - high_margin_db   (leave Silent when x² rises above it)
//! lo = E - low_margin_db    (enter Silent when x² drops below it)
//! ```
//!
//! With `high_margin_db < low_margin_db` the detector has a dead band between
//! `lo` and `hi` and does not chatter on samples near a single threshold.
//! Comparisons are made on `x²` in linear units so a zero sample needs no log.
//! [`trim`] then cuts the detected intervals out of the buffer.

use super::energy::EnergyLevel;
use log::debug;
use serde::{Deserialize, Serialize};

/// Detector state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmenterState {
    Active,
    Silent,
}

/// Half-open run `[start, end)` of silent samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SilenceInterval {
    pub start: usize,
    pub end: usize,
    pub duration: usize,
}

impl SilenceInterval {
    /// An `end` before `start` gives an empty interval
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
            duration: end.saturating_sub(start),
        }
    }
}

/// Hysteresis silence detector
#[derive(Debug, Clone)]
pub struct SilenceSegmenter {
    initial_state: SegmenterState,
    high_margin_db: f64,
    low_margin_db: f64,
    min_duration_samples: usize,
}

impl SilenceSegmenter {
    /// Detector requiring at least `min_duration_seconds` of silence at `sample_rate`.
    ///
    /// Starts `Active` with 3 dB / 20 dB margins.
    pub fn new(sample_rate: u32, min_duration_seconds: f64) -> Self {
        let min_duration_samples = (min_duration_seconds.max(0.0) * sample_rate as f64).round();
        Self {
            initial_state: SegmenterState::Active,
            high_margin_db: 3.0,
            low_margin_db: 20.0,
            min_duration_samples: min_duration_samples as usize,
        }
    }

    pub fn with_initial_state(mut self, state: SegmenterState) -> Self {
        self.initial_state = state;
        self
    }

    /// Set the rising (`high`) and falling (`low`) margins below the reference level
    pub fn with_margins(mut self, high_margin_db: f64, low_margin_db: f64) -> Self {
        self.high_margin_db = high_margin_db;
        self.low_margin_db = low_margin_db;
        self
    }

    pub fn min_duration_samples(&self) -> usize {
        self.min_duration_samples
    }

    /// Scan `samples` against the reference level and return qualifying silences
    /// in increasing start order.
    pub fn find(&self, samples: &[f64], reference: EnergyLevel) -> Vec<SilenceInterval> {
        if reference.is_silent() || samples.is_empty() {
            return Vec::new();
        }

        let hi = EnergyLevel::from_db(reference.db() - self.high_margin_db).linear();
        let lo = EnergyLevel::from_db(reference.db() - self.low_margin_db).linear();
        debug!(
            "Silence thresholds: hi = {:.1} dB, lo = {:.1} dB, min {} samples",
            reference.db() - self.high_margin_db,
            reference.db() - self.low_margin_db,
            self.min_duration_samples
        );

        let mut intervals = Vec::new();
        let mut state = self.initial_state;
        let mut start = 0usize;

        for (index, &sample) in samples.iter().enumerate() {
            let inst = sample * sample;
            match state {
                SegmenterState::Active => {
                    if inst < lo {
                        start = index;
                        state = SegmenterState::Silent;
                    }
                }
                SegmenterState::Silent => {
                    if inst > hi {
                        self.close(start, index, &mut intervals);
                        state = SegmenterState::Active;
                    }
                }
            }
        }

        if state == SegmenterState::Silent {
            self.close(start, samples.len(), &mut intervals);
        }

        intervals
    }

    fn close(&self, start: usize, end: usize, intervals: &mut Vec<SilenceInterval>) {
        let duration = end - start;
        if duration > 0 && duration >= self.min_duration_samples {
            debug!(
                "Found silence from {} to {} ({} samples)",
                start, end, duration
            );
            intervals.push(SilenceInterval::new(start, end));
        }
    }
}

/// Copy of `samples` with every interval removed.
///
/// Intervals must be sorted by start; any part of an interval that overlaps
/// an earlier one or runs past the end of the buffer is ignored.
pub fn trim<T: Copy>(samples: &[T], intervals: &[SilenceInterval]) -> Vec<T> {
    if intervals.is_empty() {
        return samples.to_vec();
    }

    let removed: usize = intervals.iter().map(|i| i.duration).sum();
    let mut trimmed = Vec::with_capacity(samples.len().saturating_sub(removed));
    let mut cursor = 0usize;

    for interval in intervals {
        let start = interval.start.min(samples.len());
        if start > cursor {
            trimmed.extend_from_slice(&samples[cursor..start]);
        }
        cursor = cursor.max(interval.end.min(samples.len()));
    }
    trimmed.extend_from_slice(&samples[cursor..]);

    debug!(
        "Removed {} silent section(s), {} -> {} samples",
        intervals.len(),
        samples.len(),
        trimmed.len()
    );
    trimmed
}
