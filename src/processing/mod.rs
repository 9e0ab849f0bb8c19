// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-channel-impairment project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Run orchestration
//!
//! A run reads the recording, applies one impairment, picks the output
//! location and writes the result. The output directory is only allocated
//! once the impairment succeeded, so a failed run leaves nothing behind.

use crate::acquisition::AudioCodec;
use crate::config::OutputConfig;
use crate::error::{ImpairmentError, Result};
use crate::impairment::{EngineSettings, Impairment, ImpairmentStats};
use crate::utility::run_directory::allocate_run_directory;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the impaired file goes
#[derive(Debug, Clone, PartialEq)]
pub enum OutputTarget {
    /// Exactly this path
    File(PathBuf),
    /// A fresh `<base>/<prefix><n>/` directory, file named after the impairment
    RunDirectory {
        base: PathBuf,
        prefix: String,
        max_attempts: u32,
    },
}

impl OutputTarget {
    /// Explicit path when given, otherwise a run directory per `output`
    pub fn from_args(explicit: Option<PathBuf>, output: &OutputConfig) -> Self {
        match explicit {
            Some(path) => OutputTarget::File(path),
            None => OutputTarget::RunDirectory {
                base: PathBuf::from(&output.base_directory),
                prefix: output.run_prefix.clone(),
                max_attempts: output.max_attempts,
            },
        }
    }

    fn resolve(&self, impairment: &Impairment) -> Result<PathBuf> {
        match self {
            OutputTarget::File(path) => Ok(path.clone()),
            OutputTarget::RunDirectory {
                base,
                prefix,
                max_attempts,
            } => {
                let dir = allocate_run_directory(base, prefix, *max_attempts)?;
                Ok(dir.join(impairment.output_file_name()))
            }
        }
    }

    /// Remove the run directory allocated for `output`; explicit files are left alone
    fn discard(&self, output: &Path) {
        if let OutputTarget::RunDirectory { .. } = self {
            if let Some(dir) = output.parent() {
                if let Err(e) = std::fs::remove_dir_all(dir) {
                    warn!("Unable to remove run directory {:?}: {}", dir, e);
                }
            }
        }
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub impairment: Impairment,
    pub input: PathBuf,
    pub output: PathBuf,
    pub sample_rate: u32,
    pub output_samples: usize,
    #[serde(flatten)]
    pub stats: ImpairmentStats,
    pub timestamp: DateTime<Utc>,
}

impl RunReport {
    /// Write the report as pretty JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            ImpairmentError::io("Failed to serialize run report", std::io::Error::other(e))
        })?;
        std::fs::write(path, json)
            .map_err(|e| ImpairmentError::io(format!("Failed to write report {:?}", path), e))
    }
}

/// Read `input`, impair it and write the result to `target`
pub fn run(
    codec: &dyn AudioCodec,
    input: &Path,
    target: &OutputTarget,
    impairment: &Impairment,
    settings: &EngineSettings,
) -> Result<RunReport> {
    let buffer = codec.read(input)?;
    info!(
        "Opened {:?}, sample rate {} Hz, {} samples",
        input,
        buffer.sample_rate,
        buffer.len()
    );

    let outcome = impairment.apply(&buffer, settings)?;

    let output = target.resolve(impairment)?;
    if let Err(err) = codec.write(&output, outcome.sample_rate, &outcome.samples) {
        target.discard(&output);
        return Err(err);
    }
    info!("Wrote file {:?}", output);

    Ok(RunReport {
        impairment: *impairment,
        input: input.to_path_buf(),
        output,
        sample_rate: outcome.sample_rate,
        output_samples: outcome.samples.len(),
        stats: outcome.stats,
        timestamp: Utc::now(),
    })
}
