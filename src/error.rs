// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-channel-impairment project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Error types shared by the impairment engine and the command line tool
//!
//! Every variant is fatal: the run stops, nothing is written, and the process
//! exits with the code returned by [`ImpairmentError::exit_code`].

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, ImpairmentError>;

/// Fatal errors raised while simulating a channel
#[derive(Error, Debug)]
pub enum ImpairmentError {
    #[error("Unsupported configuration version {found} (this build understands up to {supported})")]
    UnsupportedRuntime { found: u32, supported: u32 },

    #[error("Wrong arguments: {0}")]
    Usage(String),

    #[error("Unable to open audio file {path:?}: {source}")]
    InputAudio {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid parameter: {0}")]
    Parameter(String),

    #[error("Configuration error: {0:#}")]
    Configuration(anyhow::Error),
}

impl ImpairmentError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ImpairmentError::UnsupportedRuntime { .. } => 1,
            ImpairmentError::Usage(_) => 2,
            ImpairmentError::InputAudio { .. } => 3,
            ImpairmentError::Io { .. } => 3,
            ImpairmentError::Parameter(_) => 4,
            ImpairmentError::Configuration(_) => 5,
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ImpairmentError::Io {
            context: context.into(),
            source,
        }
    }
}
