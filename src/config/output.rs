// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-channel-impairment project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Output location configuration

use serde::{Deserialize, Serialize};

/// Where runs without an explicit output path are written.
///
/// Each such run creates `<base_directory>/<run_prefix><n>/` with the first
/// free `n`, trying at most `max_attempts` names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_base_directory")]
    pub base_directory: String,

    #[serde(default = "default_run_prefix")]
    pub run_prefix: String,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_base_directory() -> String {
    ".".to_string()
}

fn default_run_prefix() -> String {
    "run".to_string()
}

fn default_max_attempts() -> u32 {
    10000
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_directory: default_base_directory(),
            run_prefix: default_run_prefix(),
            max_attempts: default_max_attempts(),
        }
    }
}
