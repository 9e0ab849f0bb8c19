// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-channel-impairment project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Output directory allocation
//!
//! Each run without an explicit output path gets a fresh `<prefix><n>` directory.
//! `create_dir` fails atomically when the name is taken, so the first `n` it
//! succeeds for is ours even if another run races for the same names.

use crate::error::{ImpairmentError, Result};
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Create the first free `<base>/<prefix><n>` directory, `n` counting from 1.
///
/// # Errors
///
/// [`ImpairmentError::Io`] if all `max_attempts` names are taken or the
/// directory cannot be created for any other reason.
pub fn allocate_run_directory(base: &Path, prefix: &str, max_attempts: u32) -> Result<PathBuf> {
    for run_number in 1..=max_attempts {
        let candidate = base.join(format!("{}{}", prefix, run_number));
        match fs::create_dir(&candidate) {
            Ok(()) => {
                debug!("Made directory {:?}", candidate);
                return Ok(candidate);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("{:?} exists", candidate);
            }
            Err(e) => {
                return Err(ImpairmentError::io(
                    format!("Unable to create run directory {:?}", candidate),
                    e,
                ));
            }
        }
    }

    Err(ImpairmentError::io(
        format!(
            "No free run directory under {:?} after {} attempts",
            base, max_attempts
        ),
        std::io::Error::new(ErrorKind::AlreadyExists, "run directory names exhausted"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_first_directory_is_run1() {
        let base = tempdir().unwrap();
        let dir = allocate_run_directory(base.path(), "run", 10).unwrap();
        assert_eq!(dir, base.path().join("run1"));
        assert!(dir.is_dir());
    }

    #[test]
    fn test_existing_names_are_skipped() {
        let base = tempdir().unwrap();
        fs::create_dir(base.path().join("run1")).unwrap();
        fs::create_dir(base.path().join("run2")).unwrap();

        let dir = allocate_run_directory(base.path(), "run", 10).unwrap();
        assert_eq!(dir, base.path().join("run3"));

        let next = allocate_run_directory(base.path(), "run", 10).unwrap();
        assert_eq!(next, base.path().join("run4"));
    }

    #[test]
    fn test_gives_up_after_bound() {
        let base = tempdir().unwrap();
        for n in 1..=3 {
            fs::create_dir(base.path().join(format!("run{}", n))).unwrap();
        }
        let err = allocate_run_directory(base.path(), "run", 3).unwrap_err();
        assert!(matches!(err, ImpairmentError::Io { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_missing_base_is_io_error() {
        let base = tempdir().unwrap();
        let missing = base.path().join("does").join("not").join("exist");
        assert!(allocate_run_directory(&missing, "run", 5).is_err());
    }
}
