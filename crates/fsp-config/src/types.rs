// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to one section of `fs_pipeline.toml`. Every field has a
//! default, so a partial file is valid.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Log levels accepted by `logging.level`
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// `recon-all` directives accepted by `recon.directive`
pub const RECON_DIRECTIVES: &[&str] = &[
    "all",
    "autorecon1",
    "autorecon2",
    "autorecon2-volonly",
    "autorecon2-perhemi",
    "autorecon2-inflate1",
    "autorecon2-cp",
    "autorecon2-wm",
    "autorecon3",
    "autorecon3-T2pial",
    "autorecon-pial",
    "localGI",
    "qcache",
];

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FspConfig {
    pub paths: PathsConfig,
    pub recon: ReconConfig,
    pub hsfs: HsfsConfig,
    pub segstats: SegStatsConfig,
    pub logging: LoggingConfig,
    pub execution: ExecutionConfig,
}

/// Input, output and installation directories
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// FreeSurfer `SUBJECTS_DIR`; outputs land here
    pub subjects_dir: PathBuf,
    /// One subdirectory per subject holding `*T1*.nii.gz` / `*T2*.nii.gz`
    pub scans_dir: PathBuf,
    pub work_dir: PathBuf,
    pub freesurfer_home: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            subjects_dir: PathBuf::new(),
            scans_dir: PathBuf::new(),
            work_dir: PathBuf::from("./work"),
            freesurfer_home: PathBuf::from("/opt/freesurfer"),
        }
    }
}

impl PathsConfig {
    /// # Errors
    ///
    /// `ConfigError::MissingRequired` when unset.
    pub fn subjects_dir(&self) -> ConfigResult<&Path> {
        required_path(&self.subjects_dir, "paths.subjects_dir")
    }

    /// # Errors
    ///
    /// `ConfigError::MissingRequired` when unset.
    pub fn scans_dir(&self) -> ConfigResult<&Path> {
        required_path(&self.scans_dir, "paths.scans_dir")
    }
}

fn required_path<'a>(path: &'a Path, field: &str) -> ConfigResult<&'a Path> {
    if path.as_os_str().is_empty() {
        Err(ConfigError::MissingRequired(field.to_string()))
    } else {
        Ok(path)
    }
}

/// `recon-all` invocation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconConfig {
    pub directive: String,
    pub openmp_threads: usize,
    /// Pass the T2 scan and `-T2pial` for pial surface refinement
    pub use_t2: bool,
    pub extra_flags: Vec<String>,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            directive: "all".to_string(),
            openmp_threads: 1,
            use_t2: false,
            extra_flags: vec!["-time".to_string()],
        }
    }
}

/// Hippocampal subfield passes
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HsfsConfig {
    pub t1: bool,
    pub t2: bool,
    pub t1t2: bool,
    /// Parse `?h.hippoSfVolumes*` even when no pass runs
    pub parse: bool,
}

impl HsfsConfig {
    pub fn any_enabled(&self) -> bool {
        self.t1 || self.t2 || self.t1t2
    }

    /// Whether aggregation should include subfield volumes
    pub fn parse_results(&self) -> bool {
        self.parse || self.any_enabled()
    }

    pub fn needs_t2(&self) -> bool {
        self.t2 || self.t1t2
    }
}

/// Extra `mri_segstats` summary
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SegStatsConfig {
    pub enabled: bool,
    pub segment_ids: Vec<u32>,
    /// Written into the subject's `stats` directory
    pub summary_file: String,
}

impl Default for SegStatsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            segment_ids: vec![41, 2, 42, 3, 77],
            summary_file: "wmgm.aseg.stats".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// JSON log files are written below this directory when set
    pub log_dir: Option<PathBuf>,
    pub retention_days: u64,
    pub retention_runs: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            retention_days: 30,
            retention_runs: 10,
        }
    }
}

impl LoggingConfig {
    /// Normalized log level
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` for anything outside [`LOG_LEVELS`].
    pub fn level(&self) -> ConfigResult<String> {
        let level = self.level.trim().to_lowercase();
        let level = if level == "warning" {
            "warn".to_string()
        } else {
            level
        };
        if LOG_LEVELS.contains(&level.as_str()) {
            Ok(level)
        } else {
            Err(ConfigError::InvalidValue(format!(
                "logging.level = '{}' (expected one of {})",
                self.level,
                LOG_LEVELS.join(", ")
            )))
        }
    }
}

/// Runner behavior
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Log commands instead of running them
    pub dry_run: bool,
    pub stop_on_first_failure: bool,
    /// Explicit subject list; empty means every directory in `paths.scans_dir`
    pub subjects: Vec<String>,
}
