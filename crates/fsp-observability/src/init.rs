// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output always; per-crate JSON log files with retention when a log
//! directory is configured.

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use std::path::{Path, PathBuf};
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::{crate_target, KNOWN_CRATES};

const RUN_PREFIX: &str = "run_";
const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const COMBINED_LOG_FILE: &str = "combined.log";

pub const DEFAULT_RETENTION_DAYS: u64 = 30;
pub const DEFAULT_RETENTION_RUNS: usize = 10;

/// Keeps the file writers alive; logs are flushed on drop
pub struct LoggingGuard {
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    run_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Folder of this run's log files, if file logging is on
    pub fn run_dir(&self) -> Option<&Path> {
        self.run_dir.as_deref()
    }
}

/// Install the global subscriber
///
/// With a `log_dir`, creates:
/// ```text
/// {log_dir}/
///   └── run_20250101_120000/
///       ├── fsp-stats.log
///       ├── fsp-pipeline.log
///       └── combined.log
/// ```
/// and removes runs older than `retention_days` or beyond the newest
/// `retention_runs`.
///
/// # Errors
///
/// Fails if the run folder cannot be created or a subscriber is already set.
pub fn init_logging(
    debug_flags: &CrateDebugFlags,
    log_dir: Option<PathBuf>,
    retention_days: Option<u64>,
    retention_runs: Option<usize>,
) -> Result<LoggingGuard> {
    let filter_string = debug_flags.to_filter_string();
    let env_filter = || {
        EnvFilter::try_new(&filter_string)
            .with_context(|| format!("Invalid log filter: {}", filter_string))
    };

    let mut layers = Vec::new();
    let mut file_guards = Vec::new();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(env_filter()?);
    layers.push(console_layer.boxed());

    let run_dir = match log_dir {
        Some(base_log_dir) => {
            let timestamp = Utc::now().format(RUN_TIMESTAMP_FORMAT);
            let run_folder = base_log_dir.join(format!("{}{}", RUN_PREFIX, timestamp));
            std::fs::create_dir_all(&run_folder).with_context(|| {
                format!("Failed to create log directory: {}", run_folder.display())
            })?;

            cleanup_old_logs(
                &base_log_dir,
                &run_folder,
                retention_days.unwrap_or(DEFAULT_RETENTION_DAYS),
                retention_runs.unwrap_or(DEFAULT_RETENTION_RUNS),
            )?;

            for crate_name in KNOWN_CRATES {
                let file_appender = rolling::never(&run_folder, format!("{}.log", crate_name));
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                file_guards.push(guard);

                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .json()
                    .with_filter(EnvFilter::new(format!("{}=debug", crate_target(crate_name))))
                    .boxed();
                layers.push(file_layer);
            }

            let combined_appender = rolling::never(&run_folder, COMBINED_LOG_FILE);
            let (combined_non_blocking, combined_guard) =
                tracing_appender::non_blocking(combined_appender);
            file_guards.push(combined_guard);

            let combined_layer = tracing_subscriber::fmt::layer()
                .with_writer(combined_non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(env_filter()?)
                .boxed();
            layers.push(combined_layer);

            Some(run_folder)
        }
        None => None,
    };

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    Ok(LoggingGuard {
        _file_guards: file_guards,
        run_dir,
    })
}

/// Console logging only
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    init_logging(debug_flags, None, None, None)
}

fn run_timestamp(path: &Path) -> Option<NaiveDateTime> {
    let name = path.file_name()?.to_str()?;
    let timestamp = name.strip_prefix(RUN_PREFIX)?;
    NaiveDateTime::parse_from_str(timestamp, RUN_TIMESTAMP_FORMAT).ok()
}

/// Remove run folders past the retention policy, never the current one
fn cleanup_old_logs(
    base_log_dir: &Path,
    current_run: &Path,
    retention_days: u64,
    retention_runs: usize,
) -> Result<()> {
    // Ages beyond chrono's range expire nothing
    let cutoff = i64::try_from(retention_days)
        .ok()
        .and_then(chrono::Duration::try_days)
        .and_then(|age| Utc::now().naive_utc().checked_sub_signed(age))
        .unwrap_or(NaiveDateTime::MIN);

    let mut runs: Vec<(PathBuf, NaiveDateTime)> = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)
        .with_context(|| format!("Failed to list log directory: {}", base_log_dir.display()))?
    {
        let path = entry?.path();
        if !path.is_dir() || path == current_run {
            continue;
        }
        if let Some(timestamp) = run_timestamp(&path) {
            runs.push((path, timestamp));
        }
    }

    // Newest first
    runs.sort_by(|a, b| b.1.cmp(&a.1));

    // The current run takes one of the retained slots
    let keep = retention_runs.saturating_sub(1);
    for (index, (path, timestamp)) in runs.iter().enumerate() {
        if index >= keep || *timestamp < cutoff {
            if let Err(e) = std::fs::remove_dir_all(path) {
                eprintln!(
                    "Warning: Failed to remove old log directory {}: {}",
                    path.display(),
                    e
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_run(base: &Path, timestamp: NaiveDateTime) -> PathBuf {
        let path = base.join(format!(
            "{}{}",
            RUN_PREFIX,
            timestamp.format(RUN_TIMESTAMP_FORMAT)
        ));
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    #[test]
    fn test_cleanup_keeps_newest_runs() {
        let dir = tempdir().unwrap();
        let now = Utc::now().naive_utc();
        let current = make_run(dir.path(), now);
        let runs: Vec<PathBuf> = (1..=4)
            .map(|hours| make_run(dir.path(), now - chrono::Duration::hours(hours)))
            .collect();

        cleanup_old_logs(dir.path(), &current, 30, 3).unwrap();

        assert!(current.exists());
        assert!(runs[0].exists());
        assert!(runs[1].exists());
        assert!(!runs[2].exists());
        assert!(!runs[3].exists());
    }

    #[test]
    fn test_cleanup_removes_expired_runs() {
        let dir = tempdir().unwrap();
        let now = Utc::now().naive_utc();
        let current = make_run(dir.path(), now);
        let expired = make_run(dir.path(), now - chrono::Duration::days(40));
        let unrelated = dir.path().join("notes");
        std::fs::create_dir_all(&unrelated).unwrap();

        cleanup_old_logs(dir.path(), &current, 30, 10).unwrap();

        assert!(!expired.exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn test_cleanup_with_unbounded_retention_days() {
        let dir = tempdir().unwrap();
        let now = Utc::now().naive_utc();
        let current = make_run(dir.path(), now);
        let old = make_run(dir.path(), now - chrono::Duration::days(4000));

        cleanup_old_logs(dir.path(), &current, u64::MAX, 10).unwrap();

        assert!(old.exists());
    }

    #[test]
    fn test_run_timestamp() {
        assert!(run_timestamp(Path::new("/logs/run_20250101_120000")).is_some());
        assert!(run_timestamp(Path::new("/logs/run_latest")).is_none());
        assert!(run_timestamp(Path::new("/logs/20250101_120000")).is_none());
    }
}
