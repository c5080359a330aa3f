// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! fs-pipeline - reconstruct subjects with FreeSurfer and export their stats
//!
//! Usage:
//!   fs-pipeline -s /data/scans -o /data/subjects -t 4 -a 3T --hsfs-t1
//!   fs-pipeline --config fs_pipeline.toml --subjects sub-001 sub-002 --dry-run

use anyhow::{bail, Context, Result};
use clap::Parser;
use fsp_config::{
    apply_cli_overrides, apply_environment_overrides, load_config, validate_config, ConfigError,
    FspConfig,
};
use fsp_observability::{init_logging, parse_debug_flags};
use fsp_pipeline::{
    discover_subjects, DryRunRunner, PipelineOptions, PipelineRunner, ProcessRunner, RunReport,
    ToolRunner,
};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

const REPORT_FILE_NAME: &str = "fs_pipeline_report.json";

/// Run recon-all, hippocampal subfield passes and stats export per subject
#[derive(Parser, Debug)]
#[command(name = "fs-pipeline", version, author, long_about = None)]
struct Args {
    /// Configuration file (default: search for fs_pipeline.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory with one folder of NIfTI scans per subject
    #[arg(short, long)]
    scans_dir: Option<PathBuf>,

    /// Working directory for intermediate files and the run report
    #[arg(short, long)]
    work_dir: Option<PathBuf>,

    /// FreeSurfer subjects directory (output)
    #[arg(short = 'o', long)]
    subjects_dir: Option<PathBuf>,

    /// Subjects to process (default: every folder in the scans directory)
    #[arg(long, num_args = 1..)]
    subjects: Vec<String>,

    /// Extra recon-all flags without the leading dash (e.g. `-a 3T hires`)
    #[arg(short = 'a', long, num_args = 1..)]
    recon_args: Vec<String>,

    /// OpenMP threads per recon-all
    #[arg(short, long)]
    threads: Option<usize>,

    /// Refine the pial surface with the T2 scan
    #[arg(short, long)]
    use_t2: bool,

    /// Hippocampal subfields from the T1 scan
    #[arg(long)]
    hsfs_t1: bool,

    /// Hippocampal subfields from the T2 scan
    #[arg(long)]
    hsfs_t2: bool,

    /// Hippocampal subfields from T1 and T2 together
    #[arg(long)]
    hsfs_t1t2: bool,

    /// Include existing hippocampal subfield volumes in the JSON
    #[arg(long)]
    parse_hsfs: bool,

    /// Log commands instead of running them
    #[arg(long)]
    dry_run: bool,

    /// Stop after the first failed subject
    #[arg(long)]
    stop_on_first_failure: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Write JSON log files into a run folder here
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Debug logging for every crate (same as --debug-all)
    #[arg(short = 'b', long)]
    debug: bool,
}

impl Args {
    /// Overrides in the form `fsp_config::apply_cli_overrides` expects
    fn overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        let paths = [
            ("scans_dir", &self.scans_dir),
            ("work_dir", &self.work_dir),
            ("subjects_dir", &self.subjects_dir),
            ("log_dir", &self.log_dir),
        ];
        for (key, path) in paths {
            if let Some(path) = path {
                overrides.insert(key.to_string(), path.display().to_string());
            }
        }

        if let Some(threads) = self.threads {
            overrides.insert("openmp_threads".to_string(), threads.to_string());
        }
        if let Some(level) = &self.log_level {
            overrides.insert("log_level".to_string(), level.clone());
        }

        // Flags only switch features on
        let switches = [
            ("use_t2", self.use_t2),
            ("hsfs_t1", self.hsfs_t1),
            ("hsfs_t2", self.hsfs_t2),
            ("hsfs_t1t2", self.hsfs_t1t2),
            ("parse_hsfs", self.parse_hsfs),
            ("dry_run", self.dry_run),
            ("stop_on_first_failure", self.stop_on_first_failure),
        ];
        for (key, on) in switches {
            if on {
                overrides.insert(key.to_string(), "true".to_string());
            }
        }
        overrides
    }
}

/// Load the config file if there is one, otherwise start from defaults
fn load_pipeline_config(args: &Args) -> Result<FspConfig> {
    let overrides = args.overrides();

    let mut config = match load_config(args.config.as_deref(), Some(&overrides)) {
        Ok(config) => config,
        Err(ConfigError::FileNotFound(_)) if args.config.is_none() => {
            let mut config = FspConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, &overrides);
            config
        }
        Err(e) => return Err(e).context("Failed to load configuration"),
    };

    if !args.subjects.is_empty() {
        config.execution.subjects = args.subjects.clone();
    }
    if !args.recon_args.is_empty() {
        config.recon.extra_flags = args
            .recon_args
            .iter()
            .map(|flag| format!("-{}", flag.trim_start_matches('-')))
            .collect();
    }

    validate_config(&config)?;
    Ok(config)
}

fn run_subjects<R: ToolRunner>(
    options: PipelineOptions,
    runner: R,
    subjects: &[String],
) -> RunReport {
    PipelineRunner::new(options, runner).run(subjects)
}

fn write_report(work_dir: &Path, report: &RunReport) -> Result<PathBuf> {
    fs::create_dir_all(work_dir)
        .with_context(|| format!("Failed to create work directory: {}", work_dir.display()))?;
    let path = work_dir.join(REPORT_FILE_NAME);
    let json = serde_json::to_string_pretty(&report.summary())?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

fn main() -> Result<()> {
    // --debug-<crate> flags are read by fsp-observability, not clap
    let args = Args::parse_from(env::args().filter(|arg| !arg.starts_with("--debug-")));
    let config = load_pipeline_config(&args)?;

    let mut debug_flags = parse_debug_flags().with_base_level(config.logging.level()?);
    if args.debug {
        debug_flags.enable_all();
    }
    let _logging = init_logging(
        &debug_flags,
        config.logging.log_dir.clone(),
        Some(config.logging.retention_days),
        Some(config.logging.retention_runs),
    )?;

    if !config.paths.freesurfer_home.is_dir() {
        warn!(
            freesurfer_home = %config.paths.freesurfer_home.display(),
            "FreeSurfer home not found; recon-all must be on PATH"
        );
    }

    let subjects = discover_subjects(&config.paths.scans_dir, &config.execution.subjects)?;
    if subjects.is_empty() {
        bail!("No subjects to process");
    }
    info!(count = subjects.len(), "Processing subjects: {}", subjects.join(", "));

    let options = PipelineOptions::from_config(&config)?;
    let report = if config.execution.dry_run {
        run_subjects(options, DryRunRunner, &subjects)
    } else {
        fs::create_dir_all(&config.paths.work_dir)?;
        let runner = ProcessRunner::new().with_working_dir(&config.paths.work_dir);
        run_subjects(options, runner, &subjects)
    };

    let report_path = write_report(&config.paths.work_dir, &report)?;
    info!(report = %report_path.display(), "Run report written");

    for failure in &report.failures {
        error!(subject = %failure.subject_id, "{}", failure.error);
    }
    if !report.is_success() {
        bail!(
            "{} of {} subjects failed",
            report.failures.len(),
            report.failures.len() + report.successes.len()
        );
    }
    Ok(())
}
