// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Sequential per-subject runner

Each subject goes through the same stages:

1. `recon-all` (resumed when `mri/` already exists)
2. one hippocampal subfield pass per enabled [`HsfsMode`]
3. `mri_segstats` summary (optional)
4. stats JSON via [`JsonifyStats`]

A failing stage ends that subject only; the [`RunReport`] records the cause
and the loop moves on unless `stop_on_first_failure` is set. Commands run
through the [`ToolRunner`] trait so they can be logged instead of executed.
*/

use crate::command::{HippocampalSubfields, HsfsMode, ReconAll, SegStats, ToolCommand};
use crate::scans::find_scans;
use crate::sink::{output_path, JsonifyStats};
use crate::{PipelineError, PipelineResult};
use fsp_config::FspConfig;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Executes external commands
pub trait ToolRunner {
    fn run(&self, command: &ToolCommand) -> PipelineResult<()>;

    /// Commands are only logged; their outputs will not exist
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Spawns each command and waits for it
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    working_dir: Option<PathBuf>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&self, command: &ToolCommand) -> PipelineResult<()> {
        info!(subject = %command.subject_id(), command = %command, "Running");

        let mut process = command.to_command();
        if let Some(dir) = &self.working_dir {
            process.current_dir(dir);
        }

        let status = process.status().map_err(|source| PipelineError::ToolLaunch {
            program: command.program().to_string(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(PipelineError::ToolFailed {
                program: command.program().to_string(),
                subject_id: command.subject_id().to_string(),
                exit_code: status.code(),
            })
        }
    }
}

/// Logs each command without running it
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRunner;

impl ToolRunner for DryRunRunner {
    fn run(&self, command: &ToolCommand) -> PipelineResult<()> {
        info!(subject = %command.subject_id(), command = %command, "Dry run");
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

/// Settings for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub subjects_dir: PathBuf,
    pub scans_dir: PathBuf,
    /// Exported as `FREESURFER_HOME` to every tool
    pub freesurfer_home: Option<PathBuf>,
    pub directive: String,
    pub openmp_threads: usize,
    pub use_t2: bool,
    pub extra_flags: Vec<String>,
    pub hsfs_modes: Vec<HsfsMode>,
    pub parse_hsfs: bool,
    /// `(segment ids, summary file name)` when the segstats stage is on
    pub segstats: Option<(Vec<u32>, String)>,
    pub stop_on_first_failure: bool,
}

impl PipelineOptions {
    /// # Errors
    ///
    /// `PipelineError::Config` when `paths.subjects_dir` is unset.
    pub fn from_config(config: &FspConfig) -> PipelineResult<Self> {
        let hsfs = &config.hsfs;
        Ok(Self {
            subjects_dir: config.paths.subjects_dir()?.to_path_buf(),
            scans_dir: config.paths.scans_dir.clone(),
            freesurfer_home: Some(config.paths.freesurfer_home.clone()),
            directive: config.recon.directive.clone(),
            openmp_threads: config.recon.openmp_threads,
            use_t2: config.recon.use_t2,
            extra_flags: config.recon.extra_flags.clone(),
            hsfs_modes: HsfsMode::enabled(hsfs.t1, hsfs.t2, hsfs.t1t2),
            parse_hsfs: hsfs.parse_results(),
            segstats: config.segstats.enabled.then(|| {
                (
                    config.segstats.segment_ids.clone(),
                    config.segstats.summary_file.clone(),
                )
            }),
            stop_on_first_failure: config.execution.stop_on_first_failure,
        })
    }
}

/// A subject that did not finish
#[derive(Debug)]
pub struct SubjectFailure {
    pub subject_id: String,
    pub error: PipelineError,
}

/// Outcome of a run, in processing order
#[derive(Debug, Default)]
pub struct RunReport {
    pub successes: Vec<(String, PathBuf)>,
    pub failures: Vec<SubjectFailure>,
}

/// Serializable form of a [`RunReport`]
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub succeeded: Vec<SubjectOutcome>,
    pub failed: Vec<SubjectOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectOutcome {
    pub subject_id: String,
    /// JSON path for successes, error message for failures
    pub detail: String,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            succeeded: self
                .successes
                .iter()
                .map(|(subject_id, path)| SubjectOutcome {
                    subject_id: subject_id.clone(),
                    detail: path.display().to_string(),
                })
                .collect(),
            failed: self
                .failures
                .iter()
                .map(|failure| SubjectOutcome {
                    subject_id: failure.subject_id.clone(),
                    detail: failure.error.to_string(),
                })
                .collect(),
        }
    }
}

/// Drives subjects through the stages one at a time
pub struct PipelineRunner<R: ToolRunner> {
    options: PipelineOptions,
    runner: R,
}

impl<R: ToolRunner> PipelineRunner<R> {
    pub fn new(options: PipelineOptions, runner: R) -> Self {
        Self { options, runner }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn run(&self, subject_ids: &[String]) -> RunReport {
        let mut report = RunReport::default();
        let started = Instant::now();

        for subject_id in subject_ids {
            match self.process_subject(subject_id) {
                Ok(path) => report.successes.push((subject_id.clone(), path)),
                Err(e) => {
                    error!(subject = %subject_id, error = %e, "Subject failed");
                    report.failures.push(SubjectFailure {
                        subject_id: subject_id.clone(),
                        error: e,
                    });
                    if self.options.stop_on_first_failure {
                        warn!("Stopping after first failure");
                        break;
                    }
                }
            }
        }

        info!(
            succeeded = report.successes.len(),
            failed = report.failures.len(),
            elapsed_secs = started.elapsed().as_secs(),
            "Pipeline run finished"
        );
        report
    }

    fn run_tool(&self, command: ToolCommand) -> PipelineResult<()> {
        let command = command.freesurfer_home(self.options.freesurfer_home.as_deref());
        self.runner.run(&command)
    }

    /// Run every stage for one subject, returning the stats JSON path
    pub fn process_subject(&self, subject_id: &str) -> PipelineResult<PathBuf> {
        let options = &self.options;
        let scans = find_scans(&options.scans_dir, subject_id)?;
        debug!(subject = %subject_id, ?scans, "Resolved scans");

        let recon = ReconAll::new(&options.subjects_dir, subject_id)
            .directive(&options.directive)
            .t1_file(scans.t1.clone())
            .t2_refinement(scans.t2.clone(), options.use_t2)
            .openmp_threads(options.openmp_threads)
            .extra_flags(&options.extra_flags);
        self.run_tool(recon.build()?)?;

        for mode in &options.hsfs_modes {
            let pass = HippocampalSubfields::new(&options.subjects_dir, subject_id, *mode)
                .t2_file(scans.t2.clone())
                .extra_flags(&options.extra_flags);
            self.run_tool(pass.build()?)?;
        }

        if let Some((segment_ids, summary_file)) = &options.segstats {
            let segstats = SegStats::new(&options.subjects_dir, subject_id)
                .segment_ids(segment_ids)
                .summary_file(summary_file);
            self.run_tool(segstats.build())?;
        }

        if self.runner.is_dry_run() {
            return Ok(output_path(&options.subjects_dir, subject_id));
        }

        JsonifyStats::new(&options.subjects_dir, subject_id)
            .with_hsfs(options.parse_hsfs)
            .run()
    }
}
