// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Pipeline error types

use fsp_config::ConfigError;
use fsp_stats::StatsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to write {}: {source}", .path.display())]
    SerializationWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No {kind} scan found for subject {subject_id}")]
    MissingScan { subject_id: String, kind: String },

    #[error("Failed to launch {program}: {source}")]
    ToolLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed for subject {subject_id} ({})", exit_description(.exit_code))]
    ToolFailed {
        program: String,
        subject_id: String,
        exit_code: Option<i32>,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn exit_description(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
