// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for stats parsing and aggregation

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a subject's stats
///
/// Unrecognized file names are not errors: callers check
/// [`StatsParser::can_parse`](crate::StatsParser::can_parse) and skip them.
#[derive(Error, Debug)]
pub enum StatsError {
    /// The subject has no `stats` (or `mri`) directory
    #[error("Subject directory not found: {}", .0.display())]
    MissingSubjectDirectory(PathBuf),

    /// A recognized file lacks the markers or columns its format requires
    #[error("Malformed stats file {}: {}", .path.display(), .reason)]
    MalformedStatsFile { path: PathBuf, reason: String },

    #[error("Failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for stats operations
pub type StatsResult<T> = Result<T, StatsError>;
