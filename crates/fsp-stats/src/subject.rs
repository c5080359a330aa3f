// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-subject aggregation of `{subject}/stats`

use crate::measure::MeasureMap;
use crate::snapshot::{LoadedSubject, SkippedFile};
use crate::walk::walk_files;
use crate::{Measure, StatsError, StatsParser, StatsResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the stats directory inside a subject directory
pub const STATS_DIR_NAME: &str = "stats";

/// One subject's stats directory
#[derive(Debug, Clone)]
pub struct Subject {
    subject_id: String,
    stats_dir: PathBuf,
}

impl Subject {
    /// Bind to `{subjects_dir}/{subject_id}/stats`
    ///
    /// # Errors
    ///
    /// Returns `StatsError::MissingSubjectDirectory` if the stats directory
    /// does not exist; nothing is parsed.
    pub fn new(subjects_dir: impl AsRef<Path>, subject_id: impl Into<String>) -> StatsResult<Self> {
        let subject_id = subject_id.into();
        let stats_dir = subjects_dir
            .as_ref()
            .join(&subject_id)
            .join(STATS_DIR_NAME);

        if !stats_dir.is_dir() {
            return Err(StatsError::MissingSubjectDirectory(stats_dir));
        }

        Ok(Self {
            subject_id,
            stats_dir,
        })
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn stats_dir(&self) -> &Path {
        &self.stats_dir
    }

    /// Parse every recognized file below the stats directory
    ///
    /// Malformed files are logged and listed in [`LoadedSubject::skipped`];
    /// the other files are still parsed. Read failures abort the load.
    pub fn load(&self) -> StatsResult<LoadedSubject<Measure>> {
        let mut measures = Vec::new();
        let mut skipped = Vec::new();

        for path in walk_files(&self.stats_dir)? {
            let Some(parser) = StatsParser::new(&path) else {
                continue;
            };

            match parser.parse() {
                Ok(parsed) => measures.extend(parsed),
                Err(StatsError::MalformedStatsFile { path, reason }) => {
                    warn!(
                        subject = %self.subject_id,
                        file = %path.display(),
                        %reason,
                        "Skipping malformed stats file"
                    );
                    skipped.push(SkippedFile { path, reason });
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            subject = %self.subject_id,
            measures = measures.len(),
            skipped = skipped.len(),
            "Loaded subject stats"
        );

        Ok(LoadedSubject::new(
            self.subject_id.clone(),
            self.stats_dir.clone(),
            measures,
            skipped,
        ))
    }

    /// Load and fold in one step
    pub fn measures_dict(&self) -> StatsResult<MeasureMap> {
        let loaded = self.load()?;
        debug!(subject = %self.subject_id, "Folding stats measures");
        Ok(loaded.measures_dict())
    }
}
