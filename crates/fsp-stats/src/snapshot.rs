// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Immutable result of loading one subject

use crate::measure::{fold_measures, MeasureMap, NamedMeasure};
use std::path::{Path, PathBuf};

/// A recognized file that was left out of a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Measures read for one subject, plus the files that could not be parsed
#[derive(Debug, Clone)]
pub struct LoadedSubject<M> {
    subject_id: String,
    source_dir: PathBuf,
    measures: Vec<M>,
    skipped: Vec<SkippedFile>,
}

impl<M: NamedMeasure> LoadedSubject<M> {
    pub(crate) fn new(
        subject_id: String,
        source_dir: PathBuf,
        measures: Vec<M>,
        skipped: Vec<SkippedFile>,
    ) -> Self {
        Self {
            subject_id,
            source_dir,
            measures,
            skipped,
        }
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// Directory the measures were read from (`stats` or `mri`)
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn measures(&self) -> &[M] {
        &self.measures
    }

    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    /// Fold the measures into `category -> field -> value`
    pub fn measures_dict(&self) -> MeasureMap {
        fold_measures(&self.measures)
    }
}
