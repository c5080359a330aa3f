// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Subject and scan discovery in the scans directory

use crate::{PipelineError, PipelineResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const NIFTI_GZ_EXTENSION: &str = ".nii.gz";

/// Input scans of one subject
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectScans {
    pub t1: Option<PathBuf>,
    pub t2: Option<PathBuf>,
}

fn sorted_entries(dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    let io_error = |source: std::io::Error| PipelineError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(io_error)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error)?;
    entries.sort();
    Ok(entries)
}

/// Subjects to process
///
/// The explicit list when non-empty, otherwise every directory in
/// `scans_dir` in name order.
pub fn discover_subjects(scans_dir: &Path, explicit: &[String]) -> PipelineResult<Vec<String>> {
    if !explicit.is_empty() {
        return Ok(explicit.to_vec());
    }

    let subjects: Vec<String> = sorted_entries(scans_dir)?
        .into_iter()
        .filter(|path| path.is_dir())
        .filter_map(|path| path.file_name()?.to_str().map(str::to_string))
        .collect();

    debug!(scans_dir = %scans_dir.display(), count = subjects.len(), "Discovered subjects");
    Ok(subjects)
}

/// `*{tag}*.nii.gz`
fn matches_scan(name: &str, tag: &str) -> bool {
    name.strip_suffix(NIFTI_GZ_EXTENSION)
        .is_some_and(|stem| stem.contains(tag))
}

/// First `*T1*.nii.gz` and `*T2*.nii.gz` in `{scans_dir}/{subject_id}`
pub fn find_scans(scans_dir: &Path, subject_id: &str) -> PipelineResult<SubjectScans> {
    let subject_dir = scans_dir.join(subject_id);
    if !subject_dir.is_dir() {
        return Ok(SubjectScans::default());
    }

    let files = sorted_entries(&subject_dir)?;
    let first_match = |tag: &str| {
        files
            .iter()
            .find(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| matches_scan(name, tag))
            })
            .cloned()
    };

    Ok(SubjectScans {
        t1: first_match("T1"),
        t2: first_match("T2"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_matches_scan() {
        assert!(matches_scan("sub-001_T1w.nii.gz", "T1"));
        assert!(matches_scan("T2.nii.gz", "T2"));
        assert!(!matches_scan("sub-001_T1w.nii", "T1"));
        assert!(!matches_scan("sub-001_T1w.json", "T1"));
        assert!(!matches_scan("sub-001_flair.nii.gz", "T1"));
    }

    #[test]
    fn test_discover_subjects() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub-002")).unwrap();
        fs::create_dir_all(dir.path().join("sub-001")).unwrap();
        fs::write(dir.path().join("participants.tsv"), "").unwrap();

        let subjects = discover_subjects(dir.path(), &[]).unwrap();
        assert_eq!(subjects, vec!["sub-001", "sub-002"]);

        let explicit = vec!["sub-009".to_string()];
        assert_eq!(discover_subjects(dir.path(), &explicit).unwrap(), explicit);
    }

    #[test]
    fn test_missing_scans_dir() {
        let dir = tempdir().unwrap();
        let err = discover_subjects(&dir.path().join("absent"), &[]).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn test_find_scans_takes_first_match() {
        let dir = tempdir().unwrap();
        let subject = dir.path().join("sub-001");
        fs::create_dir_all(&subject).unwrap();
        for name in ["b_T1w.nii.gz", "a_T1w.nii.gz", "a_T2w.nii.gz", "a_T1w.json"] {
            fs::write(subject.join(name), "").unwrap();
        }

        let scans = find_scans(dir.path(), "sub-001").unwrap();
        assert_eq!(scans.t1, Some(subject.join("a_T1w.nii.gz")));
        assert_eq!(scans.t2, Some(subject.join("a_T2w.nii.gz")));

        assert_eq!(find_scans(dir.path(), "sub-404").unwrap(), SubjectScans::default());
    }
}
