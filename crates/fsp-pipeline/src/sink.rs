// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-subject stats JSON
//!
//! Writes `{subjects_dir}/{subject_id}/stats/{subject_id}_stats.json`: the
//! subject's stats measures, extended with the hippocampal subfield
//! measures when requested.

use crate::{PipelineError, PipelineResult};
use fsp_stats::subject::STATS_DIR_NAME;
use fsp_stats::{merge_measure_maps, HsfsSubject, MeasureMap, Subject};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Suffix of the output file name after the subject id
pub const STATS_JSON_SUFFIX: &str = "_stats.json";

/// Aggregate one subject and persist the result
#[derive(Debug, Clone)]
pub struct JsonifyStats {
    subjects_dir: PathBuf,
    subject_id: String,
    parse_hsfs: bool,
}

impl JsonifyStats {
    pub fn new(subjects_dir: impl Into<PathBuf>, subject_id: impl Into<String>) -> Self {
        Self {
            subjects_dir: subjects_dir.into(),
            subject_id: subject_id.into(),
            parse_hsfs: false,
        }
    }

    /// Also read `mri/*hippoSfVolumes*`
    pub fn with_hsfs(mut self, parse_hsfs: bool) -> Self {
        self.parse_hsfs = parse_hsfs;
        self
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn output_path(&self) -> PathBuf {
        output_path(&self.subjects_dir, &self.subject_id)
    }

    /// Build the merged measure map without writing it
    pub fn collect(&self) -> PipelineResult<MeasureMap> {
        let mut measures = Subject::new(&self.subjects_dir, &self.subject_id)?.measures_dict()?;

        if self.parse_hsfs {
            let hsfs = HsfsSubject::new(&self.subjects_dir, &self.subject_id)?.measures_dict()?;
            merge_measure_maps(&mut measures, hsfs);
        }

        Ok(measures)
    }

    /// Aggregate and write compact JSON, returning the written path
    ///
    /// # Errors
    ///
    /// Aggregation errors surface as `PipelineError::Stats`; create or write
    /// failures as `PipelineError::SerializationWriteFailure`.
    pub fn run(&self) -> PipelineResult<PathBuf> {
        let measures = self.collect()?;
        let path = self.output_path();
        write_json(&path, &measures)?;

        info!(
            subject = %self.subject_id,
            categories = measures.len(),
            file = %path.display(),
            "Wrote stats JSON"
        );
        Ok(path)
    }
}

/// `{subjects_dir}/{subject_id}/stats/{subject_id}_stats.json`
pub fn output_path(subjects_dir: &Path, subject_id: &str) -> PathBuf {
    subjects_dir
        .join(subject_id)
        .join(STATS_DIR_NAME)
        .join(format!("{}{}", subject_id, STATS_JSON_SUFFIX))
}

fn write_json(path: &Path, measures: &MeasureMap) -> PipelineResult<()> {
    let write_failure = |source: std::io::Error| PipelineError::SerializationWriteFailure {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_failure)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, measures)
        .map_err(|e| write_failure(std::io::Error::from(e)))?;
    writer.flush().map_err(write_failure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use std::fs;
    use tempfile::tempdir;

    const ASEG: &str = "\
# Measure BrainSeg, BrainSegVol, Brain Segmentation Volume, 1234567.0, mm^3
# NTableCols 3
# TableCol  1 ColHeader StructName
# TableCol  1 FieldName Segmentation Name
# TableCol  1 Units     NA
# TableCol  2 ColHeader NVoxels
# TableCol  2 FieldName Number of Voxels
# TableCol  2 Units     unitless
# TableCol  3 ColHeader Volume_mm3
# TableCol  3 FieldName Volume
# TableCol  3 Units     mm^3
Left-Hippocampus 100 100.0
";

    fn make_subject(root: &Path, subject_id: &str) {
        let subject = root.join(subject_id);
        fs::create_dir_all(subject.join("stats")).unwrap();
        fs::create_dir_all(subject.join("mri")).unwrap();
        fs::write(subject.join("stats/aseg.stats"), ASEG).unwrap();
        fs::write(subject.join("mri/lh.hippoSfVolumes-T1.v21.txt"), "CA1 123.45\n").unwrap();
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("/data/subjects"), "sub-001"),
            PathBuf::from("/data/subjects/sub-001/stats/sub-001_stats.json")
        );
    }

    #[test]
    fn test_writes_compact_json() {
        let dir = tempdir().unwrap();
        make_subject(dir.path(), "sub-001");

        let path = JsonifyStats::new(dir.path(), "sub-001").run().unwrap();
        let content = fs::read_to_string(&path).unwrap();

        assert!(!content.contains('\n'));
        assert!(content.starts_with(r#"{"aseg":{"brainsegvol":1234567.0,"#));

        let parsed: IndexMap<String, IndexMap<String, f64>> =
            serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed["aseg"]["left_hippocampus_volume_mm3"], 100.0);
    }

    #[test]
    fn test_non_finite_tokens_are_written_as_zero() {
        let dir = tempdir().unwrap();
        let stats = dir.path().join("sub-004/stats");
        fs::create_dir_all(&stats).unwrap();
        let aseg = ASEG.replace("Left-Hippocampus 100 100.0", "Left-Hippocampus inf Infinity");
        fs::write(stats.join("aseg.stats"), aseg).unwrap();

        let path = JsonifyStats::new(dir.path(), "sub-004").run().unwrap();
        let content = fs::read_to_string(path).unwrap();

        assert!(!content.contains("null"));
        assert!(content.contains(r#""left_hippocampus_nvoxels":0.0"#));
        assert!(content.contains(r#""left_hippocampus_volume_mm3":0.0"#));
    }

    #[test]
    fn test_hsfs_is_merged_when_requested() {
        let dir = tempdir().unwrap();
        make_subject(dir.path(), "sub-002");

        let measures = JsonifyStats::new(dir.path(), "sub-002")
            .with_hsfs(true)
            .collect()
            .unwrap();

        let categories: Vec<&str> = measures.keys().map(String::as_str).collect();
        assert_eq!(categories, vec!["aseg", "hippoSF"]);
        assert_eq!(measures["hippoSF"]["T1_lh_ca1"], 123.45);
    }

    #[test]
    fn test_missing_subject_is_stats_error() {
        let dir = tempdir().unwrap();
        let err = JsonifyStats::new(dir.path(), "sub-404").run().unwrap_err();
        assert!(matches!(err, PipelineError::Stats(_)));
    }

    #[test]
    fn test_unwritable_target_is_write_failure() {
        let dir = tempdir().unwrap();
        make_subject(dir.path(), "sub-003");
        // A directory where the output file should go
        fs::create_dir_all(output_path(dir.path(), "sub-003")).unwrap();

        let err = JsonifyStats::new(dir.path(), "sub-003").run().unwrap_err();
        assert!(matches!(err, PipelineError::SerializationWriteFailure { .. }));
    }
}
