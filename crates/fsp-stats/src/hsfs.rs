// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Hippocampal subfield volumes

`recon-all -hippocampal-subfields-*` writes `?h.hippoSfVolumes-<ID>.v21.txt`
into the subject's `mri` directory, one `name value` pair per line. The
hemisphere and the segmentation id (`T1`, `T2`, `T1_T1T2`, ...) come from the
file name, not from the content.

All measures fold under the `hippoSF` category:
`hippoSF -> {segmentation_id}_{hemi}_{measure}`.
*/

use crate::measure::{value_as_float, MeasureMap, NamedMeasure};
use crate::snapshot::{LoadedSubject, SkippedFile};
use crate::walk::{read_text, walk_files};
use crate::{Hemisphere, StatsError, StatsResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Name of the volume directory inside a subject directory
pub const MRI_DIR_NAME: &str = "mri";

/// Substring identifying subfield volume files
pub const HSFS_FILE_MARKER: &str = "hippoSfVolumes";

/// Category every subfield measure is folded under
pub const HSFS_CATEGORY: &str = "hippoSF";

/// One subfield volume
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HsfsMeasure {
    measure_name: String,
    value: f64,
    hemisphere: Hemisphere,
    segmentation_id: String,
}

impl HsfsMeasure {
    pub fn new(
        measure_name: &str,
        value_token: &str,
        hemisphere: Hemisphere,
        segmentation_id: impl Into<String>,
    ) -> Self {
        Self {
            measure_name: measure_name.replace('-', "_").to_lowercase(),
            value: value_as_float(value_token),
            hemisphere,
            segmentation_id: segmentation_id.into(),
        }
    }

    pub fn measure_name(&self) -> &str {
        &self.measure_name
    }

    pub fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    pub fn segmentation_id(&self) -> &str {
        &self.segmentation_id
    }

    pub fn name(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            HSFS_CATEGORY,
            self.segmentation_id.replace('-', "_"),
            self.hemisphere,
            self.measure_name
        )
    }

    pub fn value_as_float(&self) -> f64 {
        if self.value.is_finite() {
            self.value
        } else {
            0.0
        }
    }
}

impl NamedMeasure for HsfsMeasure {
    fn name(&self) -> String {
        HsfsMeasure::name(self)
    }

    fn value_as_float(&self) -> f64 {
        HsfsMeasure::value_as_float(self)
    }
}

/// Parser for one subfield volume file
#[derive(Debug, Clone)]
pub struct HsfsParser {
    path: PathBuf,
    hemisphere: Hemisphere,
    segmentation_id: String,
}

impl HsfsParser {
    /// Check whether a file name marks a subfield volume file
    pub fn is_hsfs_file(path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.contains(HSFS_FILE_MARKER))
    }

    /// Create a parser with caller-supplied tags
    pub fn new(
        path: impl Into<PathBuf>,
        hemisphere: Hemisphere,
        segmentation_id: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            hemisphere,
            segmentation_id: segmentation_id.into(),
        }
    }

    /// Create a parser with tags taken from the file name
    ///
    /// `lh.hippoSfVolumes-T1-T1T2.v21.txt` gives `lh` and `T1_T1T2`. Returns
    /// `None` if the name has no `lh.`/`rh.` tag or is not a subfield file.
    pub fn from_file_name(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let name = path.file_name()?.to_str()?;
        if !name.contains(HSFS_FILE_MARKER) {
            return None;
        }

        let hemisphere = if name.contains("lh.") {
            Hemisphere::Left
        } else if name.contains("rh.") {
            Hemisphere::Right
        } else {
            return None;
        };
        let segmentation_id = name
            .split('.')
            .nth(1)
            .unwrap_or_default()
            .split('-')
            .skip(1)
            .collect::<Vec<_>>()
            .join("_");

        Some(Self::new(path, hemisphere, segmentation_id))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parse(&self) -> StatsResult<Vec<HsfsMeasure>> {
        let content = read_text(&self.path)?;
        self.parse_str(&content)
    }

    /// Parse `name value` lines; blank lines are ignored
    pub fn parse_str(&self, content: &str) -> StatsResult<Vec<HsfsMeasure>> {
        let mut measures = Vec::new();

        for (index, line) in content.lines().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.as_slice() {
                [] => continue,
                [name, value] => measures.push(HsfsMeasure::new(
                    name,
                    value,
                    self.hemisphere,
                    self.segmentation_id.as_str(),
                )),
                _ => {
                    return Err(StatsError::MalformedStatsFile {
                        path: self.path.clone(),
                        reason: format!(
                            "line {} has {} fields, expected 'name value'",
                            index + 1,
                            tokens.len()
                        ),
                    })
                }
            }
        }

        Ok(measures)
    }
}

/// One subject's `mri` directory, read for subfield volumes
#[derive(Debug, Clone)]
pub struct HsfsSubject {
    subject_id: String,
    mri_dir: PathBuf,
}

impl HsfsSubject {
    /// Bind to `{subjects_dir}/{subject_id}/mri`
    ///
    /// # Errors
    ///
    /// Returns `StatsError::MissingSubjectDirectory` if the directory does not exist.
    pub fn new(subjects_dir: impl AsRef<Path>, subject_id: impl Into<String>) -> StatsResult<Self> {
        let subject_id = subject_id.into();
        let mri_dir = subjects_dir.as_ref().join(&subject_id).join(MRI_DIR_NAME);

        if !mri_dir.is_dir() {
            return Err(StatsError::MissingSubjectDirectory(mri_dir));
        }

        Ok(Self {
            subject_id,
            mri_dir,
        })
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn mri_dir(&self) -> &Path {
        &self.mri_dir
    }

    pub fn load(&self) -> StatsResult<LoadedSubject<HsfsMeasure>> {
        let mut measures = Vec::new();
        let mut skipped = Vec::new();

        for path in walk_files(&self.mri_dir)? {
            if !HsfsParser::is_hsfs_file(&path) {
                continue;
            }

            let Some(parser) = HsfsParser::from_file_name(&path) else {
                let reason = "file name has no lh./rh. hemisphere tag".to_string();
                warn!(
                    subject = %self.subject_id,
                    file = %path.display(),
                    %reason,
                    "Skipping subfield volume file"
                );
                skipped.push(SkippedFile { path, reason });
                continue;
            };

            match parser.parse() {
                Ok(parsed) => measures.extend(parsed),
                Err(StatsError::MalformedStatsFile { path, reason }) => {
                    warn!(
                        subject = %self.subject_id,
                        file = %path.display(),
                        %reason,
                        "Skipping malformed subfield volume file"
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
            "Loaded hippocampal subfield volumes"
        );

        Ok(LoadedSubject::new(
            self.subject_id.clone(),
            self.mri_dir.clone(),
            measures,
            skipped,
        ))
    }

    pub fn measures_dict(&self) -> StatsResult<MeasureMap> {
        Ok(self.load()?.measures_dict())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_tags_from_file_name() {
        let parser = HsfsParser::from_file_name("/s/mri/lh.hippoSfVolumes-T1.txt").unwrap();
        assert_eq!(parser.hemisphere, Hemisphere::Left);
        assert_eq!(parser.segmentation_id, "T1");

        let parser =
            HsfsParser::from_file_name("/s/mri/rh.hippoSfVolumes-T1-T1T2.v21.txt").unwrap();
        assert_eq!(parser.hemisphere, Hemisphere::Right);
        assert_eq!(parser.segmentation_id, "T1_T1T2");

        assert!(HsfsParser::from_file_name("/s/mri/hippoSfVolumes-T1.txt").is_none());
        assert!(HsfsParser::from_file_name("/s/mri/lh.hippoSfLabels-T1.mgz").is_none());
    }

    #[test]
    fn test_single_line() {
        let parser = HsfsParser::new("lh.hippoSfVolumes-T1.txt", Hemisphere::Left, "T1");
        let measures = parser.parse_str("CA1 123.45\n").unwrap();

        assert_eq!(measures.len(), 1);
        assert_eq!(measures[0].hemisphere(), Hemisphere::Left);
        assert_eq!(measures[0].segmentation_id(), "T1");
        assert_eq!(measures[0].measure_name(), "ca1");
        assert_eq!(measures[0].value_as_float(), 123.45);
        assert_eq!(measures[0].name(), "hippoSF_T1_lh_ca1");
    }

    #[test]
    fn test_hyphens_and_blank_lines() {
        let parser = HsfsParser::new("rh.hippoSfVolumes-T2.txt", Hemisphere::Right, "T2");
        let measures = parser
            .parse_str("Hippocampal_tail 512.3\n\nmolecular_layer_HP NaN\nGC-ML-DG 99\n")
            .unwrap();

        assert_eq!(measures.len(), 3);
        assert_eq!(measures[1].value_as_float(), 0.0);
        assert_eq!(measures[2].measure_name(), "gc_ml_dg");
    }

    #[test]
    fn test_extra_fields_are_malformed() {
        let parser = HsfsParser::new("lh.hippoSfVolumes-T1.txt", Hemisphere::Left, "T1");
        let err = parser.parse_str("CA1 1 2\n").unwrap_err();
        assert!(matches!(err, StatsError::MalformedStatsFile { .. }));
    }

    #[test]
    fn test_subject_folds_under_category() {
        let dir = tempdir().unwrap();
        let mri = dir.path().join("sub-001").join(MRI_DIR_NAME);
        fs::create_dir_all(&mri).unwrap();
        fs::write(mri.join("lh.hippoSfVolumes-T1.txt"), "CA1 123.45\nCA3 50\n").unwrap();
        fs::write(mri.join("rh.hippoSfVolumes-T1.txt"), "CA1 120\n").unwrap();
        fs::write(mri.join("aseg.mgz"), [0u8, 1, 2]).unwrap();

        let dict = HsfsSubject::new(dir.path(), "sub-001")
            .unwrap()
            .measures_dict()
            .unwrap();

        assert_eq!(dict.len(), 1);
        assert_eq!(dict[HSFS_CATEGORY]["T1_lh_ca1"], 123.45);
        assert_eq!(dict[HSFS_CATEGORY]["T1_lh_ca3"], 50.0);
        assert_eq!(dict[HSFS_CATEGORY]["T1_rh_ca1"], 120.0);
    }

    #[test]
    fn test_missing_mri_directory() {
        let dir = tempdir().unwrap();
        let err = HsfsSubject::new(dir.path(), "sub-404").unwrap_err();
        assert!(matches!(err, StatsError::MissingSubjectDirectory(_)));
    }
}
