// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end aggregation over a synthetic subjects directory

use fsp_stats::{HsfsSubject, StatsParser, Subject};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const ASEG_COLUMNS: &str = "\
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
";

fn write_file(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_single_subject_aseg() {
    let dir = tempdir().unwrap();
    let content = format!(
        "# Measure BrainSeg, BrainSegVol, 1234567.0, mm^3\n{}Left-Hippocampus 100 100.0\n",
        ASEG_COLUMNS
    );
    write_file(&dir.path().join("sub-001/stats/aseg.stats"), &content);

    let dict = Subject::new(dir.path(), "sub-001")
        .unwrap()
        .measures_dict()
        .unwrap();

    assert_eq!(dict.len(), 1);
    let aseg = &dict["aseg"];
    assert_eq!(aseg.len(), 3);
    assert_eq!(aseg["brainsegvol"], 1234567.0);
    assert_eq!(aseg["left_hippocampus_nvoxels"], 100.0);
    assert_eq!(aseg["left_hippocampus_volume_mm3"], 100.0);
}

#[test]
fn test_row_count_matches_rows_and_header_lines() {
    let rows = ["Left-Lateral-Ventricle 1 1.5", "Right-Hippocampus 2 2.5", "CSF 3 NaN"];
    let content = format!(
        "# Measure BrainSeg, BrainSegVol, Brain Segmentation Volume, 10, mm^3\n\
         # Measure Mask, MaskVol, Mask Volume, 20, mm^3\n{}{}\n",
        ASEG_COLUMNS,
        rows.join("\n")
    );

    let parser = StatsParser::new("/subjects/sub-001/stats/aseg.stats").unwrap();
    let measures = parser.parse_str(&content).unwrap();

    // Each row yields NVoxels and Volume_mm3
    assert_eq!(measures.len(), 2 * rows.len() + 2);
    let structures: Vec<&str> = measures[2..].iter().step_by(2).map(|m| m.structure()).collect();
    assert_eq!(
        structures,
        vec!["left_lateral_ventricle", "right_hippocampus", "csf"]
    );
}

#[test]
fn test_categories_merge_and_later_file_wins() {
    let dir = tempdir().unwrap();
    let stats = dir.path().join("sub-002/stats");
    write_file(
        &stats.join("aseg.stats"),
        &format!("{}Left-Hippocampus 100 100.0\n", ASEG_COLUMNS),
    );
    write_file(
        &stats.join("wmparc.stats"),
        &format!("{}wm-lh-bankssts 7 7.5\n", ASEG_COLUMNS),
    );
    // Same stem as aseg.stats once `lh.`/`rh.` tags are gone; visited after
    // the top-level files
    write_file(
        &stats.join("rerun/aseg.stats"),
        &format!("{}Left-Hippocampus 120 120.0\n", ASEG_COLUMNS),
    );

    let dict = Subject::new(dir.path(), "sub-002")
        .unwrap()
        .measures_dict()
        .unwrap();

    let categories: Vec<&str> = dict.keys().map(String::as_str).collect();
    assert_eq!(categories, vec!["aseg", "wmparc"]);
    assert_eq!(dict["aseg"]["left_hippocampus_nvoxels"], 120.0);
    assert_eq!(dict["wmparc"]["wm_lh_bankssts_volume_mm3"], 7.5);
}

#[test]
fn test_hsfs_scenario() {
    let dir = tempdir().unwrap();
    write_file(
        &dir.path().join("sub-001/mri/lh.hippoSfVolumes-T1.txt"),
        "CA1 123.45\n",
    );

    let loaded = HsfsSubject::new(dir.path(), "sub-001")
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(loaded.measures().len(), 1);
    let measure = &loaded.measures()[0];
    assert_eq!(measure.hemisphere().as_str(), "lh");
    assert_eq!(measure.segmentation_id(), "T1");
    assert_eq!(measure.measure_name(), "ca1");
    assert_eq!(measure.value_as_float(), 123.45);
}

#[test]
fn test_hsfs_file_without_hemisphere_is_skipped() {
    let dir = tempdir().unwrap();
    let mri = dir.path().join("sub-003/mri");
    write_file(&mri.join("hippoSfVolumes-T1.txt"), "CA1 1.0\n");
    write_file(&mri.join("rh.hippoSfVolumes-T2.v21.txt"), "CA3 2.0\n");

    let loaded = HsfsSubject::new(dir.path(), "sub-003")
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(loaded.skipped().len(), 1);
    assert_eq!(loaded.measures_dict()["hippoSF"]["T2_rh_ca3"], 2.0);
}
