// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Recognized stats file formats
//!
//! Dispatch is by exact file name. Each format carries its extraction rules
//! as data: whether `# Measure` header lines are read, whether table rows get
//! a hemisphere prefix, and which table columns become measures.

/// Column holding the anatomical structure name in every table
pub const STRUCT_NAME_COLUMN: &str = "StructName";

const VOLUME_COLUMNS: &[&str] = &["NVoxels", "Volume_mm3"];

const SURFACE_COLUMNS: &[&str] = &[
    "NumVert", "SurfArea", "GrayVol", "ThickAvg", "ThickStd", "MeanCurv", "GausCurv", "FoldInd",
    "CurvInd",
];

const INTENSITY_COLUMNS: &[&str] = &[
    "NVertices", "Area_mm2", "Mean", "StdDev", "Min", "Max", "Range", "SNR",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsFormat {
    /// `aseg.stats`, `wmparc.stats`
    VolumeSegmentation,
    /// `?h.aparc*.stats`, `?h.BA_exvivo.thresh.stats`
    SurfaceParcellation,
    /// `?h.w-g.pct.stats`
    IntensityContrast,
    /// `wmgm.aseg.stats` written by `mri_segstats`; has no header measures
    MergedSegmentationSummary,
}

const RECOGNIZED_FILES: &[(&str, StatsFormat)] = &[
    ("aseg.stats", StatsFormat::VolumeSegmentation),
    ("wmparc.stats", StatsFormat::VolumeSegmentation),
    ("lh.aparc.stats", StatsFormat::SurfaceParcellation),
    ("rh.aparc.stats", StatsFormat::SurfaceParcellation),
    ("lh.aparc.pial.stats", StatsFormat::SurfaceParcellation),
    ("rh.aparc.pial.stats", StatsFormat::SurfaceParcellation),
    ("lh.aparc.a2009s.stats", StatsFormat::SurfaceParcellation),
    ("rh.aparc.a2009s.stats", StatsFormat::SurfaceParcellation),
    ("lh.aparc.DKTatlas.stats", StatsFormat::SurfaceParcellation),
    ("rh.aparc.DKTatlas.stats", StatsFormat::SurfaceParcellation),
    ("lh.BA_exvivo.thresh.stats", StatsFormat::SurfaceParcellation),
    ("rh.BA_exvivo.thresh.stats", StatsFormat::SurfaceParcellation),
    ("lh.w-g.pct.stats", StatsFormat::IntensityContrast),
    ("rh.w-g.pct.stats", StatsFormat::IntensityContrast),
    ("wmgm.aseg.stats", StatsFormat::MergedSegmentationSummary),
];

impl StatsFormat {
    /// Look up the format for a file name (case-sensitive)
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        RECOGNIZED_FILES
            .iter()
            .find(|(name, _)| *name == file_name)
            .map(|(_, format)| *format)
    }

    /// Every file name the parser accepts
    pub fn recognized_file_names() -> impl Iterator<Item = &'static str> {
        RECOGNIZED_FILES.iter().map(|(name, _)| *name)
    }

    /// Table columns extracted from every row
    pub fn measure_columns(&self) -> &'static [&'static str] {
        match self {
            StatsFormat::VolumeSegmentation | StatsFormat::MergedSegmentationSummary => {
                VOLUME_COLUMNS
            }
            StatsFormat::SurfaceParcellation => SURFACE_COLUMNS,
            StatsFormat::IntensityContrast => INTENSITY_COLUMNS,
        }
    }

    pub fn has_header_measures(&self) -> bool {
        !matches!(self, StatsFormat::MergedSegmentationSummary)
    }

    pub fn prefixes_rows_with_hemisphere(&self) -> bool {
        matches!(
            self,
            StatsFormat::SurfaceParcellation | StatsFormat::IntensityContrast
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognized_set_is_closed() {
        assert_eq!(StatsFormat::recognized_file_names().count(), 15);
        for name in StatsFormat::recognized_file_names() {
            assert!(StatsFormat::from_file_name(name).is_some(), "{} rejected", name);
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(StatsFormat::from_file_name("ASEG.stats").is_none());
        assert!(StatsFormat::from_file_name("lh.aparc.dktatlas.stats").is_none());
        assert!(StatsFormat::from_file_name("aseg.stats.bak").is_none());
        assert!(StatsFormat::from_file_name("lh.curv.stats").is_none());
    }

    #[test]
    fn test_format_rules() {
        let wmgm = StatsFormat::from_file_name("wmgm.aseg.stats").unwrap();
        assert!(!wmgm.has_header_measures());
        assert!(!wmgm.prefixes_rows_with_hemisphere());

        let pct = StatsFormat::from_file_name("rh.w-g.pct.stats").unwrap();
        assert_eq!(pct, StatsFormat::IntensityContrast);
        assert!(pct.measure_columns().contains(&"SNR"));

        let aseg = StatsFormat::from_file_name("aseg.stats").unwrap();
        assert_eq!(aseg.measure_columns(), &["NVoxels", "Volume_mm3"]);
        assert!(!aseg.prefixes_rows_with_hemisphere());
    }
}
