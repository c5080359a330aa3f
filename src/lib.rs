// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # fs-pipeline
//!
//! Parsing and aggregation of FreeSurfer statistics, plus the per-subject
//! workflow that produces them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fs_pipeline::stats::Subject;
//!
//! let measures = Subject::new("/data/subjects", "sub-001")?.measures_dict()?;
//! println!("{}", serde_json::to_string(&measures)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: fsp-config, fsp-observability              │
//! │  (TOML + overrides, tracing setup)                      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Parsing: fsp-stats, fsp-colorlut                       │
//! │  (*.stats, hippoSfVolumes, FreeSurferColorLUT.txt)      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Orchestration: fsp-pipeline                            │
//! │  (recon-all / mri_segstats commands, stats JSON)        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Binaries
//!
//! - **`fs-pipeline`**: reconstruction, subfield passes and JSON per subject
//! - **`jsonify-stats`**: JSON output for already reconstructed subjects
//!
//! ## License
//!
//! Apache-2.0

pub use fsp_colorlut as colorlut;
pub use fsp_config as config;
pub use fsp_observability as observability;
pub use fsp_pipeline as pipeline;
pub use fsp_stats as stats;

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::colorlut::{ColorLut, LabelColormap};
    pub use crate::config::{load_config, validate_config, FspConfig};
    pub use crate::pipeline::{
        JsonifyStats, PipelineError, PipelineOptions, PipelineRunner, RunReport, ToolRunner,
    };
    pub use crate::stats::{HsfsSubject, MeasureMap, StatsError, Subject};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_facade_imports() {
        use crate::prelude::*;
        let config = FspConfig::default();
        assert!(PipelineOptions::from_config(&config).is_err());
    }
}
