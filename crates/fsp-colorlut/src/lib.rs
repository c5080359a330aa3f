// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # FreeSurfer Color Lookup Table
//!
//! Loads `FreeSurferColorLUT.txt` (`index name R G B A` per line) and maps the
//! labels present in a segmentation volume onto a contiguous colormap for
//! quality-control rendering.
//!
//! ```rust,no_run
//! use fsp_colorlut::{find_lut_file, ColorLut};
//!
//! let lut = ColorLut::from_file(find_lut_file()).unwrap();
//! let colormap = lut.label_colormap(&[0, 17, 53, 17]).unwrap();
//! assert_eq!(colormap.len(), 3);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod colormap;
pub mod lut;

pub use colormap::LabelColormap;
pub use lut::{find_lut_file, lut_file_in, ColorLut, LutEntry, LUT_FILE_NAME};

use std::path::PathBuf;

/// Color table error types
#[derive(Debug, thiserror::Error)]
pub enum LutError {
    #[error("Failed to read color table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed color table line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Label {0} is not in the color table")]
    UnknownLabel(u32),
}

/// Result type for color table operations
pub type LutResult<T> = Result<T, LutError>;
