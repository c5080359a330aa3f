// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Color table parsing and lookup

use crate::{LabelColormap, LutError, LutResult};
use indexmap::IndexMap;
use serde::Serialize;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the color table inside a FreeSurfer installation
pub const LUT_FILE_NAME: &str = "FreeSurferColorLUT.txt";

const DEFAULT_FREESURFER_HOME: &str = "/opt/freesurfer";

/// Locate the color table
///
/// `$FREESURFER_HOME/FreeSurferColorLUT.txt` when the variable is set,
/// `/opt/freesurfer/FreeSurferColorLUT.txt` otherwise. The file is not
/// checked for existence.
pub fn find_lut_file() -> PathBuf {
    lut_path_for(std::env::var_os("FREESURFER_HOME"))
}

/// Color table of a known installation, e.g. `paths.freesurfer_home`
pub fn lut_file_in(freesurfer_home: impl AsRef<Path>) -> PathBuf {
    freesurfer_home.as_ref().join(LUT_FILE_NAME)
}

fn lut_path_for(freesurfer_home: Option<OsString>) -> PathBuf {
    lut_file_in(
        freesurfer_home
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FREESURFER_HOME)),
    )
}

/// One color table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LutEntry {
    pub name: String,
    pub rgb: [u8; 3],
    pub alpha: u8,
}

/// Label index -> name and color, in file order
#[derive(Debug, Clone, Default)]
pub struct ColorLut {
    entries: IndexMap<u32, LutEntry>,
}

impl ColorLut {
    pub fn from_file(path: impl AsRef<Path>) -> LutResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LutError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let lut = Self::parse(BufReader::new(file)).map_err(|err| match err {
            LutError::Io { source, .. } => LutError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        debug!(file = %path.display(), entries = lut.len(), "Loaded color table");
        Ok(lut)
    }

    /// Parse `index name R G B [A]` rows, ignoring comments and blank lines
    pub fn parse(reader: impl BufRead) -> LutResult<Self> {
        let mut entries = IndexMap::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| LutError::Io {
                path: PathBuf::new(),
                source,
            })?;
            let line_number = index + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            let (label, name, color) = match fields.as_slice() {
                [label, name, color @ ..] if (3..=4).contains(&color.len()) => {
                    (label, name, color)
                }
                _ => {
                    return Err(LutError::Malformed {
                        line: line_number,
                        reason: format!("expected 5 or 6 fields, found {}", fields.len()),
                    })
                }
            };

            let label: u32 = label.parse().map_err(|_| LutError::Malformed {
                line: line_number,
                reason: format!("invalid label index '{}'", label),
            })?;
            let channels = color
                .iter()
                .map(|value| {
                    value.parse::<u8>().map_err(|_| LutError::Malformed {
                        line: line_number,
                        reason: format!("invalid color channel '{}'", value),
                    })
                })
                .collect::<LutResult<Vec<u8>>>()?;

            entries.insert(
                label,
                LutEntry {
                    name: name.to_string(),
                    rgb: [channels[0], channels[1], channels[2]],
                    alpha: channels.get(3).copied().unwrap_or(0),
                },
            );
        }

        Ok(Self { entries })
    }

    pub fn get(&self, label: u32) -> Option<&LutEntry> {
        self.entries.get(&label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u32, &LutEntry)> {
        self.entries.iter()
    }

    /// Build a colormap for the labels present in a volume
    ///
    /// Labels are deduplicated and sorted; the i-th label maps to index i.
    pub fn label_colormap(&self, labels: &[u32]) -> LutResult<LabelColormap> {
        let mut unique = labels.to_vec();
        unique.sort_unstable();
        unique.dedup();

        let colors = unique
            .iter()
            .map(|&label| {
                self.get(label)
                    .map(|entry| entry.rgb.map(|channel| f32::from(channel) / 255.0))
                    .ok_or(LutError::UnknownLabel(label))
            })
            .collect::<LutResult<Vec<_>>>()?;

        Ok(LabelColormap::new(unique, colors))
    }
}
