// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Stats file parser

Reads one recognized `*.stats` file in two phases:

1. **Header measures** - every `# Measure` line (skipped for formats without them)
2. **Table rows** - the columns declared by `# NTableCols` / `# TableCol`,
   restricted to the format's measure columns

The result is the header measures followed by the row measures, in file order.
*/

mod header;
mod table;

pub use table::ColumnDescriptor;

use crate::{Hemisphere, Measure, StatsError, StatsFormat, StatsResult};
use crate::walk::read_text;
use std::path::{Path, PathBuf};
use tracing::debug;

const HEMI_MARKER: &str = "# hemi";
const INPUT_VOLUME_MARKER: &str = "# InVolFile ";
const STATS_EXTENSION: &str = ".stats";

/// Parser bound to one recognized stats file
#[derive(Debug, Clone)]
pub struct StatsParser {
    path: PathBuf,
    stem: String,
    format: StatsFormat,
}

impl StatsParser {
    /// Check whether a path names a recognized stats file
    pub fn can_parse(path: &Path) -> bool {
        file_name(path).and_then(StatsFormat::from_file_name).is_some()
    }

    /// Create a parser, or `None` if the file name is not recognized
    pub fn new(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let name = file_name(&path)?;
        let format = StatsFormat::from_file_name(name)?;
        let stem = name.strip_suffix(STATS_EXTENSION).unwrap_or(name).to_string();
        Some(Self { path, stem, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> StatsFormat {
        self.format
    }

    /// Read and parse the file
    pub fn parse(&self) -> StatsResult<Vec<Measure>> {
        let content = read_text(&self.path)?;
        self.parse_str(&content)
    }

    /// Parse file content as if it had been read from this parser's path
    pub fn parse_str(&self, content: &str) -> StatsResult<Vec<Measure>> {
        let lines: Vec<&str> = content.lines().map(str::trim).collect();
        let hemisphere = resolve_hemisphere(&lines, &self.stem);

        let mut measures = Vec::new();
        if self.format.has_header_measures() {
            let header = header::parse_header_measures(&lines, &self.stem, hemisphere)
                .map_err(|reason| self.malformed(reason))?;
            measures.extend(header);
        }

        let columns = table::parse_columns(&lines).map_err(|reason| self.malformed(reason))?;
        let row_hemisphere = if self.format.prefixes_rows_with_hemisphere() {
            hemisphere
        } else {
            None
        };
        let rows = table::parse_rows(
            &lines,
            &columns,
            self.format.measure_columns(),
            &self.stem,
            row_hemisphere,
        )
        .map_err(|reason| self.malformed(reason))?;
        measures.extend(rows);

        debug!(
            file = %self.path.display(),
            format = ?self.format,
            measures = measures.len(),
            "Parsed stats file"
        );
        Ok(measures)
    }

    fn malformed(&self, reason: String) -> StatsError {
        StatsError::MalformedStatsFile {
            path: self.path.clone(),
            reason,
        }
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

/// Resolve the hemisphere tag of a stats file
///
/// Order: `# hemi` marker, then the file name of the `# InVolFile` path
/// (`../surf/lh.w-g.pct.mgh` -> `lh`), then the stats file stem itself.
/// Marker values other than `lh`/`rh` are ignored.
fn resolve_hemisphere(lines: &[&str], stem: &str) -> Option<Hemisphere> {
    lines
        .iter()
        .filter_map(|line| line.strip_prefix(HEMI_MARKER))
        .find_map(|value| Hemisphere::from_tag(value.trim()))
        .or_else(|| {
            lines
                .iter()
                .find_map(|line| line.strip_prefix(INPUT_VOLUME_MARKER))
                .and_then(input_volume_hemisphere)
        })
        .or_else(|| Hemisphere::from_file_stem(stem))
}

fn input_volume_hemisphere(path: &str) -> Option<Hemisphere> {
    let file = path.trim().rsplit('/').next()?;
    Hemisphere::from_tag(file.split('.').next()?)
}
