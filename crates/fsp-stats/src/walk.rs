// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Recursive directory listing and file reading

use crate::{StatsError, StatsResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Read a text file, replacing invalid UTF-8 with U+FFFD
///
/// Header lines such as `# user` or `# cmdline` may carry Latin-1 bytes.
pub(crate) fn read_text(path: &Path) -> StatsResult<String> {
    let bytes = fs::read(path).map_err(|source| StatsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// List every file below `dir`
///
/// Files of a directory come first in name order, then its subdirectories
/// are visited in name order. Symlinked directories are not followed.
pub(crate) fn walk_files(dir: &Path) -> StatsResult<Vec<PathBuf>> {
    let read_error = |source: std::io::Error| StatsError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(read_error)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_error)?;
    entries.sort();

    let mut files = Vec::new();
    let mut subdirs = Vec::new();
    for path in entries {
        if path.is_dir() {
            if !path.is_symlink() {
                subdirs.push(path);
            }
        } else {
            files.push(path);
        }
    }

    for subdir in subdirs {
        files.extend(walk_files(&subdir)?);
    }
    Ok(files)
}
