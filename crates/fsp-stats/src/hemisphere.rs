// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Brain hemisphere tags (`lh` / `rh`)

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hemisphere {
    #[serde(rename = "lh")]
    Left,
    #[serde(rename = "rh")]
    Right,
}

impl Hemisphere {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hemisphere::Left => "lh",
            Hemisphere::Right => "rh",
        }
    }

    /// Parse an exact `lh` / `rh` tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "lh" => Some(Hemisphere::Left),
            "rh" => Some(Hemisphere::Right),
            _ => None,
        }
    }

    /// Infer the hemisphere from a stats file stem such as `lh.aparc`
    ///
    /// `lh` is checked first, so a stem mentioning both resolves to left.
    pub fn from_file_stem(stem: &str) -> Option<Self> {
        if stem.contains("lh") {
            Some(Hemisphere::Left)
        } else if stem.contains("rh") {
            Some(Hemisphere::Right)
        } else {
            None
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_is_exact() {
        assert_eq!(Hemisphere::from_tag("lh"), Some(Hemisphere::Left));
        assert_eq!(Hemisphere::from_tag("rh"), Some(Hemisphere::Right));
        assert_eq!(Hemisphere::from_tag("LH"), None);
        assert_eq!(Hemisphere::from_tag("norm"), None);
    }

    #[test]
    fn test_from_file_stem() {
        assert_eq!(Hemisphere::from_file_stem("lh.aparc"), Some(Hemisphere::Left));
        assert_eq!(Hemisphere::from_file_stem("rh.w-g.pct"), Some(Hemisphere::Right));
        assert_eq!(Hemisphere::from_file_stem("aseg"), None);
        assert_eq!(Hemisphere::from_file_stem("wmparc"), None);
    }
}
