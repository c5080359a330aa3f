// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-fsp-stats` or `--debug-fsp-pipeline` to turn
//! on debug output for a single crate.

use std::collections::BTreeSet;
use std::env;

use crate::{crate_target, KNOWN_CRATES};

const DEFAULT_LEVEL: &str = "info";

/// Debug flags collected from the command line and `FSP_DEBUG`
///
/// # Example
/// ```rust
/// use fsp_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-fsp-stats".to_string()]);
/// assert!(flags.is_enabled("fsp-stats"));
/// assert_eq!(flags.to_filter_string(), "fsp_stats=debug,info");
/// ```
#[derive(Debug, Clone)]
pub struct CrateDebugFlags {
    pub enabled_crates: BTreeSet<String>,
    base_level: String,
}

impl Default for CrateDebugFlags {
    fn default() -> Self {
        Self {
            enabled_crates: BTreeSet::new(),
            base_level: DEFAULT_LEVEL.to_string(),
        }
    }
}

impl CrateDebugFlags {
    /// Parse debug flags from command-line arguments
    ///
    /// Looks for `--debug-{crate-name}` and `--debug-all`; other arguments are ignored.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = Self::default();

        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
                continue;
            }

            if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enabled_crates.insert(crate_name.to_string());
            }
        }

        flags
    }

    /// Level applied to everything that has no debug flag
    pub fn with_base_level(mut self, level: impl Into<String>) -> Self {
        self.base_level = level.into().to_lowercase();
        self
    }

    pub fn base_level(&self) -> &str {
        &self.base_level
    }

    pub fn enable_all(&mut self) {
        self.enabled_crates
            .extend(KNOWN_CRATES.iter().map(|name| name.to_string()));
    }

    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// `DEBUG` for flagged crates, `INFO` otherwise
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Filter directive for `EnvFilter`
    ///
    /// Format: `fsp_stats=debug,fsp_pipeline=debug,info`, or just the base
    /// level when no crate is flagged.
    pub fn to_filter_string(&self) -> String {
        self.enabled_crates
            .iter()
            .map(|name| format!("{}=debug", crate_target(name)))
            .chain(std::iter::once(self.base_level.clone()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Collect debug flags from `std::env::args()` and `FSP_DEBUG`
///
/// `FSP_DEBUG` holds comma-separated crate names, or `all`.
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());
    if let Ok(value) = env::var("FSP_DEBUG") {
        apply_debug_env(&mut flags, &value);
    }
    flags
}

fn apply_debug_env(flags: &mut CrateDebugFlags, value: &str) {
    if value.trim() == "all" {
        flags.enable_all();
        return;
    }
    for crate_name in value.split(',') {
        let crate_name = crate_name.trim();
        if !crate_name.is_empty() {
            flags.enabled_crates.insert(crate_name.to_string());
        }
    }
}

/// Help text for the debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  FSP_DEBUG={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  FSP_DEBUG=all                             Enable debug for all crates

Examples:
  --debug-fsp-stats
  --debug-fsp-stats --debug-fsp-pipeline
  FSP_DEBUG=fsp-stats,fsp-pipeline
"#,
        KNOWN_CRATES.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_crate_flag() {
        let flags = CrateDebugFlags::from_args(vec![
            "fs-pipeline".to_string(),
            "--debug-fsp-stats".to_string(),
        ]);
        assert!(flags.is_enabled("fsp-stats"));
        assert!(!flags.is_enabled("fsp-pipeline"));
    }

    #[test]
    fn test_debug_all() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-all".to_string()]);
        for crate_name in KNOWN_CRATES {
            assert!(flags.is_enabled(crate_name), "{} should be enabled", crate_name);
        }
    }

    #[test]
    fn test_filter_string_uses_targets() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-fsp-pipeline".to_string()])
            .with_base_level("WARN");
        assert_eq!(flags.to_filter_string(), "fsp_pipeline=debug,warn");

        assert_eq!(CrateDebugFlags::default().to_filter_string(), "info");
    }

    #[test]
    fn test_log_level() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-fsp-stats".to_string()]);
        assert_eq!(flags.log_level("fsp-stats"), tracing::Level::DEBUG);
        assert_eq!(flags.log_level("fsp-config"), tracing::Level::INFO);
    }

    #[test]
    fn test_env_value() {
        let mut flags = CrateDebugFlags::default();
        apply_debug_env(&mut flags, "fsp-stats, fsp-colorlut,");
        assert_eq!(flags.enabled_crates.len(), 2);

        let mut flags = CrateDebugFlags::default();
        apply_debug_env(&mut flags, "all");
        assert_eq!(flags.enabled_crates.len(), KNOWN_CRATES.len());
    }
}
