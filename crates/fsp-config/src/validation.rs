// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Collects every problem in one pass so the user can fix them together.

use crate::types::RECON_DIRECTIVES;
use crate::{ConfigError, ConfigResult, FspConfig};

/// Upper bound for `logging.retention_days` (100 years)
pub const MAX_RETENTION_DAYS: u64 = 36_500;

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Required directories
/// - Known `recon-all` directive and log level
/// - Positive thread count and retention limits
/// - Segment ids when the segstats pass is on
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every failed check
pub fn validate_config(config: &FspConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_required_fields(config, &mut errors);
    validate_value_ranges(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_required_fields(config: &FspConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.paths.subjects_dir().is_err() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "paths.subjects_dir".to_string(),
        });
    }
    if config.paths.scans_dir().is_err() && config.execution.subjects.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "paths.scans_dir".to_string(),
        });
    }
    if config.segstats.enabled && config.segstats.summary_file.trim().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "segstats.summary_file".to_string(),
        });
    }
}

fn validate_value_ranges(config: &FspConfig, errors: &mut Vec<ConfigValidationError>) {
    if !RECON_DIRECTIVES.contains(&config.recon.directive.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "recon.directive".to_string(),
            reason: format!("unknown directive '{}'", config.recon.directive),
        });
    }

    if config.recon.openmp_threads == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "recon.openmp_threads".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    if let Err(e) = config.logging.level() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: e.to_string(),
        });
    }

    if config.logging.retention_days > MAX_RETENTION_DAYS {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.retention_days".to_string(),
            reason: format!("must be at most {}", MAX_RETENTION_DAYS),
        });
    }

    if config.logging.retention_runs == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.retention_runs".to_string(),
            reason: "must keep at least the current run".to_string(),
        });
    }

    if config.segstats.enabled && config.segstats.segment_ids.is_empty() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "segstats.segment_ids".to_string(),
            reason: "at least one segment id is required".to_string(),
        });
    }
}
