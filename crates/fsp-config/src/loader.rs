// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones win:
//! 1. TOML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, FspConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// File name searched for when no path is given
pub const CONFIG_FILE_NAME: &str = "fs_pipeline.toml";

/// Find the configuration file
///
/// Search order:
/// 1. `FSP_CONFIG_PATH` environment variable
/// 2. Current working directory: `./fs_pipeline.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("FSP_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by FSP_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        search_paths.extend(
            cwd.ancestors()
                .skip(1)
                .take(5)
                .map(|dir| dir.join(CONFIG_FILE_NAME)),
        );
    }

    if let Some(path) = search_paths.iter().find(|path| path.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "Configuration file '{}' not found in any of these locations:\n{}\n\nSet FSP_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file and apply overrides
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the config file is not found or contains invalid TOML.
/// Call [`validate_config`](crate::validate_config) afterwards for value checks.
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<FspConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: FspConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_bool(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `FSP_SUBJECTS_DIR` -> `paths.subjects_dir`
/// - `FSP_SCANS_DIR` -> `paths.scans_dir`
/// - `FSP_WORK_DIR` -> `paths.work_dir`
/// - `FREESURFER_HOME` -> `paths.freesurfer_home`
/// - `FSP_OPENMP_THREADS` -> `recon.openmp_threads`
/// - `FSP_LOG_LEVEL` -> `logging.level`
/// - `FSP_PARSE_HSFS` -> `hsfs.parse`
///
/// Values that do not parse are ignored.
pub fn apply_environment_overrides(config: &mut FspConfig) {
    if let Ok(value) = env::var("FSP_SUBJECTS_DIR") {
        config.paths.subjects_dir = PathBuf::from(value);
    }
    if let Ok(value) = env::var("FSP_SCANS_DIR") {
        config.paths.scans_dir = PathBuf::from(value);
    }
    if let Ok(value) = env::var("FSP_WORK_DIR") {
        config.paths.work_dir = PathBuf::from(value);
    }
    if let Ok(value) = env::var("FREESURFER_HOME") {
        config.paths.freesurfer_home = PathBuf::from(value);
    }

    if let Ok(value) = env::var("FSP_OPENMP_THREADS") {
        if let Ok(threads) = value.parse::<usize>() {
            config.recon.openmp_threads = threads;
        }
    }
    if let Ok(value) = env::var("FSP_LOG_LEVEL") {
        config.logging.level = value;
    }
    if let Ok(value) = env::var("FSP_PARSE_HSFS") {
        config.hsfs.parse = parse_bool(&value);
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - CLI values keyed by name (e.g. `{"subjects_dir": "/data/out", "openmp_threads": "8"}`)
pub fn apply_cli_overrides(config: &mut FspConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("subjects_dir") {
        config.paths.subjects_dir = PathBuf::from(value);
    }
    if let Some(value) = cli_args.get("scans_dir") {
        config.paths.scans_dir = PathBuf::from(value);
    }
    if let Some(value) = cli_args.get("work_dir") {
        config.paths.work_dir = PathBuf::from(value);
    }

    if let Some(value) = cli_args.get("openmp_threads") {
        if let Ok(threads) = value.parse::<usize>() {
            config.recon.openmp_threads = threads;
        }
    }
    if let Some(value) = cli_args.get("use_t2") {
        config.recon.use_t2 = parse_bool(value);
    }

    if let Some(value) = cli_args.get("hsfs_t1") {
        config.hsfs.t1 = parse_bool(value);
    }
    if let Some(value) = cli_args.get("hsfs_t2") {
        config.hsfs.t2 = parse_bool(value);
    }
    if let Some(value) = cli_args.get("hsfs_t1t2") {
        config.hsfs.t1t2 = parse_bool(value);
    }
    if let Some(value) = cli_args.get("parse_hsfs") {
        config.hsfs.parse = parse_bool(value);
    }

    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    if let Some(value) = cli_args.get("log_dir") {
        config.logging.log_dir = Some(PathBuf::from(value));
    }

    if let Some(value) = cli_args.get("dry_run") {
        config.execution.dry_run = parse_bool(value);
    }
    if let Some(value) = cli_args.get("stop_on_first_failure") {
        config.execution.stop_on_first_failure = parse_bool(value);
    }
}
