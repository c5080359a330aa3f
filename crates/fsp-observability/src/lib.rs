// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # fsp-observability
//!
//! Logging setup shared by the fs-pipeline binaries.
//!
//! - `cli`: per-crate debug flags (`--debug-fsp-stats`, `--debug-all`, `FSP_DEBUG`)
//! - `init`: `tracing` subscriber with a console layer and optional JSON log
//!   files in a timestamped run folder

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Workspace crate names accepted by `--debug-<crate>`
pub const KNOWN_CRATES: &[&str] = &[
    "fsp-stats",
    "fsp-colorlut",
    "fsp-pipeline",
    "fsp-config",
    "fs-pipeline",
];

/// Tracing target of a crate name (`fsp-stats` -> `fsp_stats`)
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
