// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# FreeSurfer Subject Pipeline

Orchestrates the per-subject workflow around the FreeSurfer toolchain:

- **scans**: subject discovery and `*T1*` / `*T2*` scan lookup
- **command**: `recon-all` and `mri_segstats` command lines
- **runner**: sequential stage execution with a per-subject report
- **sink**: `{subject}_stats.json` output built from `fsp-stats`

## Example

```rust,no_run
use fsp_pipeline::{DryRunRunner, PipelineOptions, PipelineRunner};

let config = fsp_config::load_config(None, None)?;
let options = PipelineOptions::from_config(&config)?;
let subjects = fsp_pipeline::discover_subjects(&options.scans_dir, &config.execution.subjects)?;

let report = PipelineRunner::new(options, DryRunRunner).run(&subjects);
assert!(report.is_success());
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod command;
pub mod error;
pub mod runner;
pub mod scans;
pub mod sink;

pub use command::{HippocampalSubfields, HsfsMode, ReconAll, SegStats, ToolCommand};
pub use error::{PipelineError, PipelineResult};
pub use runner::{
    DryRunRunner, PipelineOptions, PipelineRunner, ProcessRunner, RunReport, RunSummary,
    SubjectFailure, SubjectOutcome, ToolRunner,
};
pub use scans::{discover_subjects, find_scans, SubjectScans};
pub use sink::{output_path, JsonifyStats, STATS_JSON_SUFFIX};
