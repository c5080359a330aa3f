// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! jsonify-stats - export stats of reconstructed subjects as JSON
//!
//! Usage:
//!   jsonify-stats /data/subjects sub-001 sub-002 --hsfs
//!   jsonify-stats /data/subjects sub-001 --stdout

use anyhow::{bail, Result};
use clap::Parser;
use fsp_observability::{init_logging_default, parse_debug_flags};
use fsp_pipeline::JsonifyStats;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};

/// Write {subject}/stats/{subject}_stats.json for each subject
#[derive(Parser, Debug)]
#[command(name = "jsonify-stats", version, author, long_about = None)]
struct Args {
    /// FreeSurfer subjects directory
    subjects_dir: PathBuf,

    /// Subject ids inside the subjects directory
    #[arg(required = true)]
    subject_ids: Vec<String>,

    /// Include hippocampal subfield volumes from mri/
    #[arg(long)]
    hsfs: bool,

    /// Print the JSON instead of writing the file
    #[arg(long)]
    stdout: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse_from(env::args().filter(|arg| !arg.starts_with("--debug-")));
    let _logging = init_logging_default(&parse_debug_flags().with_base_level(&args.log_level))?;

    let mut failed = 0;
    for subject_id in &args.subject_ids {
        let jsonify = JsonifyStats::new(&args.subjects_dir, subject_id).with_hsfs(args.hsfs);

        let result = if args.stdout {
            jsonify.collect().and_then(|measures| {
                let mut out = std::io::stdout().lock();
                serde_json::to_writer(&mut out, &measures)
                    .map_err(std::io::Error::from)
                    .and_then(|()| writeln!(out))
                    .map_err(|source| fsp_pipeline::PipelineError::SerializationWriteFailure {
                        path: PathBuf::from("<stdout>"),
                        source,
                    })
            })
        } else {
            jsonify.run().map(|path| {
                info!(subject = %subject_id, file = %path.display(), "Done");
            })
        };

        if let Err(e) = result {
            error!(subject = %subject_id, "{}", e);
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{} of {} subjects failed", failed, args.subject_ids.len());
    }
    Ok(())
}
