// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# FreeSurfer Stats Aggregation

Turns the plain-text statistics written by `recon-all` into a two-level
measure map (`category -> field -> value`):

- `parser` - format-dispatching parser for the recognized `*.stats` files
- `subject` - walks `{subject}/stats` and folds every parsed file
- `hsfs` - hippocampal subfield volumes from the `hippoSfVolumes` files in `{subject}/mri`

## Data Flow

```text
{subject}/stats/{name}.stats              ──► StatsParser ──► Vec<Measure> ──────┐
                                                                                 ├──► MeasureMap
{subject}/mri/?h.hippoSfVolumes-{id}.txt  ──► HsfsParser  ──► Vec<HsfsMeasure> ──┘
```

Numeric tokens never fail to convert: anything that is not a finite float
(including `NaN`) becomes `0.0`, see [`value_as_float`].

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod format;
pub mod hemisphere;
pub mod hsfs;
pub mod measure;
pub mod parser;
pub mod snapshot;
pub mod subject;

mod walk;

pub use error::{StatsError, StatsResult};
pub use format::StatsFormat;
pub use hemisphere::Hemisphere;
pub use hsfs::{HsfsMeasure, HsfsParser, HsfsSubject};
pub use measure::{
    fold_measures, merge_measure_maps, value_as_float, Measure, MeasureMap, NamedMeasure,
};
pub use parser::{ColumnDescriptor, StatsParser};
pub use snapshot::{LoadedSubject, SkippedFile};
pub use subject::Subject;
