// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Measure model and the flattening into a category map

use indexmap::IndexMap;
use serde::Serialize;

/// `category -> field -> value`, in discovery order
pub type MeasureMap = IndexMap<String, IndexMap<String, f64>>;

/// Convert a numeric token, mapping anything unusable to `0.0`
///
/// A token that contains `nan` (any case), does not parse as a float, or
/// parses to an infinity yields `0.0`; every other token yields its exact
/// `f64` value. The result is always finite, so it serializes as a JSON number.
pub fn value_as_float(token: &str) -> f64 {
    let token = token.trim();
    if token.to_ascii_lowercase().contains("nan") {
        return 0.0;
    }
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Anything that can be flattened into a [`MeasureMap`]
pub trait NamedMeasure {
    /// Composite key; the text before the first `_` is the category
    fn name(&self) -> String;

    fn value_as_float(&self) -> f64;
}

/// One numeric datum read from a stats file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measure {
    source_file_stem: String,
    structure: String,
    measure_kind: String,
    value: f64,
    units: String,
    description: Option<String>,
}

impl Measure {
    /// Build a measure from raw file tokens
    ///
    /// # Arguments
    /// * `stats_file_stem` - file name without `.stats` (e.g. `lh.aparc`); `lh.`/`rh.` are removed
    /// * `structure` - region name; lowercased, hyphens become underscores
    /// * `measure_kind` - column header, empty for header measures
    /// * `value_token` - raw value, converted with [`value_as_float`]
    pub fn new(
        stats_file_stem: &str,
        structure: &str,
        measure_kind: &str,
        value_token: &str,
        units: &str,
        description: Option<String>,
    ) -> Self {
        Self {
            source_file_stem: stats_file_stem.replace("rh.", "").replace("lh.", ""),
            structure: structure.replace('-', "_").to_lowercase(),
            measure_kind: measure_kind.to_lowercase(),
            value: value_as_float(value_token),
            units: units.to_lowercase(),
            description,
        }
    }

    pub fn source_file_stem(&self) -> &str {
        &self.source_file_stem
    }

    pub fn structure(&self) -> &str {
        &self.structure
    }

    pub fn measure_kind(&self) -> &str {
        &self.measure_kind
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn name(&self) -> String {
        if self.measure_kind.is_empty() {
            format!("{}_{}", self.source_file_stem, self.structure)
        } else {
            format!(
                "{}_{}_{}",
                self.source_file_stem, self.structure, self.measure_kind
            )
        }
    }

    pub fn value_as_float(&self) -> f64 {
        if self.value.is_finite() {
            self.value
        } else {
            0.0
        }
    }
}

impl NamedMeasure for Measure {
    fn name(&self) -> String {
        Measure::name(self)
    }

    fn value_as_float(&self) -> f64 {
        Measure::value_as_float(self)
    }
}

/// Split a measure name into `(category, field)` at the first underscore
fn split_name(name: &str) -> (&str, &str) {
    name.split_once('_').unwrap_or((name, ""))
}

/// Fold measures into a category map
///
/// A repeated `(category, field)` keeps its first position and takes the
/// value of the last measure seen.
pub fn fold_measures<'a, M, I>(measures: I) -> MeasureMap
where
    M: NamedMeasure + 'a,
    I: IntoIterator<Item = &'a M>,
{
    let mut map = MeasureMap::new();
    for measure in measures {
        let name = measure.name();
        let (category, field) = split_name(&name);
        map.entry(category.to_string())
            .or_default()
            .insert(field.to_string(), measure.value_as_float());
    }
    map
}

/// Merge `other` into `target` category by category
pub fn merge_measure_maps(target: &mut MeasureMap, other: MeasureMap) {
    for (category, fields) in other {
        target.entry(category).or_default().extend(fields);
    }
}
