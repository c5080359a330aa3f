// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! `# Measure` header lines

use crate::{Hemisphere, Measure};

const MEASURE_MARKER: &str = "# Measure";

/// Parse every `# Measure` line into a measure without a kind
///
/// Lines carry `group, name, description, value, units`. Some files written
/// by FreeSurfer 6.0 drop the comma between name and description, leaving
/// four fields; the name is then the first word of the second field.
pub(crate) fn parse_header_measures(
    lines: &[&str],
    stem: &str,
    hemisphere: Option<Hemisphere>,
) -> Result<Vec<Measure>, String> {
    let mut measures = Vec::new();

    for line in lines.iter().filter(|line| line.starts_with(MEASURE_MARKER)) {
        let pieces: Vec<&str> = line[MEASURE_MARKER.len()..]
            .split(',')
            .map(str::trim)
            .collect();

        let (name, description, value, units) = match pieces.as_slice() {
            [_, name_and_description, value, units] => {
                let mut words = name_and_description.split_whitespace();
                let name = words
                    .next()
                    .ok_or_else(|| format!("empty measure name in '{}'", line))?;
                (name, words.collect::<Vec<_>>().join(" "), *value, *units)
            }
            [_, name, description, value, units] => (*name, description.to_string(), *value, *units),
            _ => {
                return Err(format!(
                    "expected 4 or 5 comma-separated fields, found {} in '{}'",
                    pieces.len(),
                    line
                ))
            }
        };

        let structure = match hemisphere {
            Some(hemi) => format!("{}_{}", hemi, name),
            None => name.to_string(),
        };
        measures.push(Measure::new(
            stem,
            &structure,
            "",
            value,
            units,
            Some(description),
        ));
    }

    Ok(measures)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_fields() {
        let lines = ["# Measure BrainSeg, BrainSegVol-to-eTIV, Ratio, 0.75, unitless"];
        let measures = parse_header_measures(&lines, "aseg", None).unwrap();

        assert_eq!(measures.len(), 1);
        assert_eq!(measures[0].structure(), "brainsegvol_to_etiv");
        assert_eq!(measures[0].value_as_float(), 0.75);
    }

    #[test]
    fn test_hemisphere_prefix() {
        let lines = ["# Measure Cortex, MeanThickness, Mean Thickness, 2.5, mm"];
        let measures =
            parse_header_measures(&lines, "rh.aparc.DKTatlas", Some(Hemisphere::Right)).unwrap();

        assert_eq!(measures[0].name(), "aparc.DKTatlas_rh_meanthickness");
    }

    #[test]
    fn test_wrong_field_count() {
        let lines = ["# Measure BrainSeg, 12"];
        assert!(parse_header_measures(&lines, "aseg", None).is_err());
    }

    #[test]
    fn test_non_numeric_value_is_zero() {
        let lines = ["# Measure Mask, MaskVol, Mask Volume, NaN, mm^3"];
        let measures = parse_header_measures(&lines, "aseg", None).unwrap();
        assert_eq!(measures[0].value_as_float(), 0.0);
    }
}
