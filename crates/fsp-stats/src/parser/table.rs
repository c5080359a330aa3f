// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Tabular section: column declarations and data rows

use crate::format::STRUCT_NAME_COLUMN;
use crate::{Hemisphere, Measure};

const NTABLECOLS_MARKER: &str = "# NTableCols";
const TABLECOL_MARKER: &str = "# TableCol";

/// One declared table column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Zero-based position in a data row
    pub index: usize,
    pub column_header: String,
    pub field_name: String,
    pub units: String,
}

/// Split `" 3 FieldName Number of Voxels"` into `(3, "FieldName", "Number of Voxels")`
fn parse_table_col(rest: &str) -> Option<(usize, &str, &str)> {
    let (index, rest) = rest.trim_start().split_once(char::is_whitespace)?;
    let index = index.parse().ok()?;
    let rest = rest.trim_start();
    let (key, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    Some((index, key, value.trim()))
}

/// Build the column list from `# NTableCols` and `# TableCol` lines
pub(crate) fn parse_columns(lines: &[&str]) -> Result<Vec<ColumnDescriptor>, String> {
    let count = lines
        .iter()
        .find_map(|line| line.strip_prefix(NTABLECOLS_MARKER))
        .ok_or_else(|| format!("missing '{}' declaration", NTABLECOLS_MARKER))?;
    let count: usize = count
        .trim()
        .parse()
        .map_err(|e| format!("invalid '{}' value '{}': {}", NTABLECOLS_MARKER, count.trim(), e))?;

    let declarations: Vec<(usize, &str, &str)> = lines
        .iter()
        .filter_map(|line| line.strip_prefix(TABLECOL_MARKER))
        .filter_map(parse_table_col)
        .collect();

    let lookup = |column: usize, key: &str| -> Result<String, String> {
        declarations
            .iter()
            .find(|(index, k, _)| *index == column && *k == key)
            .map(|(_, _, value)| value.to_string())
            .ok_or_else(|| format!("column {} has no {} declaration", column, key))
    };

    (1..=count)
        .map(|column| -> Result<ColumnDescriptor, String> {
            Ok(ColumnDescriptor {
                index: column - 1,
                column_header: lookup(column, "ColHeader")?,
                field_name: lookup(column, "FieldName")?,
                units: lookup(column, "Units")?,
            })
        })
        .collect()
}

fn find_column<'a>(
    columns: &'a [ColumnDescriptor],
    header: &str,
) -> Result<&'a ColumnDescriptor, String> {
    columns
        .iter()
        .find(|column| column.column_header == header)
        .ok_or_else(|| format!("table has no '{}' column", header))
}

fn cell<'a>(cells: &[&'a str], column: &ColumnDescriptor, line_number: usize) -> Result<&'a str, String> {
    cells.get(column.index).copied().ok_or_else(|| {
        format!(
            "line {} has {} values, '{}' expects at least {}",
            line_number,
            cells.len(),
            column.column_header,
            column.index + 1
        )
    })
}

/// Turn every data row into one measure per requested column
pub(crate) fn parse_rows(
    lines: &[&str],
    columns: &[ColumnDescriptor],
    measure_columns: &[&str],
    stem: &str,
    hemisphere: Option<Hemisphere>,
) -> Result<Vec<Measure>, String> {
    let struct_column = find_column(columns, STRUCT_NAME_COLUMN)?;
    let wanted = measure_columns
        .iter()
        .map(|header| find_column(columns, header))
        .collect::<Result<Vec<_>, _>>()?;

    let mut measures = Vec::new();
    let rows = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

    for (index, line) in rows {
        let line_number = index + 1;
        let cells: Vec<&str> = line.split_whitespace().collect();

        let structure = cell(&cells, struct_column, line_number)?.replace('-', "_");
        let structure = match hemisphere {
            Some(hemi) => format!("{}_{}", hemi, structure),
            None => structure,
        };

        for column in &wanted {
            let value = cell(&cells, column, line_number)?;
            measures.push(Measure::new(
                stem,
                &structure,
                &column.column_header,
                value,
                &column.units,
                Some(column.field_name.clone()),
            ));
        }
    }

    Ok(measures)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[&str] = &[
        "# NTableCols 3",
        "# TableCol  1 ColHeader StructName",
        "# TableCol  1 FieldName Structure Name",
        "# TableCol  1 Units     NA",
        "# TableCol  2 ColHeader NVoxels",
        "# TableCol  2 FieldName Number of Voxels",
        "# TableCol  2 Units     unitless",
        "# TableCol  3 ColHeader Volume_mm3",
        "# TableCol  3 FieldName Volume",
        "# TableCol  3 Units     mm^3",
    ];

    #[test]
    fn test_parse_columns() {
        let columns = parse_columns(COLUMNS).unwrap();

        assert_eq!(columns.len(), 3);
        assert_eq!(
            columns[1],
            ColumnDescriptor {
                index: 1,
                column_header: "NVoxels".to_string(),
                field_name: "Number of Voxels".to_string(),
                units: "unitless".to_string(),
            }
        );
        assert_eq!(columns[2].units, "mm^3");
    }

    #[test]
    fn test_index_ten_does_not_shadow_index_one() {
        let mut lines = vec!["# NTableCols 1", "# TableCol 10 ColHeader Decoy"];
        lines.extend_from_slice(&COLUMNS[1..4]);
        let columns = parse_columns(&lines).unwrap();
        assert_eq!(columns[0].column_header, "StructName");
    }

    #[test]
    fn test_missing_units_is_an_error() {
        let lines: Vec<&str> = COLUMNS.iter().copied().filter(|l| !l.contains("3 Units")).collect();
        assert!(parse_columns(&lines).is_err());
    }

    #[test]
    fn test_rows_without_hemisphere() {
        let columns = parse_columns(COLUMNS).unwrap();
        let mut lines = COLUMNS.to_vec();
        lines.extend(["Left-Hippocampus 100 100.0", "", "3rd-Ventricle 20 NaN"]);

        let measures =
            parse_rows(&lines, &columns, &["NVoxels", "Volume_mm3"], "aseg", None).unwrap();

        assert_eq!(measures.len(), 4);
        assert_eq!(measures[0].name(), "aseg_left_hippocampus_nvoxels");
        assert_eq!(measures[1].name(), "aseg_left_hippocampus_volume_mm3");
        assert_eq!(measures[3].structure(), "3rd_ventricle");
        assert_eq!(measures[3].value_as_float(), 0.0);
    }

    #[test]
    fn test_rows_with_hemisphere() {
        let columns = parse_columns(COLUMNS).unwrap();
        let mut lines = COLUMNS.to_vec();
        lines.push("bankssts 10 20");

        let measures = parse_rows(
            &lines,
            &columns,
            &["NVoxels"],
            "rh.aparc",
            Some(Hemisphere::Right),
        )
        .unwrap();

        assert_eq!(measures[0].name(), "aparc_rh_bankssts_nvoxels");
    }

    #[test]
    fn test_short_row_and_unknown_column() {
        let columns = parse_columns(COLUMNS).unwrap();
        let mut lines = COLUMNS.to_vec();
        lines.push("Left-Hippocampus 100");

        assert!(parse_rows(&lines, &columns, &["Volume_mm3"], "aseg", None).is_err());
        assert!(parse_rows(&lines, &columns, &["ThickAvg"], "aseg", None).is_err());
    }
}
