use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::info;

use super::table::{CoverageRow, CoverageTable, YEAR_COUNT};

/// Sheet carrying the share of one- and two-year-olds per municipality.
pub const DEFAULT_SHEET: &str = "KOSandel120000";

/// Zero-based index of the header row; data starts on the row after it.
pub const HEADER_ROW: usize = 3;

/// First data-row index of the trailing metadata footer. Everything from
/// here on is dropped. Positional contract: the source layout is fixed.
pub const FOOTER_START: usize = 724;

/// Last data-row index (inclusive) whose label is reset before the drop.
pub const FOOTER_LABEL_END: usize = 779;

/// Textual markers the source uses for missing observations.
pub const MISSING_MARKERS: [&str; 2] = [".", ".."];

#[derive(Debug, thiserror::Error)]
pub enum WorkbookError {
    #[error("unable to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("expected a label column and nine year columns, found {found}")]
    ColumnCount { found: usize },
}

/// One data row as read from the sheet, before cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub label: String,
    pub values: [Option<f64>; YEAR_COUNT],
}

/// The sheet's data rows prior to the cleaning passes.
///
/// Kept separate from [`CoverageTable`] so the cleaning contract can be
/// exercised without an actual workbook file.
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    rows: Vec<RawRow>,
}

impl RawSheet {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn from_range(range: &calamine::Range<Data>) -> Result<Self, WorkbookError> {
        let mut rows = Vec::new();
        for cells in range.rows().skip(HEADER_ROW + 1) {
            if cells.len() < YEAR_COUNT + 1 {
                return Err(WorkbookError::ColumnCount { found: cells.len() });
            }
            let mut values = [None; YEAR_COUNT];
            for (slot, cell) in values.iter_mut().zip(&cells[1..=YEAR_COUNT]) {
                *slot = parse_cell(cell);
            }
            rows.push(RawRow {
                label: label_text(&cells[0]),
                values,
            });
        }
        Ok(Self { rows })
    }

    /// Apply the cleaning passes in source order: clip out-of-range
    /// percentages, reset the footer labels, split the label column, then
    /// drop the footer block.
    pub fn clean(mut self) -> CoverageTable {
        for row in &mut self.rows {
            for value in &mut row.values {
                if value.is_some_and(|v| v > 100.0) {
                    *value = None;
                }
            }
        }

        let end = self.rows.len().min(FOOTER_LABEL_END + 1);
        for row in self.rows.iter_mut().take(end).skip(FOOTER_START) {
            row.label = "NaN".to_string();
        }

        for row in &mut self.rows {
            row.label = split_label(&row.label);
        }

        self.rows.truncate(FOOTER_START);

        CoverageTable::new(
            self.rows
                .into_iter()
                .map(|row| CoverageRow {
                    municipality: row.label,
                    values: row.values,
                })
                .collect(),
        )
    }
}

/// Extract the municipality name from a "code name" label.
///
/// Splits once on the first space and keeps the remainder; a label without
/// a space yields an empty name (the row stays but is unaddressable).
pub fn split_label(label: &str) -> String {
    label
        .split_once(' ')
        .map(|(_, rest)| rest.to_string())
        .unwrap_or_default()
}

fn parse_cell(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(value) => Some(*value),
        Data::Int(value) => Some(*value as f64),
        Data::String(text) => {
            let text = text.trim();
            if MISSING_MARKERS.contains(&text) {
                None
            } else {
                text.parse().ok()
            }
        }
        _ => None,
    }
}

fn label_text(cell: &Data) -> String {
    match cell {
        Data::String(text) => text.clone(),
        Data::Float(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        _ => String::new(),
    }
}

/// Read and clean the coverage sheet from a workbook on disk.
pub fn load_workbook(path: &Path, sheet: &str) -> Result<CoverageTable, WorkbookError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range(sheet)?;
    let raw = RawSheet::from_range(&range)?;
    let raw_len = raw.len();
    let table = raw.clean();
    info!(
        rows = table.len(),
        dropped = raw_len.saturating_sub(table.len()),
        sheet,
        "coverage sheet loaded"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler_row(index: usize) -> RawRow {
        RawRow {
            label: format!("{index:04} Kommune {index}"),
            values: [Some(50.0); YEAR_COUNT],
        }
    }

    /// A sheet long enough to carry the footer block.
    fn sheet_with_footer() -> RawSheet {
        RawSheet::new((0..FOOTER_LABEL_END + 1).map(filler_row).collect())
    }

    #[test]
    fn values_above_100_become_missing() {
        let mut rows = vec![filler_row(0)];
        rows[0].values[2] = Some(154.3);
        rows[0].values[4] = Some(100.0);
        let table = RawSheet::new(rows).clean();
        let row = &table.rows()[0];
        assert_eq!(row.values[2], None);
        assert_eq!(row.values[4], Some(100.0));
        assert!(row
            .values
            .iter()
            .flatten()
            .all(|value| (0.0..=100.0).contains(value)));
    }

    #[test]
    fn footer_block_is_dropped_entirely() {
        let sheet = sheet_with_footer();
        let raw_len = sheet.len();
        let footer_len = raw_len - FOOTER_START;
        let table = sheet.clean();
        assert_eq!(table.len(), raw_len - footer_len);
        assert!(table
            .rows()
            .iter()
            .all(|row| !row.municipality.is_empty()));
    }

    #[test]
    fn short_sheet_is_untouched_by_footer_trim() {
        let table = RawSheet::new((0..10).map(filler_row).collect()).clean();
        assert_eq!(table.len(), 10);
    }

    #[test]
    fn labels_split_on_first_space() {
        assert_eq!(split_label("0301 Oslo"), "Oslo");
        assert_eq!(split_label("5007 Nordre Follo"), "Nordre Follo");
        assert_eq!(split_label("NaN"), "");
        assert_eq!(split_label(""), "");
    }

    #[test]
    fn cell_sentinels_map_to_missing() {
        assert_eq!(parse_cell(&Data::String(".".to_string())), None);
        assert_eq!(parse_cell(&Data::String("..".to_string())), None);
        assert_eq!(parse_cell(&Data::String("garbage".to_string())), None);
        assert_eq!(parse_cell(&Data::String("87.5".to_string())), Some(87.5));
        assert_eq!(parse_cell(&Data::Float(42.0)), Some(42.0));
        assert_eq!(parse_cell(&Data::Int(42)), Some(42.0));
        assert_eq!(parse_cell(&Data::Empty), None);
    }
}
