use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Reader};

use super::push_bounded;
use crate::error::{GatherError, Result};

/// Joins non-empty cells with spaces, sheet by sheet and row by row, until `budget` characters.
pub(super) fn extract_spreadsheet_text(path: &Path, budget: usize) -> Result<String> {
    let mut workbook =
        open_workbook_auto(path).map_err(|error| GatherError::extraction(path, error))?;

    let mut text = String::new();
    let mut chars = 0usize;
    let mut failed_sheets = 0usize;

    'sheets: for sheet in workbook.sheet_names() {
        let range = match workbook.worksheet_range(&sheet) {
            Ok(range) => range,
            Err(error) => {
                failed_sheets += 1;
                log::debug!(
                    "spreadsheet sheet read failed path={} sheet={} error={}",
                    path.display(),
                    sheet,
                    error
                );
                continue;
            }
        };
        for row in range.rows() {
            for cell in row {
                let Some(value) = cell_text(cell) else {
                    continue;
                };
                if !text.is_empty() && push_bounded(&mut text, &mut chars, " ", budget) {
                    break 'sheets;
                }
                if push_bounded(&mut text, &mut chars, &value, budget) {
                    break 'sheets;
                }
            }
        }
    }

    if text.is_empty() && failed_sheets > 0 {
        return Err(GatherError::extraction(
            path,
            format!("no readable cells in {failed_sheets} sheet(s)"),
        ));
    }
    Ok(text)
}

/// Renders a cell the way it reads in a sheet; dates come out as `YYYY-MM-DD HH:MM:SS`.
fn cell_text(cell: &Data) -> Option<String> {
    let value = match cell {
        Data::Empty => return None,
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => cell.to_string(),
        },
        _ => cell.to_string(),
    };
    (!value.is_empty()).then_some(value)
}
