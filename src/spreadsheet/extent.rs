//! Row extent resolution.
//!
//! Finds how many rows of a column are populated below a start row without
//! reading the column cell by cell: the tail of the column is probed in strides
//! of [`PROBE_STRIDE`] rows until it is blank, then the last stride is walked
//! one row at a time to find the exact boundary.
use crate::error::SheetExportError;
use crate::spreadsheet::reference::letter_to_column;
use crate::spreadsheet::Grid;
use crate::spreadsheet::SheetHandle;
use log::debug;

/// Rows skipped per coarse probe.
pub const PROBE_STRIDE: usize = 50;

/// Returned by [`count_column`] when the column is not a valid reference.
pub const INVALID_COLUMN: i64 = -1;

/// Counts the data rows of a column given by letter, starting at `start_row`.
///
/// Returns [`INVALID_COLUMN`] when `column` is not a single column letter;
/// callers must check for it before using the result as a count.
pub fn count_column(
    grid: &dyn Grid,
    sheet: &SheetHandle,
    column: &str,
    start_row: usize,
) -> Result<i64, SheetExportError> {
    match letter_to_column(column) {
        Some(column) => Ok(resolve_row_extent(grid, sheet, column, start_row)? as i64),
        None => Ok(INVALID_COLUMN),
    }
}

/// Counts the rows from `start_row` up to the last populated row of `column`.
///
/// Every probe asks whether everything from a row to the end of the sheet is
/// blank, so blank cells in the middle of the data are counted.
pub fn resolve_row_extent(
    grid: &dyn Grid,
    sheet: &SheetHandle,
    column: usize,
    start_row: usize,
) -> Result<usize, SheetExportError> {
    let max_rows = grid.max_rows(sheet)?;
    if start_row == 0 || start_row > max_rows {
        return Ok(0);
    }
    let total = max_rows - start_row + 1;
    let tail_is_blank =
        |offset: usize| grid.probe_blank(sheet, column, start_row + offset, total - offset);

    let mut count = 0usize;
    while count < total && !tail_is_blank(count)? {
        count += PROBE_STRIDE;
    }
    if count == 0 {
        return Ok(0);
    }

    // Overshot by at most one stride: walk the skipped rows one at a time
    let upper = count.min(total);
    let mut count = count - PROBE_STRIDE;
    while count < upper && !tail_is_blank(count)? {
        count += 1;
    }
    debug!(
        "sheet '{}' column {} holds {} rows from row {}",
        sheet.name, column, count, start_row
    );
    Ok(count)
}
