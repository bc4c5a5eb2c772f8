//! # Grid Access Module
//!
//! This module defines the contract the exporter core requires from its host
//! spreadsheet: sheet lookup, column range reads of display text, header reads,
//! blank probes and sheet extents. The core never mutates a sheet, it only reads
//! through a [`Grid`].
//!
//! Two implementations ship with the crate: [`MemoryWorkbook`] keeps display
//! strings in memory, and [`open_xlsx`] loads an `.xlsx` file into one.
use crate::error::SheetExportError;
use quick_xml::escape::escape;
use thiserror::Error;

pub mod extent;
pub mod memory;
pub mod reference;
pub mod xlsx;

pub use memory::MemoryWorkbook;
pub use xlsx::open_xlsx;
pub use xlsx::read_xlsx;

/// Errors raised while resolving or reading sheets.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// A sheet identifier was given but no sheet carries it
    #[error("Invalid sheet reference: no sheet with id {0}")]
    InvalidSheetReference(u32),

    /// The workbook has no sheet to fall back on
    #[error("Spreadsheet contains no sheets")]
    SpreadsheetEmptyError,

    #[error("Invalid row range: {row_count} rows from row {start_row}")]
    InvalidRowRange { start_row: usize, row_count: usize },

    /// A required part of a spreadsheet file is missing
    #[error("Missing '{0}' in spreadsheet file")]
    FileError(String),

    /// A cell holds a value that cannot be turned into display text
    #[error("Invalid cell value in sheet '{sheet}' at '{reference}': {message}")]
    CellValueError {
        sheet: String,
        reference: String,
        message: String,
    },
}

/// Identifies one sheet of a workbook.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SheetHandle {
    /// Stable numeric sheet id
    pub id: u32,
    /// Display name of the sheet
    pub name: String,
}

/// Read-only access to the cells of a host spreadsheet.
///
/// Rows and columns are 1-based. Every value is the cell's display text; blank
/// cells read as the empty string.
pub trait Grid {
    /// Lists every sheet of the workbook in tab order.
    fn list_sheets(&self) -> Vec<SheetHandle>;

    /// Returns the sheet the user currently has open.
    fn current_sheet(&self) -> Result<SheetHandle, SheetExportError>;

    /// Index of the last column holding any content (0 for an empty sheet).
    fn last_column(&self, sheet: &SheetHandle) -> Result<usize, SheetExportError>;

    /// Number of rows the sheet provides, populated or not.
    fn max_rows(&self, sheet: &SheetHandle) -> Result<usize, SheetExportError>;

    /// Reads exactly `row_count` display values of one column, starting at
    /// `start_row`. Rows past the end of the sheet read as empty strings.
    fn read_range(
        &self,
        sheet: &SheetHandle,
        start_row: usize,
        column: usize,
        row_count: usize,
    ) -> Result<Vec<String>, SheetExportError>;

    /// Resolves a sheet by id, or the current sheet when no id is given.
    fn resolve_sheet(&self, id: Option<u32>) -> Result<SheetHandle, SheetExportError> {
        match id {
            Some(id) => self
                .list_sheets()
                .into_iter()
                .find(|sheet| sheet.id == id)
                .ok_or_else(|| SpreadsheetError::InvalidSheetReference(id).into()),
            None => self.current_sheet(),
        }
    }

    /// Reads the display text of a column's header cell (row 1).
    fn read_header_cell(&self, sheet: &SheetHandle, column: usize) -> Result<String, SheetExportError> {
        Ok(self
            .read_range(sheet, 1, column, 1)?
            .into_iter()
            .next()
            .unwrap_or_default())
    }

    /// Checks whether `window` rows of a column starting at `row` are all blank.
    fn probe_blank(
        &self,
        sheet: &SheetHandle,
        column: usize,
        row: usize,
        window: usize,
    ) -> Result<bool, SheetExportError> {
        Ok(self
            .read_range(sheet, row, column, window)?
            .iter()
            .all(|value| value.is_empty()))
    }
}

/// Builds the sheet picker markup: a "Current Sheet" entry followed by one
/// `<option>` per sheet, valued by sheet id.
pub fn sheet_options(grid: &dyn Grid) -> String {
    let mut options = String::from(r#"<option value="" selected>Current Sheet</option>"#);
    for sheet in grid.list_sheets() {
        options.push_str(&format!(
            r#"<option value="{}">{}</option>"#,
            sheet.id,
            escape(sheet.name.as_str())
        ));
    }
    options
}
