use crate::error::SheetExportError;
use crate::spreadsheet::Grid;
use crate::spreadsheet::SheetHandle;
use crate::spreadsheet::SpreadsheetError;
use std::collections::HashMap;

/// In-memory sheet holding the display text of every populated cell.
#[derive(Clone, Debug)]
pub struct MemorySheet {
    pub(crate) handle: SheetHandle,
    /// Display text indexed by 1-based (row, column)
    cells: HashMap<(usize, usize), String>,
    /// Rows the sheet provides, populated or not
    row_limit: usize,
    last_row: usize,
    last_column: usize,
}

impl MemorySheet {
    /// Default row count of a fresh sheet, mirroring common spreadsheet hosts.
    pub const DEFAULT_ROW_LIMIT: usize = 1000;

    pub(crate) fn new(handle: SheetHandle) -> Self {
        Self {
            handle,
            cells: HashMap::new(),
            row_limit: Self::DEFAULT_ROW_LIMIT,
            last_row: 0,
            last_column: 0,
        }
    }

    /// Stores a cell value. Empty values clear the cell.
    pub fn set(&mut self, row: usize, column: usize, value: impl Into<String>) {
        let value = value.into();
        if row == 0 || column == 0 {
            return;
        }
        if value.is_empty() {
            self.cells.remove(&(row, column));
            return;
        }
        self.last_row = self.last_row.max(row);
        self.last_column = self.last_column.max(column);
        self.row_limit = self.row_limit.max(row);
        self.cells.insert((row, column), value);
    }

    /// Returns the display text of a cell, empty when blank.
    pub fn get(&self, row: usize, column: usize) -> &str {
        self.cells.get(&(row, column)).map(String::as_str).unwrap_or("")
    }

    /// Last row holding any content.
    pub fn last_row(&self) -> usize {
        self.last_row
    }
}

/// A workbook kept entirely in memory.
///
/// Sheet ids are assigned in insertion order starting at 0; the first sheet is
/// the current one until [`MemoryWorkbook::set_current`] says otherwise.
#[derive(Clone, Debug, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<MemorySheet>,
    current: Option<u32>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sheet built from row-major values and returns its id.
    pub fn add_sheet<R, C, S>(&mut self, name: &str, rows: R) -> u32
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = self
            .sheets
            .iter()
            .map(|sheet| sheet.handle.id + 1)
            .max()
            .unwrap_or(0);
        self.add_sheet_with_id(id, name, rows);
        id
    }

    /// Appends a sheet carrying an explicit id.
    pub fn add_sheet_with_id<R, C, S>(&mut self, id: u32, name: &str, rows: R) -> &mut MemorySheet
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sheet = MemorySheet::new(SheetHandle {
            id,
            name: name.to_owned(),
        });
        for (row, values) in rows.into_iter().enumerate() {
            for (column, value) in values.into_iter().enumerate() {
                sheet.set(row + 1, column + 1, value);
            }
        }
        let index = self.sheets.len();
        self.sheets.push(sheet);
        &mut self.sheets[index]
    }

    /// Marks the sheet with the given id as the current one.
    pub fn set_current(&mut self, id: u32) -> Result<(), SheetExportError> {
        if self.sheet(id).is_none() {
            Err(SpreadsheetError::InvalidSheetReference(id))?
        }
        self.current = Some(id);
        Ok(())
    }

    /// Overrides how many rows a sheet provides.
    pub fn set_row_limit(&mut self, id: u32, row_limit: usize) -> Result<(), SheetExportError> {
        let sheet = self
            .sheets
            .iter_mut()
            .find(|sheet| sheet.handle.id == id)
            .ok_or(SpreadsheetError::InvalidSheetReference(id))?;
        sheet.row_limit = row_limit.max(sheet.last_row);
        Ok(())
    }

    pub fn sheet(&self, id: u32) -> Option<&MemorySheet> {
        self.sheets.iter().find(|sheet| sheet.handle.id == id)
    }

    fn lookup(&self, handle: &SheetHandle) -> Result<&MemorySheet, SheetExportError> {
        Ok(self
            .sheet(handle.id)
            .ok_or(SpreadsheetError::InvalidSheetReference(handle.id))?)
    }
}

impl Grid for MemoryWorkbook {
    fn list_sheets(&self) -> Vec<SheetHandle> {
        self.sheets.iter().map(|sheet| sheet.handle.clone()).collect()
    }

    fn current_sheet(&self) -> Result<SheetHandle, SheetExportError> {
        let sheet = match self.current {
            Some(id) => self.sheet(id),
            None => self.sheets.first(),
        };
        Ok(sheet
            .map(|sheet| sheet.handle.clone())
            .ok_or(SpreadsheetError::SpreadsheetEmptyError)?)
    }

    fn last_column(&self, sheet: &SheetHandle) -> Result<usize, SheetExportError> {
        Ok(self.lookup(sheet)?.last_column)
    }

    fn max_rows(&self, sheet: &SheetHandle) -> Result<usize, SheetExportError> {
        Ok(self.lookup(sheet)?.row_limit)
    }

    fn read_range(
        &self,
        sheet: &SheetHandle,
        start_row: usize,
        column: usize,
        row_count: usize,
    ) -> Result<Vec<String>, SheetExportError> {
        let end = start_row
            .checked_add(row_count)
            .ok_or(SpreadsheetError::InvalidRowRange { start_row, row_count })?;
        let sheet = self.lookup(sheet)?;
        Ok((start_row..end).map(|row| sheet.get(row, column).to_owned()).collect())
    }

    fn probe_blank(
        &self,
        sheet: &SheetHandle,
        column: usize,
        row: usize,
        window: usize,
    ) -> Result<bool, SheetExportError> {
        let sheet = self.lookup(sheet)?;
        let upper = sheet.last_row.min(row.saturating_add(window).saturating_sub(1));
        Ok((row..=upper).all(|row| sheet.get(row, column).is_empty()))
    }
}
