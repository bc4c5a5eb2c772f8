use crate::database::ColumnRecord;
use crate::database::ColumnSpec;
use crate::database::Form;
use crate::database::RowFilter;
use crate::database::Title;
use crate::error::ResultMessage;
use crate::error::SheetExportError;
use crate::extension::CollectError;
use crate::extension::ExtractionPlan;
use crate::extension::ExtractionRequest;
use crate::spreadsheet::extent::count_column;
use crate::spreadsheet::extent::INVALID_COLUMN;
use crate::spreadsheet::reference::column_name;
use crate::spreadsheet::Grid;
use crate::spreadsheet::SheetHandle;
use log::debug;

/// Column whose extent sets the row count when none is given.
const EXTENT_COLUMN: &str = "A";

/// Collects the columns of every request, in request order.
///
/// The first failing request aborts the batch; its error names the 1-based
/// form number.
pub fn collect_forms(grid: &dyn Grid, requests: &[ExtractionRequest]) -> Result<Vec<Form>, SheetExportError> {
    requests
        .iter()
        .enumerate()
        .map(|(index, request)| collect_form(grid, request).with_prefix(&format!("Form {}", index + 1)))
        .collect()
}

/// Reads the columns selected by one request from the grid.
///
/// Every returned record, and every link list, holds the same number of rows.
pub fn collect_form(grid: &dyn Grid, request: &ExtractionRequest) -> Result<Form, SheetExportError> {
    let plan = ExtractionPlan::try_from(request)?;
    let sheet = grid.resolve_sheet(plan.sheet_id)?;
    let columns = match &plan.columns {
        Some(columns) => columns.to_owned(),
        None => ColumnSpec::all(grid.last_column(&sheet)?),
    };
    let start_row = plan.data_start_row;

    // Rows past the end of the sheet are blank, so the window stops there
    let available = grid.max_rows(&sheet)?.saturating_add(1).saturating_sub(start_row);
    let row_count = match plan.row_count {
        Some(row_count) => row_count.min(available),
        None => match count_column(grid, &sheet, EXTENT_COLUMN, start_row)? {
            INVALID_COLUMN => Err(CollectError::InvalidExtentColumn(EXTENT_COLUMN.to_owned()))?,
            count => count as usize,
        },
    };
    let titles = resolve_titles(grid, &sheet, &plan, &columns)?;

    let filter = match &plan.filter {
        Some(filter) => {
            let source = grid.read_range(&sheet, start_row, filter.column, row_count)?;
            let mask = RowFilter::new(&source, &filter.matches);
            debug!(
                "filter on column {} keeps {} of {} rows",
                column_name(filter.column),
                mask.retained(),
                row_count
            );
            Some(mask)
        }
        None => None,
    };
    let window = |column: usize| -> Result<Vec<String>, SheetExportError> {
        let values = grid.read_range(&sheet, start_row, column, row_count)?;
        Ok(match &filter {
            Some(mask) => mask.apply(&values),
            None => values,
        })
    };

    let mut form = Form::with_capacity(columns.len());
    for (column, title) in columns.iter().zip(titles) {
        let record = ColumnRecord::new(title, window(column.text_column())?);
        form.push(match column.link_column() {
            Some(link) => record.with_links(window(link)?),
            None => record,
        });
    }
    debug!(
        "collected {} columns from sheet '{}' starting at row {}",
        form.len(),
        sheet.name,
        start_row
    );
    Ok(form)
}

/// Resolves one title per column.
///
/// Explicit titles are used in order; otherwise titles come from the header row
/// of each text column. Without a header row (row 1 holds data) and without
/// explicit titles every column is untitled.
fn resolve_titles(
    grid: &dyn Grid,
    sheet: &SheetHandle,
    plan: &ExtractionPlan,
    columns: &[ColumnSpec],
) -> Result<Vec<Title>, SheetExportError> {
    if let Some(titles) = &plan.titles {
        if titles.len() < columns.len() {
            Err(CollectError::MissingTitles(format!(
                "{} titles given for {} columns",
                titles.len(),
                columns.len()
            )))?;
        }
        return Ok(titles.iter().take(columns.len()).cloned().map(Title::Named).collect());
    }
    if plan.first_row_is_data() {
        return Ok(vec![Title::Untitled; columns.len()]);
    }
    if columns.is_empty() {
        Err(CollectError::MissingTitles(format!("sheet '{}' has no columns", sheet.name)))?;
    }

    columns
        .iter()
        .map(|column| -> Result<Title, SheetExportError> {
            let text_column = column.text_column();
            let header = grid.read_header_cell(sheet, text_column)?;
            if header.is_empty() {
                return Err(CollectError::MissingTitles(format!(
                    "header cell {}{} is blank",
                    column_name(text_column),
                    ExtractionPlan::HEADER_ROW
                ))
                .into());
            }
            Ok(Title::Named(header))
        })
        .collect()
}
