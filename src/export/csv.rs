use crate::database::is_titled;
use crate::database::ColumnRecord;
use crate::error::SheetExportError;
use crate::export::common_row_count;
use crate::export::ExportFormat;
use crate::export::Exporter;

/// Comma-separated values, every cell double-quoted.
///
/// Linked cells become `=HYPERLINK("url","text")` formulas so spreadsheet hosts
/// importing the file rebuild the links.
#[derive(Copy, Clone, Debug, Default)]
pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }

    fn render(&self, _index: usize, form: &[ColumnRecord]) -> Result<String, SheetExportError> {
        let row_count = common_row_count(form)?;
        let mut lines = Vec::with_capacity(row_count + 1);
        if !form.is_empty() && is_titled(form) {
            lines.push(join_line(form.iter().map(|record| quote(&record.title.to_string()))));
        }
        for row in 0..row_count {
            lines.push(join_line(form.iter().map(|record| match record.cell(row) {
                (text, Some(link)) => quote(&hyperlink(link, text)),
                (text, None) => quote(text),
            })));
        }
        Ok(lines.join("\n"))
    }
}

fn join_line(cells: impl Iterator<Item = String>) -> String {
    cells.collect::<Vec<_>>().join(",")
}

/// Wraps a cell in double quotes, doubling the quotes it contains.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Spreadsheet formula rendering `text` as a link to `link`.
fn hyperlink(link: &str, text: &str) -> String {
    format!("=HYPERLINK({},{})", quote(link), quote(text))
}
