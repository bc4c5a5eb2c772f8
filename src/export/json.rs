use crate::database::ColumnRecord;
use crate::error::SheetExportError;
use crate::export::common_row_count;
use crate::export::ExportFormat;
use crate::export::Exporter;
use crate::spreadsheet::reference::column_name;
use serde_json::Map;
use serde_json::Value;

/// An array of row objects per form, keyed by lower-cased title.
#[derive(Copy, Clone, Debug, Default)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }

    fn render(&self, _index: usize, form: &[ColumnRecord]) -> Result<String, SheetExportError> {
        let row_count = common_row_count(form)?;
        let keys: Vec<String> = form
            .iter()
            .enumerate()
            .map(|(column, record)| match record.title.as_str() {
                Some(title) => title.to_lowercase(),
                // Untitled columns are keyed by position: a, b, c...
                None => column_name(column + 1).to_lowercase(),
            })
            .collect();

        let rows: Vec<Value> = (0..row_count)
            .map(|row| {
                let mut object = Map::new();
                for (record, key) in form.iter().zip(&keys) {
                    let (text, link) = record.cell(row);
                    object.insert(key.to_owned(), Value::from(text));
                    if let Some(link) = link {
                        object.insert(format!("{}_link", key), Value::from(link));
                    }
                }
                Value::Object(object)
            })
            .collect();

        Ok(serde_json::to_string(&rows)?)
    }
}
