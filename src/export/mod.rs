//! # Export Module
//!
//! Serializes collected forms into CSV, XML, HTML or JSON. Every exporter maps
//! one form (an ordered list of [`ColumnRecord`]s) to one string and never
//! touches the grid; [`export`] ties collection and rendering together.
use crate::database::ColumnRecord;
use crate::database::Form;
use crate::error::ResultMessage;
use crate::error::SheetExportError;
use crate::extension::collect_forms;
use crate::extension::ExtractionRequest;
use crate::spreadsheet::Grid;
use log::debug;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod csv;
pub mod html;
pub mod json;
pub mod xml;

pub use self::csv::CsvExporter;
pub use self::html::HtmlExporter;
pub use self::json::JsonExporter;
pub use self::xml::XmlExporter;

/// Errors raised while rendering forms.
#[derive(Error, Debug, PartialEq)]
pub enum ExportError {
    /// XML attributes are named after titles, so every column needs one
    #[error("Column titles are required for XML export (column {0} is untitled)")]
    MissingTitlesForXml(usize),

    /// Two columns map to the same XML attribute name
    #[error("Duplicate XML attribute '{0}'")]
    DuplicateXmlAttribute(String),

    #[error("Column '{column}' holds {actual} rows where {expected} were expected")]
    InconsistentColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown export format '{0}', expected one of csv, xml, html, json")]
    UnknownExportFormat(String),
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Xml,
    Html,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Csv,
        ExportFormat::Xml,
        ExportFormat::Html,
        ExportFormat::Json,
    ];

    /// Format tag as used by the sidebar and the settings keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xml => "xml",
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
        }
    }

    /// Returns the exporter rendering this format.
    pub fn exporter(&self) -> &'static dyn Exporter {
        match self {
            ExportFormat::Csv => &CsvExporter,
            ExportFormat::Xml => &XmlExporter,
            ExportFormat::Html => &HtmlExporter,
            ExportFormat::Json => &JsonExporter,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        ExportFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == tag)
            .ok_or_else(|| ExportError::UnknownExportFormat(tag.to_owned()))
    }
}

/// Renders collected forms into one output format.
pub trait Exporter: Send + Sync {
    fn format(&self) -> ExportFormat;

    /// Renders the form at 0-based position `index` of the batch.
    fn render(&self, index: usize, form: &[ColumnRecord]) -> Result<String, SheetExportError>;

    /// Renders every form in order, stopping at the first failure.
    fn render_all(&self, forms: &[Form]) -> Result<Vec<String>, SheetExportError> {
        forms
            .iter()
            .enumerate()
            .map(|(index, form)| self.render(index, form).with_prefix(&format!("Form {}", index + 1)))
            .collect()
    }
}

/// Collects every request from the grid and renders it as `format`
/// (`csv`, `xml`, `html` or `json`). Returns one string per request, in order.
///
/// The first failing request aborts the whole batch.
pub fn export(
    grid: &dyn Grid,
    format: &str,
    requests: &[ExtractionRequest],
) -> Result<Vec<String>, SheetExportError> {
    let format = ExportFormat::from_str(format)?;
    let forms = collect_forms(grid, requests)?;
    debug!("exporting {} forms as {}", forms.len(), format);
    format.exporter().render_all(&forms)
}

/// Number of rows shared by every column of a form.
///
/// Fails when a record, or its link list, holds a different number of rows
/// than the first record.
pub(crate) fn common_row_count(form: &[ColumnRecord]) -> Result<usize, ExportError> {
    let Some(first) = form.first() else {
        return Ok(0);
    };
    let expected = first.rows.len();
    for record in form {
        let lengths = std::iter::once(record.rows.len()).chain(record.row_links.as_ref().map(Vec::len));
        for actual in lengths {
            if actual != expected {
                return Err(ExportError::InconsistentColumnLength {
                    column: record.title.to_string(),
                    expected,
                    actual,
                });
            }
        }
    }
    Ok(expected)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::database::Title;
    use crate::spreadsheet::MemoryWorkbook;
    use pretty_assertions::assert_eq;

    pub(crate) fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    pub(crate) fn named(title: &str, rows: &[&str]) -> ColumnRecord {
        ColumnRecord::new(Title::Named(title.to_string()), strings(rows))
    }

    pub(crate) fn linked(title: &str, rows: &[&str], links: &[&str]) -> ColumnRecord {
        named(title, rows).with_links(strings(links))
    }

    pub(crate) fn untitled(rows: &[&str]) -> ColumnRecord {
        ColumnRecord::new(Title::Untitled, strings(rows))
    }

    /// `A, {B, C}` titled Name and Site over two rows.
    pub(crate) fn sample_form() -> Form {
        vec![
            named("Name", &["Ann", "Bo"]),
            linked("Site", &["Ann", "Bo"], &["a.example", "b.example"]),
        ]
    }

    fn sample_workbook() -> MemoryWorkbook {
        let mut workbook = MemoryWorkbook::new();
        workbook.add_sheet(
            "Sites",
            vec![
                vec!["Name", "URL", "Site"],
                vec!["Ann", "a.example", "Ann"],
                vec!["Bo", "b.example", "Bo"],
            ],
        );
        workbook
    }

    #[test]
    fn format_tags() {
        for format in ExportFormat::ALL {
            assert_eq!(ExportFormat::from_str(format.as_str()), Ok(format));
            assert_eq!(format.exporter().format(), format);
        }
        assert_eq!(
            ExportFormat::from_str("pdf"),
            Err(ExportError::UnknownExportFormat("pdf".to_string()))
        );
        assert!(ExportFormat::from_str("CSV").is_err());
    }

    #[test]
    fn row_count_of_consistent_form() {
        assert_eq!(common_row_count(&sample_form()), Ok(2));
        assert_eq!(common_row_count(&[]), Ok(0));
    }

    #[test]
    fn diverging_lengths() {
        let form = vec![named("Name", &["Ann", "Bo"]), named("Age", &["3"])];
        assert_eq!(
            common_row_count(&form),
            Err(ExportError::InconsistentColumnLength {
                column: "Age".to_string(),
                expected: 2,
                actual: 1,
            })
        );

        let form = vec![linked("Site", &["Ann"], &[])];
        assert!(common_row_count(&form).is_err());
    }

    #[test]
    fn export_collects_and_renders() {
        let requests = vec![
            ExtractionRequest::new().columns("A, {B, C}").titles("Name, Site"),
            ExtractionRequest::new().columns("A"),
        ];
        let output = export(&sample_workbook(), "csv", &requests).unwrap();
        assert_eq!(
            output,
            vec![
                concat!(
                    r#""Name","Site""#,
                    "\n",
                    r#""Ann","=HYPERLINK(""a.example"",""Ann"")""#,
                    "\n",
                    r#""Bo","=HYPERLINK(""b.example"",""Bo"")""#,
                )
                .to_string(),
                "\"Name\"\n\"Ann\"\n\"Bo\"".to_string(),
            ]
        );
    }

    #[test]
    fn export_json_example() {
        let requests = vec![ExtractionRequest::new().columns("A, {B, C}").titles("Name, Site")];
        let output = export(&sample_workbook(), "json", &requests).unwrap();
        assert_eq!(
            output,
            vec![concat!(
                r#"[{"name":"Ann","site":"Ann","site_link":"a.example"},"#,
                r#"{"name":"Bo","site":"Bo","site_link":"b.example"}]"#
            )
            .to_string()]
        );
    }

    #[test]
    fn export_rejects_unknown_format_before_reading() {
        let requests = vec![ExtractionRequest::new().sheet_id(42)];
        let error = export(&sample_workbook(), "yaml", &requests).unwrap_err();
        assert!(matches!(
            error,
            SheetExportError::ExportError(ExportError::UnknownExportFormat(_))
        ));
    }

    #[test]
    fn export_aborts_on_failing_form() {
        let requests = vec![
            ExtractionRequest::new().columns("A"),
            ExtractionRequest::new().columns("A").first_row_is_data(true),
        ];
        let error = export(&sample_workbook(), "xml", &requests).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Form 2: Column titles are required for XML export (column 1 is untitled)"
        );
        assert_eq!(export(&sample_workbook(), "xml", &requests[..1]).unwrap().len(), 1);
    }

    #[test]
    fn export_without_forms() {
        assert_eq!(export(&sample_workbook(), "html", &[]).unwrap(), Vec::<String>::new());
    }
}
