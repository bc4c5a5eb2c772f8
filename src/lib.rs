//! # Sheet Export
//!
//! Extracts rectangular regions of tabular data from a spreadsheet and renders
//! them as CSV, XML, HTML or JSON.
//!
//! ## Features
//!
//! - **Column model**: column specifications such as `A, {B, C}, D` select text
//!   columns and pair link columns with the text they decorate
//! - **Row extent detection**: the number of data rows is found by stride probing
//!   instead of scanning whole columns
//! - **Row filters**: rows are dropped by exact match on a filter column, or when
//!   column A is blank, consistently across every column of a form
//! - **Four output formats** sharing one intermediate representation
//! - **Saved settings**: the forms used with each format are kept in an injected
//!   key-value store
//! - **Grid accessors**: an in-memory workbook and an `.xlsx` loader
//!
//! ## Usage
//!
//! ```
//! use sheet_export::export;
//! use sheet_export::ExtractionRequest;
//! use sheet_export::MemoryWorkbook;
//!
//! let mut workbook = MemoryWorkbook::new();
//! workbook.add_sheet("People", vec![vec!["Name", "Site"], vec!["Ann", "a.example"]]);
//!
//! let request = ExtractionRequest::new().columns("A, B");
//! let output = export(&workbook, "json", &[request]).unwrap();
//! assert_eq!(output, vec![r#"[{"name":"Ann","site":"a.example"}]"#]);
//! ```
pub mod database;
pub mod error;
pub mod export;
pub mod extension;
mod helpers;
pub mod spreadsheet;

pub use crate::database::ColumnRecord;
pub use crate::database::ColumnSpec;
pub use crate::database::Title;
pub use crate::error::SheetExportError;
pub use crate::export::export;
pub use crate::export::ExportFormat;
pub use crate::export::Exporter;
pub use crate::extension::settings::load_settings;
pub use crate::extension::settings::save_settings;
pub use crate::extension::settings::MemorySettingsStore;
pub use crate::extension::settings::SettingsStore;
pub use crate::extension::ExtractionRequest;
pub use crate::spreadsheet::open_xlsx;
pub use crate::spreadsheet::sheet_options;
pub use crate::spreadsheet::Grid;
pub use crate::spreadsheet::MemoryWorkbook;
pub use crate::spreadsheet::SheetHandle;
