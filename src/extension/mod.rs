//! # Extraction Module
//!
//! Turns user-supplied extraction requests ("forms") into the intermediate
//! representation consumed by the exporters. A request keeps the textual wire
//! format the settings store persists; [`ExtractionPlan`] is its typed form,
//! built once at the start of collection.
use crate::database::column::parse_columns;
use crate::database::ColumnSpec;
use crate::error::SheetExportError;
use crate::spreadsheet::reference::letter_to_column;
use serde::de;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod collect;
pub mod settings;

pub use collect::collect_form;
pub use collect::collect_forms;

/// Errors raised while collecting the data of a request.
#[derive(Error, Debug, PartialEq)]
pub enum CollectError {
    /// Titles were neither given nor derivable from the header row
    #[error("Missing column titles: {0}")]
    MissingTitles(String),

    /// The filter column is not a single column letter
    #[error("Invalid filter column '{0}'")]
    InvalidFilterColumn(String),

    #[error("Cannot count rows of column '{0}'")]
    InvalidExtentColumn(String),
}

/// One independently configured extraction job ("form").
///
/// Field names on the wire follow the sidebar form the settings were saved from.
/// Values are accepted typed or as the raw strings of the sidebar inputs: a
/// numeric string for `sheet-id` and `size` (empty meaning unset) and the radio
/// value `"data"` for `row-1-data`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExtractionRequest {
    /// Sheet to read, the current sheet when absent
    #[serde(deserialize_with = "deserialize_form_number")]
    pub sheet_id: Option<u32>,
    /// Column specification such as `A, {B, C}`; every column when absent
    pub columns: Option<String>,
    /// Comma-separated titles; read from the header row when absent
    pub titles: Option<String>,
    /// Row 1 holds data rather than headers
    #[serde(rename = "row-1-data", deserialize_with = "deserialize_row_choice")]
    pub first_row_is_data: bool,
    /// Number of data rows; resolved from column A when absent
    #[serde(deserialize_with = "deserialize_form_number")]
    pub size: Option<usize>,
    /// Letter of the column the filter criteria are matched against
    pub filter_column: Option<String>,
    /// Comma-separated values whose rows are removed
    pub filter_criteria: Option<String>,
    /// Remove rows whose filter column (column A by default) is blank
    #[serde(rename = "remove-empty")]
    pub remove_empty_rows: bool,
}

impl ExtractionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet_id(mut self, sheet_id: u32) -> Self {
        self.sheet_id = Some(sheet_id);
        self
    }

    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = Some(columns.to_owned());
        self
    }

    pub fn titles(mut self, titles: &str) -> Self {
        self.titles = Some(titles.to_owned());
        self
    }

    pub fn first_row_is_data(mut self, first_row_is_data: bool) -> Self {
        self.first_row_is_data = first_row_is_data;
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn filter(mut self, column: &str, criteria: &str) -> Self {
        self.filter_column = Some(column.to_owned());
        self.filter_criteria = Some(criteria.to_owned());
        self
    }

    pub fn remove_empty_rows(mut self, remove_empty_rows: bool) -> Self {
        self.remove_empty_rows = remove_empty_rows;
        self
    }
}

/// A form value, either typed or as the text of the input it came from.
#[derive(Deserialize)]
#[serde(untagged)]
enum FormValue<T> {
    Typed(T),
    Text(String),
}

/// Radio value marking row 1 as data.
const ROW_CHOICE_DATA: &str = "data";

fn deserialize_form_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    match Option::<FormValue<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(FormValue::Typed(value)) => Ok(Some(value)),
        Some(FormValue::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(FormValue::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid number '{}': {}", text, e))),
    }
}

fn deserialize_row_choice<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match FormValue::<bool>::deserialize(deserializer)? {
        FormValue::Typed(flag) => Ok(flag),
        FormValue::Text(choice) => Ok(choice == ROW_CHOICE_DATA),
    }
}

/// Which rows to drop: those whose value in `column` is one of `matches`.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterSpec {
    pub column: usize,
    pub matches: HashSet<String>,
}

/// Typed form of an [`ExtractionRequest`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractionPlan {
    pub sheet_id: Option<u32>,
    /// None selects every column of the sheet
    pub columns: Option<Vec<ColumnSpec>>,
    pub titles: Option<Vec<String>>,
    /// First data row, 1-based
    pub data_start_row: usize,
    pub row_count: Option<usize>,
    pub filter: Option<FilterSpec>,
}

impl ExtractionPlan {
    /// Row holding the headers when row 1 is not data.
    pub const HEADER_ROW: usize = 1;

    pub fn first_row_is_data(&self) -> bool {
        self.data_start_row == Self::HEADER_ROW
    }
}

impl TryFrom<&ExtractionRequest> for ExtractionPlan {
    type Error = SheetExportError;

    fn try_from(request: &ExtractionRequest) -> Result<Self, Self::Error> {
        let columns = match non_blank(&request.columns) {
            Some(spec) => Some(parse_columns(Some(spec))?),
            None => None,
        };
        let titles = non_blank(&request.titles).map(split_list);
        let filter_column = match non_blank(&request.filter_column) {
            Some(letter) => Some(
                letter_to_column(letter)
                    .ok_or_else(|| CollectError::InvalidFilterColumn(letter.to_owned()))?,
            ),
            None => None,
        };
        let criteria = filter_column.and(non_blank(&request.filter_criteria)).map(split_list);

        let filter = match (filter_column, criteria) {
            (Some(column), Some(criteria)) => {
                let mut matches: HashSet<String> = criteria.into_iter().collect();
                if request.remove_empty_rows {
                    matches.insert(String::new());
                }
                Some(FilterSpec { column, matches })
            }
            _ if request.remove_empty_rows => Some(FilterSpec {
                column: 1,
                matches: HashSet::from([String::new()]),
            }),
            _ => None,
        };

        Ok(ExtractionPlan {
            sheet_id: request.sheet_id,
            columns,
            titles,
            data_start_row: if request.first_row_is_data { 1 } else { 2 },
            row_count: request.size,
            filter,
        })
    }
}

/// Returns the trimmed value unless it is absent or blank.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

/// Splits a comma-joined list, dropping the spaces that follow each comma.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim_start_matches(' ').to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::column::ColumnError;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let plan = ExtractionPlan::try_from(&ExtractionRequest::new()).unwrap();
        assert_eq!(plan.columns, None);
        assert_eq!(plan.titles, None);
        assert_eq!(plan.data_start_row, 2);
        assert!(!plan.first_row_is_data());
        assert_eq!(plan.row_count, None);
        assert_eq!(plan.filter, None);
    }

    #[test]
    fn parses_columns_and_titles() {
        let request = ExtractionRequest::new()
            .columns("A, {B,C}")
            .titles("Name,  Site ")
            .first_row_is_data(true)
            .size(12);
        let plan = ExtractionPlan::try_from(&request).unwrap();
        assert_eq!(
            plan.columns,
            Some(vec![ColumnSpec::Text(1), ColumnSpec::Linked { link: 2, text: 3 }])
        );
        assert_eq!(plan.titles, Some(vec!["Name".to_string(), "Site".to_string()]));
        assert_eq!(plan.data_start_row, 1);
        assert_eq!(plan.row_count, Some(12));
    }

    #[test]
    fn blank_columns_select_everything() {
        let plan = ExtractionPlan::try_from(&ExtractionRequest::new().columns("   ")).unwrap();
        assert_eq!(plan.columns, None);
    }

    #[test]
    fn invalid_columns_propagate() {
        let error = ExtractionPlan::try_from(&ExtractionRequest::new().columns("A, AA")).unwrap_err();
        assert!(matches!(
            error,
            SheetExportError::ColumnError(ColumnError::InvalidColumnSpec { .. })
        ));
    }

    #[test]
    fn explicit_filter() {
        let plan = ExtractionPlan::try_from(&ExtractionRequest::new().filter("c", "done, n/a")).unwrap();
        assert_eq!(
            plan.filter,
            Some(FilterSpec {
                column: 3,
                matches: HashSet::from(["done".to_string(), "n/a".to_string()]),
            })
        );
    }

    #[test]
    fn explicit_filter_with_empty_row_removal() {
        let request = ExtractionRequest::new().filter("B", "x").remove_empty_rows(true);
        let plan = ExtractionPlan::try_from(&request).unwrap();
        assert_eq!(
            plan.filter,
            Some(FilterSpec {
                column: 2,
                matches: HashSet::from(["x".to_string(), String::new()]),
            })
        );
    }

    #[test]
    fn empty_row_removal_defaults_to_column_a() {
        let plan = ExtractionPlan::try_from(&ExtractionRequest::new().remove_empty_rows(true)).unwrap();
        assert_eq!(
            plan.filter,
            Some(FilterSpec {
                column: 1,
                matches: HashSet::from([String::new()]),
            })
        );

        // A filter column without criteria does not count as a configured filter
        let mut request = ExtractionRequest::new().remove_empty_rows(true);
        request.filter_column = Some("D".to_string());
        let plan = ExtractionPlan::try_from(&request).unwrap();
        assert_eq!(plan.filter.map(|filter| filter.column), Some(1));
    }

    #[test]
    fn filter_column_without_criteria_is_ignored() {
        let mut request = ExtractionRequest::new();
        request.filter_column = Some("D".to_string());
        assert_eq!(ExtractionPlan::try_from(&request).unwrap().filter, None);
    }

    #[test]
    fn invalid_filter_column() {
        let error = ExtractionPlan::try_from(&ExtractionRequest::new().filter("7", "x")).unwrap_err();
        assert!(matches!(
            error,
            SheetExportError::CollectError(CollectError::InvalidFilterColumn(_))
        ));
    }

    #[test]
    fn wire_names() {
        let request: ExtractionRequest = serde_json::from_str(
            r#"{"sheet-id": 3, "columns": "A", "row-1-data": true, "remove-empty": true, "filter-column": "B"}"#,
        )
        .unwrap();
        assert_eq!(request.sheet_id, Some(3));
        assert_eq!(request.columns.as_deref(), Some("A"));
        assert!(request.first_row_is_data);
        assert!(request.remove_empty_rows);
        assert_eq!(request.filter_column.as_deref(), Some("B"));
        assert_eq!(request.titles, None);
    }

    #[test]
    fn sidebar_form_values() {
        let request: ExtractionRequest = serde_json::from_str(
            r#"{"sheet-id": "12", "row-1-data": "data", "size": " 25 ", "remove-empty": true}"#,
        )
        .unwrap();
        assert_eq!(request.sheet_id, Some(12));
        assert!(request.first_row_is_data);
        assert_eq!(request.size, Some(25));

        let request: ExtractionRequest =
            serde_json::from_str(r#"{"sheet-id": "", "row-1-data": "header", "size": ""}"#).unwrap();
        assert_eq!(request, ExtractionRequest::new());

        let request: ExtractionRequest =
            serde_json::from_str(r#"{"sheet-id": null, "size": null, "row-1-data": false}"#).unwrap();
        assert_eq!(request, ExtractionRequest::new());
    }

    #[test]
    fn malformed_sidebar_numbers() {
        assert!(serde_json::from_str::<ExtractionRequest>(r#"{"size": "many"}"#).is_err());
        assert!(serde_json::from_str::<ExtractionRequest>(r#"{"sheet-id": "-1"}"#).is_err());
    }
}
