use crate::spreadsheet::reference::column_name;
use crate::spreadsheet::reference::column_to_letter;
use crate::spreadsheet::reference::letter_to_column;
use regex::Regex;
use std::fmt;
use thiserror::Error;

/// Errors related to column specification parsing.
#[derive(Error, Debug, PartialEq)]
pub enum ColumnError {
    #[error("Invalid column specification '{spec}': {message}")]
    InvalidColumnSpec { spec: String, message: String },
}

/// One exported column: a text column, optionally paired with the column
/// holding its link targets. Column indices are 1-based.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColumnSpec {
    /// Column whose values are exported as they are
    Text(usize),
    /// Link target column paired with the text column it decorates
    Linked { link: usize, text: usize },
}

impl ColumnSpec {
    /// Index of the column holding the row values.
    pub fn text_column(&self) -> usize {
        match self {
            ColumnSpec::Text(text) | ColumnSpec::Linked { text, .. } => *text,
        }
    }

    /// Index of the column holding link targets, if any.
    pub fn link_column(&self) -> Option<usize> {
        match self {
            ColumnSpec::Text(_) => None,
            ColumnSpec::Linked { link, .. } => Some(*link),
        }
    }

    /// Every column from A up to `last_column`, as plain text columns.
    pub fn all(last_column: usize) -> Vec<ColumnSpec> {
        (1..=last_column).map(ColumnSpec::Text).collect()
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = |column: usize| {
            column_to_letter(column)
                .map(String::from)
                .unwrap_or_else(|| column_name(column))
        };
        match self {
            ColumnSpec::Text(text) => write!(f, "{}", letter(*text)),
            ColumnSpec::Linked { link, text } => write!(f, "{{{}, {}}}", letter(*link), letter(*text)),
        }
    }
}

/// Parses a column specification such as `A, {B, C}, D`.
///
/// Plain letters are text columns; a braced pair is a link column followed by
/// its text column. Letters are case-insensitive and limited to `A`-`Z`.
pub fn parse_columns(spec: Option<&str>) -> Result<Vec<ColumnSpec>, ColumnError> {
    let spec = spec.ok_or_else(|| ColumnError::InvalidColumnSpec {
        spec: String::new(),
        message: "no column specification given".to_string(),
    })?;
    let pattern = Regex::new(r"\{\s*(\w+)[,\s]*(\w+)\s*\}|(\w+)").expect("Hardcode regex pattern");
    let column = |token: &str| {
        letter_to_column(token).ok_or_else(|| ColumnError::InvalidColumnSpec {
            spec: spec.to_owned(),
            message: format!("'{}' is not a single column letter between A and Z", token),
        })
    };

    let columns = pattern
        .captures_iter(spec)
        .map(|captures| match (captures.get(1), captures.get(2), captures.get(3)) {
            (Some(link), Some(text), _) => Ok(ColumnSpec::Linked {
                link: column(link.as_str())?,
                text: column(text.as_str())?,
            }),
            (_, _, Some(text)) => Ok(ColumnSpec::Text(column(text.as_str())?)),
            _ => unreachable!("every alternative captures a column"),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if columns.is_empty() {
        Err(ColumnError::InvalidColumnSpec {
            spec: spec.to_owned(),
            message: "no column found".to_string(),
        })
    } else {
        Ok(columns)
    }
}

/// Renders parsed columns back into specification text.
pub fn format_columns(columns: &[ColumnSpec]) -> String {
    columns
        .iter()
        .map(ColumnSpec::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
