use std::fmt;

/// Title of an exported column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Title {
    Named(String),
    /// Row 1 holds data, so the column has no header
    Untitled,
}

impl Title {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Title::Named(name) => Some(name),
            Title::Untitled => None,
        }
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("untitled"))
    }
}

/// One exported column: its title, row values and, for linked columns, the
/// link target of every row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnRecord {
    pub title: Title,
    pub rows: Vec<String>,
    /// Same length as `rows` when present
    pub row_links: Option<Vec<String>>,
}

impl ColumnRecord {
    pub fn new(title: Title, rows: Vec<String>) -> Self {
        Self {
            title,
            rows,
            row_links: None,
        }
    }

    pub fn with_links(mut self, row_links: Vec<String>) -> Self {
        self.row_links = Some(row_links);
        self
    }

    /// Row value and link target (for linked columns) at `row`.
    pub fn cell(&self, row: usize) -> (&str, Option<&str>) {
        let value = self.rows.get(row).map(String::as_str).unwrap_or("");
        let link = self
            .row_links
            .as_ref()
            .map(|links| links.get(row).map(String::as_str).unwrap_or(""));
        (value, link)
    }
}

/// The columns of one extraction request, in output order.
pub type Form = Vec<ColumnRecord>;

/// Whether every column of a form carries a title.
pub fn is_titled(form: &[ColumnRecord]) -> bool {
    form.iter().all(|record| matches!(record.title, Title::Named(_)))
}
