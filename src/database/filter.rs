use std::collections::HashSet;

/// Row mask computed once per form from its filter column.
///
/// Every parallel column of the form (text and link columns alike) goes through
/// the same mask, so the retained rows stay aligned across columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowFilter {
    keep: Vec<bool>,
}

impl RowFilter {
    /// Drops every row whose filter value matches one of `criteria` exactly.
    pub fn new(source: &[String], criteria: &HashSet<String>) -> Self {
        Self {
            keep: source.iter().map(|value| !criteria.contains(value)).collect(),
        }
    }

    /// Number of rows the filter keeps.
    pub fn retained(&self) -> usize {
        self.keep.iter().filter(|keep| **keep).count()
    }

    /// Returns the rows of `values` the mask keeps, in their original order.
    /// Rows past the end of the mask are kept.
    pub fn apply(&self, values: &[String]) -> Vec<String> {
        values
            .iter()
            .enumerate()
            .filter(|(index, _)| self.keep.get(*index).copied().unwrap_or(true))
            .map(|(_, value)| value.to_owned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn criteria(values: &[&str]) -> HashSet<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn removes_matching_rows_in_order() {
        let filter = RowFilter::new(&strings(&["keep", "drop", "keep", "DROP"]), &criteria(&["drop"]));
        assert_eq!(filter.retained(), 3);
        assert_eq!(filter.apply(&strings(&["1", "2", "3", "4"])), strings(&["1", "3", "4"]));
    }

    #[test]
    fn text_and_link_columns_share_the_mask() {
        let source = strings(&["", "x", "", "y", "z"]);
        let filter = RowFilter::new(&source, &criteria(&["", "z"]));
        let text = filter.apply(&strings(&["t1", "t2", "t3", "t4", "t5"]));
        let links = filter.apply(&strings(&["l1", "l2", "l3", "l4", "l5"]));
        assert_eq!(text, strings(&["t2", "t4"]));
        assert_eq!(links, strings(&["l2", "l4"]));
        assert_eq!(text.len(), links.len());
    }

    #[test]
    fn source_column_is_not_consumed() {
        let source = strings(&["a", "", "b"]);
        let filter = RowFilter::new(&source, &criteria(&[""]));
        assert_eq!(filter.apply(&source), strings(&["a", "b"]));
        assert_eq!(source, strings(&["a", "", "b"]));
    }

    #[test]
    fn no_criteria_keeps_everything() {
        let filter = RowFilter::new(&strings(&["a", ""]), &HashSet::new());
        assert_eq!(filter.apply(&strings(&["1", "2", "3"])), strings(&["1", "2", "3"]));
    }
}
