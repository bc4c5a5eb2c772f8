//! Intermediate representation shared by the collector and the exporters:
//! the parsed column model, the per-column records and the row filter.
pub mod column;
pub mod filter;
pub mod record;

pub use column::ColumnSpec;
pub use filter::RowFilter;
pub use record::is_titled;
pub use record::ColumnRecord;
pub use record::Form;
pub use record::Title;
