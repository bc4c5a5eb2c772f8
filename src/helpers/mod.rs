//! Low-level parsing helpers shared by the spreadsheet readers.
pub(crate) mod xml;
