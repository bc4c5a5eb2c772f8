//! Office Open XML (`.xlsx`) loading.
//!
//! Reads the workbook, its worksheet relationships, the shared string table and
//! every worksheet into a [`MemoryWorkbook`] of display text. Shared strings,
//! inline strings and booleans are resolved; numbers are kept as stored, no
//! number format is applied.
use crate::error::SheetExportError;
use crate::helpers::xml::attribute;
use crate::helpers::xml::parse_attribute;
use crate::helpers::xml::XmlReader;
use crate::match_xml_events;
use crate::spreadsheet::memory::MemorySheet;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::MemoryWorkbook;
use crate::spreadsheet::SpreadsheetError;
use log::debug;
use log::warn;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use zip::read::ZipFile;
use zip::result::ZipError;
use zip::ZipArchive;

const TAG_RELATIONSHIP: &[u8] = b"Relationship";
const TAG_SHEET: QName = QName(b"sheet");
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");
const TAG_ROW: QName = QName(b"row");
const TAG_CELL: QName = QName(b"c");
const TAG_INLINE_STRING: QName = QName(b"is");
const TAG_VALUE: QName = QName(b"v");

/// How a cell's stored value turns into display text.
#[derive(Copy, Clone, Debug, PartialEq)]
enum CellKind {
    Number,
    SharedString,
    InlineString,
    Boolean,
    Text,
}

/// Opens an `.xlsx` file and loads all of its sheets.
pub fn open_xlsx<P: AsRef<Path>>(path: P) -> Result<MemoryWorkbook, SheetExportError> {
    let file = File::open(path.as_ref())?;
    debug!("loading workbook '{}'", path.as_ref().display());
    read_xlsx(BufReader::new(file))
}

/// Loads all sheets of an `.xlsx` package from any seekable reader.
pub fn read_xlsx<R: Read + Seek>(reader: R) -> Result<MemoryWorkbook, SheetExportError> {
    let mut zip = ZipArchive::new(reader)?;
    let relationships = load_relationships(&mut zip, "xl/_rels/workbook.xml.rels")?;
    let sheets = load_sheet_list(&mut zip, &relationships)?;
    if sheets.is_empty() {
        Err(SpreadsheetError::SpreadsheetEmptyError)?
    }
    let shared_strings = load_shared_strings(&mut zip)?;

    let mut workbook = MemoryWorkbook::new();
    for (id, name, path) in sheets {
        let sheet = workbook.add_sheet_with_id(id, &name, Vec::<Vec<String>>::new());
        load_worksheet(&mut zip, &path, &shared_strings, sheet)?;
    }
    Ok(workbook)
}

/// Opens a part of the package, matching its name case-insensitively.
fn open_part<'a, R: Read + Seek>(
    zip: &'a mut ZipArchive<R>,
    name: &str,
) -> Result<Option<XmlReader<BufReader<ZipFile<'a, R>>>>, SheetExportError> {
    let wanted = name.replace('\\', "/");
    let path = zip
        .file_names()
        .find(|file_name| wanted.eq_ignore_ascii_case(file_name))
        .map(str::to_owned);
    match path.map(|path| zip.by_name(&path)).transpose() {
        Ok(file) => Ok(file.map(|file| XmlReader::new(BufReader::new(file)))),
        Err(ZipError::FileNotFound) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Maps relationship ids to worksheet part paths.
fn load_relationships<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
    path: &str,
) -> Result<HashMap<String, String>, SheetExportError> {
    let mut reader =
        open_part(zip, path)?.ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let mut relationships = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let kind = attribute(&event, "Type")?;
            if kind.map(|kind| kind.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = attribute(&event, "Id")?.zip(attribute(&event, "Target")?) {
                    relationships.insert(id, to_part_path(&target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Lists (sheet id, name, part path) for every worksheet in tab order.
fn load_sheet_list<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
    relationships: &HashMap<String, String>,
) -> Result<Vec<(u32, String, String)>, SheetExportError> {
    let mut reader = open_part(zip, "xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::FileError("xl/workbook.xml".to_string()))?;
    let mut sheets = Vec::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let name = attribute(&event, "name")?.unwrap_or_default();
            let id = parse_attribute::<u32>(&event, "sheetId")?.unwrap_or(sheets.len() as u32 + 1);
            match attribute(&event, "id")?.and_then(|rid| relationships.get(&rid)) {
                Some(path) => sheets.push((id, name, path.to_owned())),
                None => warn!("sheet '{}' has no worksheet part, skipped", name),
            }
        }
    });
    Ok(sheets)
}

/// Reads the shared string table, empty when the package has none.
fn load_shared_strings<R: Read + Seek>(zip: &mut ZipArchive<R>) -> Result<Vec<String>, SheetExportError> {
    let mut strings = Vec::new();
    let mut reader = match open_part(zip, "xl/sharedStrings.xml")? {
        Some(reader) => reader,
        None => return Ok(strings),
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
            strings.push(reader.read_text(TAG_SHARED_STRING_ITEM, false)?);
        }
    });
    Ok(strings)
}

/// Reads one worksheet part into `sheet`.
fn load_worksheet<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
    path: &str,
    shared_strings: &[String],
    sheet: &mut MemorySheet,
) -> Result<(), SheetExportError> {
    let mut reader = open_part(zip, path)?.ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let mut row = 0usize;
    let mut col = 0usize;
    let mut kind = CellKind::Number;
    let mut value = String::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_ROW => {
            row = parse_attribute::<usize>(&event, "r")?.unwrap_or(row + 1);
            col = 0;
        }
        Event::Start(event) if event.name() == TAG_CELL => {
            (row, col) = attribute(&event, "r")?
                .and_then(|reference| reference_to_index(&reference))
                .unwrap_or((row, col + 1));
            kind = match attribute(&event, "t")?.as_deref() {
                Some("s") => CellKind::SharedString,
                Some("inlineStr") => CellKind::InlineString,
                Some("b") => CellKind::Boolean,
                Some("str") | Some("e") | Some("d") => CellKind::Text,
                _ => CellKind::Number,
            };
            value.clear();
        }
        Event::Start(event) if event.name() == TAG_INLINE_STRING => {
            value = reader.read_text(TAG_INLINE_STRING, false)?;
        }
        Event::Start(event) if event.name() == TAG_VALUE => {
            value = reader.read_text(TAG_VALUE, true)?;
        }
        Event::End(event) if event.name() == TAG_CELL => {
            if !value.is_empty() {
                let text = display_text(kind, &value, shared_strings).ok_or_else(|| {
                    SpreadsheetError::CellValueError {
                        sheet: sheet.handle.name.to_owned(),
                        reference: index_to_reference(row, col),
                        message: format!("no shared string '{}'", value),
                    }
                })?;
                sheet.set(row, col, text);
                value.clear();
            }
        }
    });
    debug!("loaded sheet '{}' with {} rows", sheet.handle.name, sheet.last_row());
    Ok(())
}

/// Turns a stored cell value into the text a user would see.
fn display_text(kind: CellKind, value: &str, shared_strings: &[String]) -> Option<String> {
    match kind {
        CellKind::SharedString => value
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|index| shared_strings.get(index))
            .cloned(),
        CellKind::Boolean => Some(if value.trim() == "1" { "TRUE" } else { "FALSE" }.to_string()),
        CellKind::Number | CellKind::InlineString | CellKind::Text => Some(value.to_owned()),
    }
}

/// Normalizes a relationship target to a path inside the package.
fn to_part_path(target: &str) -> String {
    if let Some(path) = target.strip_prefix('/') {
        path.to_string()
    } else if target.starts_with("xl/") {
        target.to_string()
    } else {
        format!("xl/{target}")
    }
}
