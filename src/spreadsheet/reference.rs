//! Spreadsheet-style cell reference helpers.
//! Columns and rows are 1-based throughout the crate (`A1` is row 1, column 1).

/// Number of columns addressable by a single letter.
pub const SINGLE_LETTER_COLUMNS: usize = 26;

/// Converts a single column letter (case-insensitive) to its 1-based index.
/// Returns None for anything that is not exactly one ASCII letter.
pub fn letter_to_column(letter: &str) -> Option<usize> {
    let mut chars = letter.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Some(c.to_ascii_lowercase() as usize - 'a' as usize + 1)
        }
        _ => None,
    }
}

/// Converts a 1-based column index back to its single upper-case letter.
pub fn column_to_letter(column: usize) -> Option<char> {
    if (1..=SINGLE_LETTER_COLUMNS).contains(&column) {
        char::from_u32('A' as u32 + column as u32 - 1)
    } else {
        None
    }
}

/// Converts column letters of any length ("A", "AB") to a 1-based index.
pub(crate) fn letters_to_column(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    letters
        .to_ascii_uppercase()
        .chars()
        .map(|c| c as usize - 'A' as usize + 1)
        .try_fold(0usize, |index, digit| index.checked_mul(26)?.checked_add(digit))
}

/// Converts a 1-based column index to letters of any length (27 -> "AA").
pub(crate) fn column_name(column: usize) -> String {
    let mut column = column;
    let mut name = String::new();
    while column > 0 {
        column -= 1;
        name.insert(0, (b'A' + (column % 26) as u8) as char);
        column /= 26;
    }
    name
}

/// Splits a cell reference such as "C12" into a 1-based (row, column) pair.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    let column = letters_to_column(letters.trim_start_matches('$').trim_end_matches('$'))?;
    let row = digits.parse::<usize>().ok().filter(|row| *row > 0)?;
    Some((row, column))
}

/// Formats a 1-based (row, column) pair as a cell reference such as "C12".
pub(crate) fn index_to_reference(row: usize, column: usize) -> String {
    format!("{}{}", column_name(column), row)
}
