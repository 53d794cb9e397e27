//! Stateless helper utilities: range addressing, name normalization, colours.

use std::sync::LazyLock;

use regex::Regex;
use rust_xlsxwriter::Color;

use crate::conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_COLOR_NAMES,
    TUP_EXCEL_ILLEGAL,
};
use crate::spec::{EnumRangePart, EnumRangeRef, ExcelError, SpecCellCoord};

static RE_RANGE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]+)([0-9]+)$").expect("range token pattern is valid")
});

////////////////////////////////////////////////////////////////////////////////
// #region RangeAddressing

/// Convert a human range reference into a 1-based `(column, row)` coordinate.
///
/// Every operation addressing cells goes through here.
pub fn convert_range(range: &EnumRangeRef) -> Result<SpecCellCoord, ExcelError> {
    let (n_column, n_row) = match range {
        EnumRangeRef::Token(token) => {
            let c_token = token.trim();
            if c_token.chars().all(|chr| chr.is_ascii_alphabetic())
                || c_token.chars().all(|chr| chr.is_ascii_digit())
            {
                return Err(ExcelError::InvalidRange(format!(
                    "Range string must be a combination of character and number: {token:?}"
                )));
            }
            let Some(caps) = RE_RANGE_TOKEN.captures(c_token) else {
                return Err(ExcelError::InvalidRange(format!(
                    "Range string must be letters followed by digits: {token:?}"
                )));
            };
            let n_row = caps[2].parse::<usize>().map_err(|_| {
                ExcelError::InvalidRange(format!("Row number is too large: {token:?}"))
            })?;
            (convert_letters_to_number(&caps[1])?, n_row)
        }
        EnumRangeRef::Pair(part_column, part_row) => (
            convert_range_part(part_column)?,
            convert_range_part(part_row)?,
        ),
    };

    validate_coord(n_column, n_row)?;
    Ok(SpecCellCoord::new(n_column, n_row))
}

fn convert_range_part(part: &EnumRangePart) -> Result<usize, ExcelError> {
    match part {
        EnumRangePart::Index(n_idx) => Ok(*n_idx),
        EnumRangePart::Letters(letters) => convert_letters_to_number(letters),
    }
}

fn validate_coord(n_column: usize, n_row: usize) -> Result<(), ExcelError> {
    if n_column == 0 || n_row == 0 {
        return Err(ExcelError::InvalidRange(format!(
            "Row or column values must be at least 1 (column={n_column}, row={n_row})"
        )));
    }
    if n_column > N_NCOLS_EXCEL_MAX {
        return Err(ExcelError::InvalidRange(format!(
            "Column {n_column} exceeds Excel limit {N_NCOLS_EXCEL_MAX}"
        )));
    }
    if n_row > N_NROWS_EXCEL_MAX {
        return Err(ExcelError::InvalidRange(format!(
            "Row {n_row} exceeds Excel limit {N_NROWS_EXCEL_MAX}"
        )));
    }
    Ok(())
}

/// Bijective base-26 letters to number (`A`=1, `Z`=26, `AA`=27), case-insensitive.
pub fn convert_letters_to_number(letters: &str) -> Result<usize, ExcelError> {
    if letters.is_empty() || !letters.chars().all(|chr| chr.is_ascii_alphabetic()) {
        return Err(ExcelError::InvalidRange(format!(
            "Column letters must be alphabetic: {letters:?}"
        )));
    }

    let mut n_value: usize = 0;
    for chr in letters.to_ascii_lowercase().bytes() {
        let n_digit = (chr - b'a' + 1) as usize;
        n_value = n_value
            .checked_mul(26)
            .and_then(|val| val.checked_add(n_digit))
            .ok_or_else(|| ExcelError::InvalidRange(format!("Letters overflow: {letters:?}")))?;
    }
    Ok(n_value)
}

/// Number to bijective base-26 letters (`1`=A, `27`=AA). Returns empty for 0.
pub fn convert_number_to_letters(number: usize) -> String {
    let mut n_rest = number;
    let mut l_chars = Vec::new();
    while n_rest > 0 {
        let n_digit = (n_rest - 1) % 26;
        l_chars.push((b'A' + n_digit as u8) as char);
        n_rest = (n_rest - 1) / 26;
    }
    l_chars.iter().rev().collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region NameNormalization

/// Lower the first character and strip spaces (`"Medium Dashed"` -> `"mediumDashed"`).
pub fn normalize_lower_camel(value: &str) -> String {
    let mut chars = value.chars();
    let c_head = match chars.next() {
        Some(chr) => chr.to_lowercase().collect::<String>(),
        None => String::new(),
    };
    format!("{c_head}{}", chars.as_str()).replace(' ', "")
}

/// Parse `RRGGBB`, `#RRGGBB`, `AARRGGBB` or a basic colour name.
pub fn parse_color(value: &str) -> Option<Color> {
    let c_value = value.trim();
    let c_lower = c_value.to_ascii_lowercase();
    if let Some((_, n_rgb)) = TUP_COLOR_NAMES.iter().find(|(name, _)| *name == c_lower) {
        return Some(Color::RGB(*n_rgb));
    }

    let c_hex = c_value.strip_prefix('#').unwrap_or(c_value);
    if !c_hex.chars().all(|chr| chr.is_ascii_hexdigit()) {
        return None;
    }
    let c_rgb = match c_hex.len() {
        6 => c_hex,
        8 => &c_hex[2..],
        _ => return None,
    };
    u32::from_str_radix(c_rgb, 16).ok().map(Color::RGB)
}

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Create suffixed sheet name (`base1`, `base2`, ...), respecting length cap.
pub fn create_sheet_identifier(base_name: &str, n_suffix: usize) -> String {
    let c_sheet_name_suffix = n_suffix.to_string();
    let n_len_base_name_max = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_sheet_name_suffix.len());

    let c_sheet_name_base: String = base_name
        .chars()
        .take(usize::max(1, n_len_base_name_max))
        .collect();

    format!("{c_sheet_name_base}{c_sheet_name_suffix}")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
