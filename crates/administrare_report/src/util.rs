//! Report helpers: numerals, month names, status labels, stamps, document IO.

use std::fs;
use std::path::Path;

use administrare_io_xlsx::conf::TUP_EXCEL_ILLEGAL;
use administrare_io_xlsx::{
    EnumWriteValue, SpecAlignmentOptions, SpecBorderOptions, SpecFontOptions, XlsxWorkbook,
};
use chrono::{DateTime, Local, TimeZone};
use serde::de::DeserializeOwned;

use crate::spec::ReportError;

const TUP_ROMAN_TABLE: [(u32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

const TUP_MONTH_NAMES_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Stamp format used in output file names.
pub const C_DATE_STAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Roman numeral of `number`; empty for 0.
pub fn convert_number_to_roman(number: u32) -> String {
    let mut n_rest = number;
    let mut c_roman = String::new();
    for (n_cap, c_symbol) in TUP_ROMAN_TABLE {
        let n_repeat = n_rest / n_cap;
        c_roman.push_str(&c_symbol.repeat(n_repeat as usize));
        n_rest %= n_cap;
    }
    c_roman
}

/// Indonesian month name for 1..=12.
pub fn convert_month_to_name(month: u32) -> Option<&'static str> {
    let idx = usize::try_from(month).ok()?.checked_sub(1)?;
    TUP_MONTH_NAMES_ID.get(idx).copied()
}

/// Request status label: 0 pending, 1 accepted, 2 rejected.
pub fn convert_status(status: i64) -> Option<&'static str> {
    match status {
        0 => Some("Belum direspon"),
        1 => Some("Diterima"),
        2 => Some("Ditolak"),
        _ => None,
    }
}

pub fn derive_date_stamp<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format(C_DATE_STAMP_FORMAT).to_string()
}

pub fn derive_current_date_stamp() -> String {
    derive_date_stamp(&Local::now())
}

/// `2022-07-01` -> `20220701`.
pub fn compact_date(raw: &str) -> String {
    raw.replace('-', "")
}

/// File-name stem without path separators, sheet-illegal characters or leading dots.
pub fn sanitize_file_stem(raw: &str) -> Result<String, ReportError> {
    let mut c_stem = raw.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_stem = c_stem.replace(c_illegal, "_");
    }
    let c_stem: String = c_stem
        .chars()
        .filter(|chr| !chr.is_control())
        .collect::<String>()
        .trim()
        .trim_start_matches('.')
        .to_string();
    if c_stem.is_empty() {
        return Err(ReportError::Config(format!(
            "{raw:?} cannot be used as a file name"
        )));
    }
    Ok(c_stem)
}

/// Read and deserialize a JSON document.
pub fn read_json_document<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ReportError> {
    let path = path.as_ref();
    let c_text = fs::read_to_string(path)?;
    serde_json::from_str(&c_text).map_err(|source| ReportError::Document {
        path: path.display().to_string(),
        source,
    })
}

////////////////////////////////////////////////////////////////////////////////
// #region StylePresets

pub fn derive_font(size: Option<i64>, bold: bool) -> SpecFontOptions {
    SpecFontOptions {
        size,
        bold: Some(bold),
        ..SpecFontOptions::default()
    }
}

/// Alignment with optional vertical/horizontal names.
pub fn derive_alignment(vertical: Option<&str>, horizontal: Option<&str>) -> SpecAlignmentOptions {
    SpecAlignmentOptions {
        vertical: vertical.map(str::to_string),
        horizontal: horizontal.map(str::to_string),
        ..SpecAlignmentOptions::default()
    }
}

pub fn derive_border_thin() -> SpecBorderOptions {
    SpecBorderOptions::with_style("thin")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LogTables

/// Bold, centered, bordered header on row 1 from column A to `c_col_end`.
pub fn write_log_header(
    workbook: &mut XlsxWorkbook,
    c_col_end: &str,
    l_labels: &[&str],
) -> Result<(), ReportError> {
    workbook.write_value_multiple("A1", (c_col_end, 1usize), l_labels.to_vec())?;
    workbook.font_multiple("A1", (c_col_end, 1usize), &derive_font(Some(12), true))?;
    workbook.alignment_multiple(
        "A1",
        (c_col_end, 1usize),
        &derive_alignment(Some("center"), Some("center")),
    )?;
    workbook.border_multiple("A1", (c_col_end, 1usize), "all", &derive_border_thin())?;
    Ok(())
}

/// Centered bordered data row; `l_cols_left` spans are left-aligned instead.
pub fn write_log_row(
    workbook: &mut XlsxWorkbook,
    n_row: usize,
    c_col_end: &str,
    l_values: Vec<EnumWriteValue>,
    l_cols_left: &[(&str, &str)],
) -> Result<(), ReportError> {
    workbook.write_value_multiple(("A", n_row), (c_col_end, n_row), l_values)?;
    workbook.alignment_multiple(
        ("A", n_row),
        (c_col_end, n_row),
        &derive_alignment(Some("center"), Some("center")),
    )?;
    let align_left = derive_alignment(Some("center"), Some("left"));
    for &(c_from, c_to) in l_cols_left {
        workbook.alignment_multiple((c_from, n_row), (c_to, n_row), &align_left)?;
    }
    workbook.border_multiple(("A", n_row), (c_col_end, n_row), "all", &derive_border_thin())?;
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;

    #[test]
    fn test_convert_number_to_roman() {
        assert_eq!(convert_number_to_roman(1), "I");
        assert_eq!(convert_number_to_roman(4), "IV");
        assert_eq!(convert_number_to_roman(9), "IX");
        assert_eq!(convert_number_to_roman(14), "XIV");
        assert_eq!(convert_number_to_roman(1994), "MCMXCIV");
        assert_eq!(convert_number_to_roman(0), "");
    }

    #[test]
    fn test_month_and_status_labels() {
        assert_eq!(convert_month_to_name(1), Some("Januari"));
        assert_eq!(convert_month_to_name(12), Some("Desember"));
        assert_eq!(convert_month_to_name(0), None);
        assert_eq!(convert_month_to_name(13), None);
        assert_eq!(convert_status(2), Some("Ditolak"));
        assert_eq!(convert_status(7), None);
    }

    #[test]
    fn test_date_stamps() {
        let dt = NaiveDate::from_ymd_opt(2022, 7, 1)
            .unwrap()
            .and_hms_opt(9, 5, 3)
            .unwrap()
            .and_utc();
        assert_eq!(derive_date_stamp(&dt), "2022-07-01-09-05-03");
        assert_eq!(derive_date_stamp(&Utc::now()).len(), 19);
        assert_eq!(compact_date("2022-07-01"), "20220701");
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("andi 20220701").unwrap(), "andi 20220701");
        assert_eq!(
            sanitize_file_stem("../../../escaped").unwrap(),
            "_.._.._escaped"
        );
        assert_eq!(sanitize_file_stem("a\\b:c").unwrap(), "a_b_c");
        assert_eq!(sanitize_file_stem("  .hidden").unwrap(), "hidden");
        assert!(sanitize_file_stem("..").is_err());
        assert!(sanitize_file_stem("   ").is_err());
    }

    #[test]
    fn test_read_json_document_reports_path() {
        let dir_tmp = tempfile::tempdir().unwrap();
        let path_file = dir_tmp.path().join("broken.json");
        fs::write(&path_file, "{ not json").unwrap();

        let err = read_json_document::<serde_json::Value>(&path_file).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
