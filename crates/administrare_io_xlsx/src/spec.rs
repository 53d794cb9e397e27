//! Shared XLSX models: cell values, range references, merge regions and errors.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::util::convert_number_to_letters;

////////////////////////////////////////////////////////////////////////////////
// #region CellValueSpecification

/// Scalar value held by one cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellValue {
    /// Missing/blank value.
    #[default]
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
    /// Excel serial date/time; only produced when loading existing files.
    DateTime(f64),
}

impl EnumCellValue {
    /// Return `true` for the blank value.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Display form used by width estimation; `None` for non-primitive values.
    ///
    /// Integral numbers render without a fractional part (`7`, not `7.0`).
    pub fn to_display_string(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(n.to_string())
                }
            }
            Self::None | Self::Boolean(_) | Self::DateTime(_) => None,
        }
    }
}

macro_rules! impl_cell_value_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for EnumCellValue {
                fn from(value: $t) -> Self {
                    Self::Number(value as f64)
                }
            }
        )*
    };
}

impl_cell_value_from_number!(f64, f32, i64, i32, u32, u64, usize);

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for EnumCellValue {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<bool> for EnumCellValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl<T: Into<EnumCellValue>> From<Option<T>> for EnumCellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

/// Value handed to the write operations: one scalar or a (possibly nested) sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumWriteValue {
    /// Single cell value.
    Scalar(EnumCellValue),
    /// Sequence of values (flat for range writes, nested for 2D writes).
    Sequence(Vec<EnumWriteValue>),
}

impl EnumWriteValue {
    /// Build from a loosely-typed JSON value.
    ///
    /// Objects are rejected; arrays become sequences.
    pub fn from_json(value: &Value) -> Result<Self, ExcelError> {
        match value {
            Value::Null => Ok(Self::Scalar(EnumCellValue::None)),
            Value::Bool(b) => Ok(Self::Scalar(EnumCellValue::Boolean(*b))),
            Value::Number(n) => n
                .as_f64()
                .map(|val| Self::Scalar(EnumCellValue::Number(val)))
                .ok_or_else(|| ExcelError::InvalidValueShape(format!("Unsupported number: {n}"))),
            Value::String(s) => Ok(Self::Scalar(EnumCellValue::String(s.clone()))),
            Value::Array(l_values) => Ok(Self::Sequence(
                l_values
                    .iter()
                    .map(Self::from_json)
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            Value::Object(_) => Err(ExcelError::InvalidValueShape(
                "Cell value cannot be a mapping".to_string(),
            )),
        }
    }
}

macro_rules! impl_write_value_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for EnumWriteValue {
                fn from(value: $t) -> Self {
                    Self::Scalar(value.into())
                }
            }
        )*
    };
}

impl_write_value_from_scalar!(
    EnumCellValue, &str, String, &String, bool, f64, f32, i64, i32, u32, u64, usize
);

impl<T: Into<EnumCellValue>> From<Option<T>> for EnumWriteValue {
    fn from(value: Option<T>) -> Self {
        Self::Scalar(value.into())
    }
}

impl<T: Into<EnumWriteValue>> From<Vec<T>> for EnumWriteValue {
    fn from(value: Vec<T>) -> Self {
        Self::Sequence(value.into_iter().map(Into::into).collect())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RangeSpecification

/// 1-based cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpecCellCoord {
    /// 1-based column number.
    pub column: usize,
    /// 1-based row number.
    pub row: usize,
}

impl SpecCellCoord {
    pub fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }
}

impl fmt::Display for SpecCellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", convert_number_to_letters(self.column), self.row)
    }
}

/// One half of a pair range: a 1-based number or a letter sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumRangePart {
    /// 1-based index.
    Index(usize),
    /// Letter sequence (`A`, `Z`, `AA`, ...).
    Letters(String),
}

impl From<usize> for EnumRangePart {
    fn from(value: usize) -> Self {
        Self::Index(value)
    }
}

impl From<u32> for EnumRangePart {
    fn from(value: u32) -> Self {
        Self::Index(value as usize)
    }
}

/// Negative values map to index 0, which addressing rejects.
impl From<i32> for EnumRangePart {
    fn from(value: i32) -> Self {
        Self::Index(usize::try_from(value).unwrap_or(0))
    }
}

impl From<&str> for EnumRangePart {
    fn from(value: &str) -> Self {
        Self::Letters(value.to_string())
    }
}

impl From<String> for EnumRangePart {
    fn from(value: String) -> Self {
        Self::Letters(value)
    }
}

/// Human range reference accepted by every region operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumRangeRef {
    /// Token such as `"C12"`.
    Token(String),
    /// `[column, row]` pair.
    Pair(EnumRangePart, EnumRangePart),
}

impl EnumRangeRef {
    /// Build from a loosely-typed JSON value (string token or 2-element list).
    pub fn from_json(value: &Value) -> Result<Self, ExcelError> {
        match value {
            Value::String(s) => Ok(Self::Token(s.clone())),
            Value::Array(l_parts) => {
                if l_parts.len() != 2 {
                    return Err(ExcelError::InvalidRange(
                        "Range list can only have 2 values".to_string(),
                    ));
                }
                let part_column = derive_range_part_from_json(&l_parts[0])?;
                let part_row = derive_range_part_from_json(&l_parts[1])?;
                Ok(Self::Pair(part_column, part_row))
            }
            _ => Err(ExcelError::InvalidRange(
                "Range must be a type of string or list".to_string(),
            )),
        }
    }
}

fn derive_range_part_from_json(value: &Value) -> Result<EnumRangePart, ExcelError> {
    match value {
        Value::String(s) => Ok(EnumRangePart::Letters(s.clone())),
        Value::Number(n) => n
            .as_u64()
            .map(|val| EnumRangePart::Index(val as usize))
            .ok_or_else(|| {
                ExcelError::InvalidRange(format!("Range list index must be a positive integer: {n}"))
            }),
        _ => Err(ExcelError::InvalidRange(
            "Range list can only have a type of string and integer for its values".to_string(),
        )),
    }
}

impl From<&str> for EnumRangeRef {
    fn from(value: &str) -> Self {
        Self::Token(value.to_string())
    }
}

impl From<String> for EnumRangeRef {
    fn from(value: String) -> Self {
        Self::Token(value)
    }
}

impl From<SpecCellCoord> for EnumRangeRef {
    fn from(value: SpecCellCoord) -> Self {
        Self::Pair(
            EnumRangePart::Index(value.column),
            EnumRangePart::Index(value.row),
        )
    }
}

impl<C: Into<EnumRangePart>, R: Into<EnumRangePart>> From<(C, R)> for EnumRangeRef {
    fn from((column, row): (C, R)) -> Self {
        Self::Pair(column.into(), row.into())
    }
}

/// Rectangular merge region; `start` is the anchor cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecMergeRegion {
    /// Top-left (anchor) cell.
    pub start: SpecCellCoord,
    /// Bottom-right cell.
    pub end: SpecCellCoord,
}

impl SpecMergeRegion {
    /// Normalize two corners into a region whose start is top-left.
    pub fn new(a: SpecCellCoord, b: SpecCellCoord) -> Self {
        Self {
            start: SpecCellCoord::new(a.column.min(b.column), a.row.min(b.row)),
            end: SpecCellCoord::new(a.column.max(b.column), a.row.max(b.row)),
        }
    }

    pub fn contains(&self, coord: SpecCellCoord) -> bool {
        (self.start.column..=self.end.column).contains(&coord.column)
            && (self.start.row..=self.end.row).contains(&coord.row)
    }

    pub fn overlaps(&self, other: &SpecMergeRegion) -> bool {
        self.start.column <= other.end.column
            && other.start.column <= self.end.column
            && self.start.row <= other.end.row
            && other.start.row <= self.end.row
    }

    /// `true` when the region covers exactly one cell.
    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }

    /// `true` for cells inside the region other than the anchor.
    pub fn is_member(&self, coord: SpecCellCoord) -> bool {
        coord != self.start && self.contains(coord)
    }
}

impl fmt::Display for SpecMergeRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Sheet selector: 1-based position or name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumSheetSelector {
    /// 1-based position in workbook order.
    Index(usize),
    /// Sheet title.
    Name(String),
}

impl From<usize> for EnumSheetSelector {
    fn from(value: usize) -> Self {
        Self::Index(value)
    }
}

impl From<&str> for EnumSheetSelector {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

impl From<String> for EnumSheetSelector {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl From<&String> for EnumSheetSelector {
    fn from(value: &String) -> Self {
        Self::Name(value.clone())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region AutofitSpecification

/// Options for [`crate::writer::XlsxWorkbook::adjust_width`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecAutofitPolicy {
    /// Extra width added on top of the fixed padding.
    pub extra_width: usize,
    /// Width cap; wider columns are clamped and wrapped. `None`/`Some(0)` disables.
    pub width_limit: Option<usize>,
}

/// Column widths computed for one range.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecAutofitPlan {
    /// Final width (padding included) by 1-based column.
    pub widths_by_col: BTreeMap<usize, usize>,
    /// Columns clamped by the width limit, which must wrap.
    pub cols_wrapped: Vec<usize>,
    /// Inclusive row span of the planned range.
    pub rows: (usize, usize),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Errors raised by range, style, value and workbook operations.
#[derive(Debug, thiserror::Error)]
pub enum ExcelError {
    /// Bad range token/pair.
    #[error("invalid range: {0}")]
    InvalidRange(String),
    /// Bad border side selector.
    #[error("Side value can only be all, top, left, right, bottom (got {0:?})")]
    InvalidSide(String),
    /// Recognized style key with an unsupported value.
    #[error("{key} data type needs to be {expected}")]
    InvalidStyleValue {
        /// Offending option key.
        key: String,
        /// Human description of the accepted type/value.
        expected: String,
    },
    /// Value shape does not match the write operation.
    #[error("{0}")]
    InvalidValueShape(String),
    /// Flat/2D value sequence does not cover the target range.
    #[error("value index out of range: needed {n_needed} values, got {n_given}")]
    ValueIndexOutOfRange {
        /// Number of values the range requires.
        n_needed: usize,
        /// Number of values supplied.
        n_given: usize,
    },
    /// Write into a non-anchor cell of a merge region.
    #[error("cell {0} is part of a merged range and is read-only")]
    MergedCellWrite(String),
    /// Overlapping merge or unmerge of a region that is not merged.
    #[error("invalid merge: {0}")]
    InvalidMerge(String),
    /// Zoom outside the range Excel accepts.
    #[error("zoom must be within 10..=400 (got {0})")]
    InvalidZoom(u16),
    /// Sheet selector does not match any sheet.
    #[error("sheet not found: {0}")]
    SheetNotFound(String),
    /// Sheet lifecycle request that would break workbook invariants.
    #[error("invalid sheet operation: {0}")]
    InvalidSheet(String),
    /// Existing workbook could not be read.
    #[error("xlsx read error: {0}")]
    Read(String),
    /// Workbook serialization failed.
    #[error("xlsx write error: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
    /// Filesystem failure around save.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExcelError {
    pub(crate) fn style_value(key: &str, expected: &str) -> Self {
        Self::InvalidStyleValue {
            key: key.to_string(),
            expected: expected.to_string(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
