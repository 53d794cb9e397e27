//! `administrare_io_xlsx`:
//! spreadsheet cell-region kernel for report generation.
//!
//! Modules:
//! - `conf`   : Excel limits and fixed constants
//! - `spec`   : value/range/merge models and errors
//! - `util`   : range addressing and pure helpers
//! - `style`  : style attribute builder
//! - `sheet`  : one worksheet grid plus the auto-width planner
//! - `writer` : workbook kernel (region operations, load, save)
pub mod conf;
pub mod sheet;
pub mod spec;
pub mod style;
pub mod util;
pub mod writer;

pub use conf::{N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
pub use sheet::{SpecCellStyle, XlsxCell, XlsxSheet};
pub use spec::{
    EnumCellValue, EnumRangePart, EnumRangeRef, EnumSheetSelector, EnumWriteValue, ExcelError,
    SpecAutofitPlan, SpecAutofitPolicy, SpecCellCoord, SpecMergeRegion,
};
pub use style::{
    EnumBorderSide, SpecAlignmentOptions, SpecBorderOptions, SpecFillOptions, SpecFontOptions,
    StyleAlignment, StyleBorder, StyleBorderSide, StyleFill, StyleFont,
};
pub use util::{convert_letters_to_number, convert_number_to_letters, convert_range};
pub use writer::XlsxWorkbook;
