//! XLSX constants shared by the addressing, layout and writer layers.

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Name of the single sheet of a freshly created workbook.
pub const C_SHEET_NAME_DEFAULT: &str = "Sheet";

/// Sheet zoom bounds (percent) accepted by Excel.
pub const N_ZOOM_MIN: u16 = 10;
pub const N_ZOOM_MAX: u16 = 400;

/// Fixed padding added to every auto-fitted column width.
pub const N_WIDTH_AUTOFIT_PADDING: usize = 1;

/// Row height conversion `external * NUM / DEN` into native points.
pub const TUP_HEIGHT_UNIT_FACTOR: (f64, f64) = (121.0, 200.0);
/// Column width conversion `external * NUM / DEN` into native character units.
pub const TUP_WIDTH_UNIT_FACTOR: (f64, f64) = (111.0, 1000.0);

/// Number format used when a date/time cell carries no explicit format.
pub const C_NUM_FORMAT_DATETIME: &str = "yyyy-mm-dd hh:mm:ss";

/// Basic colour names accepted by the style builder, as `0xRRGGBB`.
pub const TUP_COLOR_NAMES: [(&str, u32); 16] = [
    ("black", 0x000000),
    ("blue", 0x0000FF),
    ("brown", 0x800000),
    ("cyan", 0x00FFFF),
    ("gray", 0x808080),
    ("green", 0x008000),
    ("lime", 0x00FF00),
    ("magenta", 0xFF00FF),
    ("navy", 0x000080),
    ("orange", 0xFF6600),
    ("pink", 0xFF00FF),
    ("purple", 0x800080),
    ("red", 0xFF0000),
    ("silver", 0xC0C0C0),
    ("white", 0xFFFFFF),
    ("yellow", 0xFFFF00),
];
