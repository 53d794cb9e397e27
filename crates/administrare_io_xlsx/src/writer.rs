//! Workbook kernel: sheet lifecycle, region operations, load and save.

use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use calamine::{Data, Reader, Xlsx, open_workbook};
use rust_xlsxwriter::{Format, FormatBorder, FormatPattern, Workbook, Worksheet};
use tracing::{debug, trace};

use crate::conf::{
    C_NUM_FORMAT_DATETIME, C_SHEET_NAME_DEFAULT, N_ZOOM_MAX, N_ZOOM_MIN, TUP_HEIGHT_UNIT_FACTOR,
    TUP_WIDTH_UNIT_FACTOR,
};
use crate::sheet::{SpecCellStyle, XlsxSheet};
use crate::spec::{
    EnumCellValue, EnumRangePart, EnumRangeRef, EnumSheetSelector, EnumWriteValue, ExcelError,
    SpecAutofitPlan, SpecAutofitPolicy, SpecCellCoord, SpecMergeRegion,
};
use crate::style::{
    EnumBorderSide, SpecAlignmentOptions, SpecBorderOptions, SpecFillOptions, SpecFontOptions,
    StyleBorder, StyleBorderSide,
};
use crate::util::{
    convert_number_to_letters, convert_range, create_sheet_identifier, sanitize_sheet_name,
};

/// Stateful workbook bound to one output path.
///
/// Everything is buffered in memory until [`Self::save`], which consumes
/// the workbook and writes the file once.
#[derive(Debug, Clone)]
pub struct XlsxWorkbook {
    path_file_out: PathBuf,
    l_sheets: Vec<XlsxSheet>,
    idx_active: usize,
}

impl XlsxWorkbook {
    /// New workbook with a single blank sheet named `Sheet`.
    pub fn create(path_file_out: impl Into<PathBuf>) -> Self {
        Self {
            path_file_out: path_file_out.into(),
            l_sheets: vec![XlsxSheet::new(C_SHEET_NAME_DEFAULT)],
            idx_active: 0,
        }
    }

    /// Read sheet names, values and merge regions of an existing file.
    ///
    /// Styles are not re-imported. Saving writes back to the same path.
    pub fn load(
        path_file: impl AsRef<Path>,
        active_sheet: impl Into<EnumSheetSelector>,
    ) -> Result<Self, ExcelError> {
        let path_file = path_file.as_ref().to_path_buf();
        let mut workbook: Xlsx<BufReader<File>> =
            open_workbook(&path_file).map_err(|err| ExcelError::Read(format!("{err}")))?;
        workbook
            .load_merged_regions()
            .map_err(|err| ExcelError::Read(format!("{err}")))?;

        let mut l_sheets = Vec::new();
        for name in workbook.sheet_names() {
            let mut sheet = XlsxSheet::new(name.as_str());

            let range = workbook
                .worksheet_range(&name)
                .map_err(|err| ExcelError::Read(format!("{name}: {err}")))?;
            if let Some((n_row_start, n_col_start)) = range.start() {
                for (idx_row, idx_col, data) in range.used_cells() {
                    let value = derive_cell_value_from_data(data);
                    if value.is_none() {
                        continue;
                    }
                    let coord = SpecCellCoord::new(
                        n_col_start as usize + idx_col + 1,
                        n_row_start as usize + idx_row + 1,
                    );
                    sheet.write_value(coord, value)?;
                }
            }

            let l_regions: Vec<SpecMergeRegion> = workbook
                .merged_regions_by_sheet(&name)
                .into_iter()
                .map(|(_, _, dims)| {
                    SpecMergeRegion::new(
                        SpecCellCoord::new(dims.start.1 as usize + 1, dims.start.0 as usize + 1),
                        SpecCellCoord::new(dims.end.1 as usize + 1, dims.end.0 as usize + 1),
                    )
                })
                .collect();
            for region in l_regions {
                sheet.add_merge(region)?;
            }

            l_sheets.push(sheet);
        }

        if l_sheets.is_empty() {
            return Err(ExcelError::Read(format!(
                "{} contains no worksheet",
                path_file.display()
            )));
        }

        let mut workbook = Self {
            path_file_out: path_file,
            l_sheets,
            idx_active: 0,
        };
        workbook.change_sheet(active_sheet)?;
        debug!(
            path = %workbook.path_file_out.display(),
            n_sheets = workbook.l_sheets.len(),
            "loaded workbook"
        );
        Ok(workbook)
    }

    /// Flush every sheet to disk and return the written path.
    pub fn save(self) -> Result<PathBuf, ExcelError> {
        if let Some(dir_parent) = self.path_file_out.parent()
            && !dir_parent.as_os_str().is_empty()
        {
            fs::create_dir_all(dir_parent)?;
        }

        let mut workbook = Workbook::new();
        for (idx, sheet) in self.l_sheets.iter().enumerate() {
            let worksheet = workbook.add_worksheet();
            write_sheet(worksheet, sheet)?;
            if idx == self.idx_active {
                worksheet.set_active(true);
            }
        }
        workbook.save(&self.path_file_out)?;

        debug!(
            path = %self.path_file_out.display(),
            n_sheets = self.l_sheets.len(),
            "saved workbook"
        );
        Ok(self.path_file_out)
    }

    ////////////////////////////////////////////////////////////////////////////
    // #region SheetLifecycle

    pub fn sheet_names(&self) -> Vec<&str> {
        self.l_sheets.iter().map(XlsxSheet::name).collect()
    }

    pub fn active_sheet(&self) -> &XlsxSheet {
        &self.l_sheets[self.idx_active]
    }

    fn active_sheet_mut(&mut self) -> &mut XlsxSheet {
        &mut self.l_sheets[self.idx_active]
    }

    /// Append a sheet and return its final name.
    ///
    /// The name is sanitized; a name already in use gets a numeric suffix.
    pub fn create_sheet(&mut self, name: &str) -> String {
        let c_name = self.derive_unique_sheet_name(&sanitize_sheet_name(name, "_"));
        self.l_sheets.push(XlsxSheet::new(c_name.as_str()));
        debug!(sheet = %c_name, "created sheet");
        c_name
    }

    pub fn change_sheet(&mut self, selector: impl Into<EnumSheetSelector>) -> Result<(), ExcelError> {
        self.idx_active = self.resolve_sheet_index(&selector.into())?;
        Ok(())
    }

    pub fn change_sheet_name(&mut self, old_name: &str, new_name: &str) -> Result<(), ExcelError> {
        let idx = self.resolve_sheet_index(&EnumSheetSelector::from(old_name))?;
        let c_name = sanitize_sheet_name(new_name, "_");
        let if_taken = self
            .l_sheets
            .iter()
            .enumerate()
            .any(|(idx_other, sheet)| idx_other != idx && sheet.name().eq_ignore_ascii_case(&c_name));
        if if_taken {
            return Err(ExcelError::InvalidSheet(format!(
                "sheet name {c_name:?} is already in use"
            )));
        }
        self.l_sheets[idx].set_name(c_name);
        Ok(())
    }

    /// Remove a sheet. The last remaining sheet cannot be deleted.
    pub fn delete_sheet(&mut self, selector: impl Into<EnumSheetSelector>) -> Result<(), ExcelError> {
        let idx = self.resolve_sheet_index(&selector.into())?;
        if self.l_sheets.len() == 1 {
            return Err(ExcelError::InvalidSheet(
                "a workbook must keep at least one sheet".to_string(),
            ));
        }
        let sheet = self.l_sheets.remove(idx);
        if idx < self.idx_active {
            self.idx_active -= 1;
        }
        self.idx_active = self.idx_active.min(self.l_sheets.len() - 1);
        debug!(sheet = %sheet.name(), "deleted sheet");
        Ok(())
    }

    fn resolve_sheet_index(&self, selector: &EnumSheetSelector) -> Result<usize, ExcelError> {
        match selector {
            EnumSheetSelector::Index(n_idx) => {
                if (1..=self.l_sheets.len()).contains(n_idx) {
                    Ok(n_idx - 1)
                } else {
                    Err(ExcelError::SheetNotFound(format!(
                        "index {n_idx} (workbook has {} sheets)",
                        self.l_sheets.len()
                    )))
                }
            }
            EnumSheetSelector::Name(name) => self
                .l_sheets
                .iter()
                .position(|sheet| sheet.name() == name)
                .ok_or_else(|| ExcelError::SheetNotFound(name.clone())),
        }
    }

    fn derive_unique_sheet_name(&self, name: &str) -> String {
        let if_taken =
            |c_name: &str| self.l_sheets.iter().any(|sheet| sheet.name().eq_ignore_ascii_case(c_name));
        if !if_taken(name) {
            return name.to_string();
        }

        let mut n_suffix = 1usize;
        loop {
            let c_candidate = create_sheet_identifier(name, n_suffix);
            if !if_taken(&c_candidate) {
                return c_candidate;
            }
            n_suffix += 1;
        }
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region Dimensions

    /// Zoom percentage of the active sheet, within 10..=400.
    pub fn set_zoom(&mut self, value: u16) -> Result<(), ExcelError> {
        if !(N_ZOOM_MIN..=N_ZOOM_MAX).contains(&value) {
            return Err(ExcelError::InvalidZoom(value));
        }
        self.active_sheet_mut().set_zoom(value);
        Ok(())
    }

    /// Row height in external units, stored as `height * 121 / 200`.
    pub fn set_height(&mut self, row: usize, height: f64) -> Result<(), ExcelError> {
        let coord = convert_range(&EnumRangeRef::from((1usize, row)))?;
        let (num, den) = TUP_HEIGHT_UNIT_FACTOR;
        self.active_sheet_mut()
            .set_row_height(coord.row, height * num / den);
        Ok(())
    }

    /// Column width in external units, stored as `width * 111 / 1000`.
    pub fn set_width(
        &mut self,
        column: impl Into<EnumRangePart>,
        width: f64,
    ) -> Result<(), ExcelError> {
        let coord = convert_range(&EnumRangeRef::Pair(column.into(), EnumRangePart::Index(1)))?;
        let (num, den) = TUP_WIDTH_UNIT_FACTOR;
        self.active_sheet_mut()
            .set_column_width(coord.column, width * num / den);
        Ok(())
    }

    /// Auto-size the columns of a range and return the applied plan.
    ///
    /// Clamped columns get `wrap` over the range's rows.
    pub fn adjust_width(
        &mut self,
        start: impl Into<EnumRangeRef>,
        end: impl Into<EnumRangeRef>,
        policy: &SpecAutofitPolicy,
    ) -> Result<SpecAutofitPlan, ExcelError> {
        let coord_start = convert_range(&start.into())?;
        let coord_end = convert_range(&end.into())?;

        let sheet = self.active_sheet_mut();
        let plan = sheet.plan_autofit(coord_start, coord_end, policy);
        for (&n_col, &n_width) in &plan.widths_by_col {
            trace!(
                sheet = %sheet.name(),
                column = %convert_number_to_letters(n_col),
                width = n_width,
                "autofit width"
            );
            sheet.set_column_width(n_col, n_width as f64);
        }
        for &n_col in &plan.cols_wrapped {
            sheet.apply_wrap(n_col, plan.rows);
        }
        Ok(plan)
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region Values

    pub fn get_value_singular(
        &self,
        range: impl Into<EnumRangeRef>,
    ) -> Result<EnumCellValue, ExcelError> {
        let coord = convert_range(&range.into())?;
        Ok(self.active_sheet().get_value(coord))
    }

    /// Values of a range, flat and row-major.
    pub fn get_value_multiple(
        &self,
        start: impl Into<EnumRangeRef>,
        end: impl Into<EnumRangeRef>,
    ) -> Result<Vec<EnumCellValue>, ExcelError> {
        let (coord_start, coord_end) = derive_range_bounds(start, end)?;
        let sheet = self.active_sheet();
        Ok(derive_region_coords(coord_start, coord_end)
            .map(|coord| sheet.get_value(coord))
            .collect())
    }

    /// Values of a range, one inner vector per row.
    pub fn get_value_2d(
        &self,
        start: impl Into<EnumRangeRef>,
        end: impl Into<EnumRangeRef>,
    ) -> Result<Vec<Vec<EnumCellValue>>, ExcelError> {
        let (coord_start, coord_end) = derive_range_bounds(start, end)?;
        let sheet = self.active_sheet();
        Ok((coord_start.row..=coord_end.row)
            .map(|n_row| {
                (coord_start.column..=coord_end.column)
                    .map(|n_col| sheet.get_value(SpecCellCoord::new(n_col, n_row)))
                    .collect()
            })
            .collect())
    }

    pub fn write_value_singular(
        &mut self,
        range: impl Into<EnumRangeRef>,
        value: impl Into<EnumWriteValue>,
    ) -> Result<(), ExcelError> {
        let EnumWriteValue::Scalar(value) = value.into() else {
            return Err(ExcelError::InvalidValueShape(
                "Use write_value_multiple if the value is a sequence".to_string(),
            ));
        };
        let coord = convert_range(&range.into())?;
        self.active_sheet_mut().write_value(coord, value)
    }

    /// Broadcast a scalar, or consume a flat sequence row-major. Extra values are ignored.
    pub fn write_value_multiple(
        &mut self,
        start: impl Into<EnumRangeRef>,
        end: impl Into<EnumRangeRef>,
        value: impl Into<EnumWriteValue>,
    ) -> Result<(), ExcelError> {
        let (coord_start, coord_end) = derive_range_bounds(start, end)?;
        let l_coords: Vec<SpecCellCoord> = derive_region_coords(coord_start, coord_end).collect();

        let l_values: Vec<EnumCellValue> = match value.into() {
            EnumWriteValue::Scalar(value) => vec![value; l_coords.len()],
            EnumWriteValue::Sequence(l_items) => {
                let mut l_values = Vec::with_capacity(l_items.len());
                for item in l_items {
                    match item {
                        EnumWriteValue::Scalar(value) => l_values.push(value),
                        EnumWriteValue::Sequence(_) => {
                            return Err(ExcelError::InvalidValueShape(
                                "Use write_value_2d if the value is a 2D sequence".to_string(),
                            ));
                        }
                    }
                }
                if l_values.len() < l_coords.len() {
                    return Err(ExcelError::ValueIndexOutOfRange {
                        n_needed: l_coords.len(),
                        n_given: l_values.len(),
                    });
                }
                l_values
            }
        };

        let sheet = self.active_sheet_mut();
        for coord in &l_coords {
            sheet.validate_writable(*coord)?;
        }
        for (coord, value) in l_coords.into_iter().zip(l_values) {
            sheet.write_value(coord, value)?;
        }
        Ok(())
    }

    /// Write a rectangular block anchored at `start`.
    ///
    /// The width comes from the first row; every row must be at least that long.
    pub fn write_value_2d(
        &mut self,
        start: impl Into<EnumRangeRef>,
        values: impl Into<EnumWriteValue>,
    ) -> Result<(), ExcelError> {
        let coord_start = convert_range(&start.into())?;
        let EnumWriteValue::Sequence(l_rows) = values.into() else {
            return Err(ExcelError::InvalidValueShape(
                "Value must be a 2D sequence".to_string(),
            ));
        };

        let mut l_grid: Vec<Vec<EnumCellValue>> = Vec::with_capacity(l_rows.len());
        for row in l_rows {
            let EnumWriteValue::Sequence(l_items) = row else {
                return Err(ExcelError::InvalidValueShape(
                    "Value must be a 2D sequence".to_string(),
                ));
            };
            let mut l_row = Vec::with_capacity(l_items.len());
            for item in l_items {
                let EnumWriteValue::Scalar(value) = item else {
                    return Err(ExcelError::InvalidValueShape(
                        "2D sequence rows must hold scalar values".to_string(),
                    ));
                };
                l_row.push(value);
            }
            l_grid.push(l_row);
        }

        let Some(n_width) = l_grid.first().map(Vec::len) else {
            return Err(ExcelError::ValueIndexOutOfRange {
                n_needed: 1,
                n_given: 0,
            });
        };
        if let Some(row_short) = l_grid.iter().find(|row| row.len() < n_width) {
            return Err(ExcelError::ValueIndexOutOfRange {
                n_needed: n_width,
                n_given: row_short.len(),
            });
        }
        if n_width == 0 {
            return Ok(());
        }

        let coord_end = convert_range(&EnumRangeRef::from((
            coord_start.column + n_width - 1,
            coord_start.row + l_grid.len() - 1,
        )))?;
        let sheet = self.active_sheet_mut();
        for coord in derive_region_coords(coord_start, coord_end) {
            sheet.validate_writable(coord)?;
        }
        for (idx_row, l_row) in l_grid.into_iter().enumerate() {
            for (idx_col, value) in l_row.into_iter().take(n_width).enumerate() {
                let coord =
                    SpecCellCoord::new(coord_start.column + idx_col, coord_start.row + idx_row);
                sheet.write_value(coord, value)?;
            }
        }
        Ok(())
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region Merge

    pub fn merge(
        &mut self,
        start: impl Into<EnumRangeRef>,
        end: impl Into<EnumRangeRef>,
    ) -> Result<(), ExcelError> {
        let (coord_start, coord_end) = derive_range_bounds(start, end)?;
        self.active_sheet_mut()
            .add_merge(SpecMergeRegion::new(coord_start, coord_end))
    }

    pub fn unmerge(
        &mut self,
        start: impl Into<EnumRangeRef>,
        end: impl Into<EnumRangeRef>,
    ) -> Result<(), ExcelError> {
        let (coord_start, coord_end) = derive_range_bounds(start, end)?;
        self.active_sheet_mut()
            .remove_merge(SpecMergeRegion::new(coord_start, coord_end))
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region Styles

    pub fn font_singular(
        &mut self,
        range: impl Into<EnumRangeRef>,
        options: &SpecFontOptions,
    ) -> Result<(), ExcelError> {
        let coord = convert_range(&range.into())?;
        let font = Rc::new(options.build()?);
        self.active_sheet_mut().style_mut(coord).font = Some(font);
        Ok(())
    }

    pub fn font_multiple(
        &mut self,
        start: impl Into<EnumRangeRef>,
        end: impl Into<EnumRangeRef>,
        options: &SpecFontOptions,
    ) -> Result<(), ExcelError> {
        let (coord_start, coord_end) = derive_range_bounds(start, end)?;
        let font = Rc::new(options.build()?);
        let sheet = self.active_sheet_mut();
        for coord in derive_region_coords(coord_start, coord_end) {
            sheet.style_mut(coord).font = Some(Rc::clone(&font));
        }
        Ok(())
    }

    pub fn fill_singular(
        &mut self,
        range: impl Into<EnumRangeRef>,
        options: &SpecFillOptions,
    ) -> Result<(), ExcelError> {
        let coord = convert_range(&range.into())?;
        let fill = Rc::new(options.build()?);
        self.active_sheet_mut().style_mut(coord).fill = Some(fill);
        Ok(())
    }

    /// Fill a range; with `shade`, odd columns get the main fill and even columns the shade fill.
    pub fn fill_multiple(
        &mut self,
        start: impl Into<EnumRangeRef>,
        end: impl Into<EnumRangeRef>,
        options: &SpecFillOptions,
    ) -> Result<(), ExcelError> {
        let (coord_start, coord_end) = derive_range_bounds(start, end)?;
        let fill_main = Rc::new(options.build()?);
        let fill_shade = if options.shade {
            Rc::new(options.build_shade()?)
        } else {
            Rc::clone(&fill_main)
        };

        let sheet = self.active_sheet_mut();
        for coord in derive_region_coords(coord_start, coord_end) {
            let fill = if coord.column % 2 == 0 {
                &fill_shade
            } else {
                &fill_main
            };
            sheet.style_mut(coord).fill = Some(Rc::clone(fill));
        }
        Ok(())
    }

    /// Replace the border of one cell with `options` on the edges named by `side`.
    pub fn border_singular(
        &mut self,
        range: impl Into<EnumRangeRef>,
        side: &str,
        options: &SpecBorderOptions,
    ) -> Result<(), ExcelError> {
        let coord = convert_range(&range.into())?;
        let border = Rc::new(derive_border(side, options)?);
        self.active_sheet_mut().style_mut(coord).border = Some(border);
        Ok(())
    }

    pub fn border_multiple(
        &mut self,
        start: impl Into<EnumRangeRef>,
        end: impl Into<EnumRangeRef>,
        side: &str,
        options: &SpecBorderOptions,
    ) -> Result<(), ExcelError> {
        let (coord_start, coord_end) = derive_range_bounds(start, end)?;
        let border = Rc::new(derive_border(side, options)?);
        let sheet = self.active_sheet_mut();
        for coord in derive_region_coords(coord_start, coord_end) {
            sheet.style_mut(coord).border = Some(Rc::clone(&border));
        }
        Ok(())
    }

    /// Thick left edge on `start`, thick right edge on `end`, thin elsewhere on both.
    ///
    /// Cells between the two are left untouched.
    pub fn side_thick_border(
        &mut self,
        start: impl Into<EnumRangeRef>,
        end: impl Into<EnumRangeRef>,
    ) -> Result<(), ExcelError> {
        let (coord_start, coord_end) = derive_range_bounds(start, end)?;
        let side_thin = Some(StyleBorderSide::new(FormatBorder::Thin));
        let side_thick = Some(StyleBorderSide::new(FormatBorder::Thick));

        let border_start = StyleBorder {
            top: side_thin,
            bottom: side_thin,
            left: side_thick,
            right: side_thin,
        };
        let border_end = StyleBorder {
            left: side_thin,
            right: side_thick,
            ..border_start.clone()
        };

        let sheet = self.active_sheet_mut();
        sheet.style_mut(coord_start).border = Some(Rc::new(border_start));
        sheet.style_mut(coord_end).border = Some(Rc::new(border_end));
        Ok(())
    }

    pub fn alignment_singular(
        &mut self,
        range: impl Into<EnumRangeRef>,
        options: &SpecAlignmentOptions,
    ) -> Result<(), ExcelError> {
        let coord = convert_range(&range.into())?;
        let alignment = Rc::new(options.build()?);
        self.active_sheet_mut().style_mut(coord).alignment = Some(alignment);
        Ok(())
    }

    pub fn alignment_multiple(
        &mut self,
        start: impl Into<EnumRangeRef>,
        end: impl Into<EnumRangeRef>,
        options: &SpecAlignmentOptions,
    ) -> Result<(), ExcelError> {
        let (coord_start, coord_end) = derive_range_bounds(start, end)?;
        let alignment = Rc::new(options.build()?);
        let sheet = self.active_sheet_mut();
        for coord in derive_region_coords(coord_start, coord_end) {
            sheet.style_mut(coord).alignment = Some(Rc::clone(&alignment));
        }
        Ok(())
    }

    /// Set a display format (e.g. `#,##0`) without touching the value.
    pub fn change_cell_number_format_singular(
        &mut self,
        range: impl Into<EnumRangeRef>,
        number_format: &str,
    ) -> Result<(), ExcelError> {
        let coord = convert_range(&range.into())?;
        self.active_sheet_mut().style_mut(coord).num_format = Some(Rc::from(number_format));
        Ok(())
    }

    pub fn change_cell_number_format_multiple(
        &mut self,
        start: impl Into<EnumRangeRef>,
        end: impl Into<EnumRangeRef>,
        number_format: &str,
    ) -> Result<(), ExcelError> {
        let (coord_start, coord_end) = derive_range_bounds(start, end)?;
        let num_format: Rc<str> = Rc::from(number_format);
        let sheet = self.active_sheet_mut();
        for coord in derive_region_coords(coord_start, coord_end) {
            sheet.style_mut(coord).num_format = Some(Rc::clone(&num_format));
        }
        Ok(())
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
}

fn derive_range_bounds(
    start: impl Into<EnumRangeRef>,
    end: impl Into<EnumRangeRef>,
) -> Result<(SpecCellCoord, SpecCellCoord), ExcelError> {
    Ok((convert_range(&start.into())?, convert_range(&end.into())?))
}

/// Cells of `start..=end` in row-major order. Reversed bounds yield nothing.
fn derive_region_coords(
    start: SpecCellCoord,
    end: SpecCellCoord,
) -> impl Iterator<Item = SpecCellCoord> {
    (start.row..=end.row).flat_map(move |n_row| {
        (start.column..=end.column).map(move |n_col| SpecCellCoord::new(n_col, n_row))
    })
}

fn derive_border(side: &str, options: &SpecBorderOptions) -> Result<StyleBorder, ExcelError> {
    let side = side.parse::<EnumBorderSide>()?;
    Ok(StyleBorder::from_side(side, options.build()?))
}

fn derive_cell_value_from_data(data: &Data) -> EnumCellValue {
    match data {
        Data::Empty => EnumCellValue::None,
        Data::String(val) => EnumCellValue::String(val.clone()),
        Data::Float(val) => EnumCellValue::Number(*val),
        Data::Int(val) => EnumCellValue::Number(*val as f64),
        Data::Bool(val) => EnumCellValue::Boolean(*val),
        Data::DateTime(val) => EnumCellValue::DateTime(val.as_f64()),
        Data::DateTimeIso(val) | Data::DurationIso(val) => EnumCellValue::String(val.clone()),
        Data::Error(val) => EnumCellValue::String(format!("{val}")),
    }
}

////////////////////////////////////////////////////////////////////////////////
// #region SaveHelpers

fn write_sheet(worksheet: &mut Worksheet, sheet: &XlsxSheet) -> Result<(), ExcelError> {
    worksheet.set_name(sheet.name())?;
    if let Some(n_zoom) = sheet.zoom() {
        worksheet.set_zoom(n_zoom);
    }
    for (&n_col, &n_width) in sheet.column_widths() {
        worksheet.set_column_width(cast_col_num(n_col)?, n_width)?;
    }
    for (&n_row, &n_height) in sheet.row_heights() {
        worksheet.set_row_height(cast_row_num(n_row)?, n_height)?;
    }

    // Merges first: `merge_range` blanks the whole region, cells below overwrite it.
    for region in sheet.merges() {
        if region.is_single_cell() {
            continue;
        }
        let format = sheet
            .cell(region.start)
            .map(|cell| derive_rust_xlsx_format(&cell.style, &cell.value))
            .unwrap_or_else(Format::new);
        worksheet.merge_range(
            cast_row_num(region.start.row)?,
            cast_col_num(region.start.column)?,
            cast_row_num(region.end.row)?,
            cast_col_num(region.end.column)?,
            "",
            &format,
        )?;
    }

    let value_blank = EnumCellValue::None;
    for (&coord, cell) in sheet.cells() {
        let if_member = sheet.find_member_region(coord).is_some();
        if cell.style.is_empty() && (if_member || cell.value.is_none()) {
            continue;
        }
        let value = if if_member { &value_blank } else { &cell.value };
        let format = derive_rust_xlsx_format(&cell.style, value);
        write_cell_with_format(worksheet, coord, value, &format)?;
    }
    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    coord: SpecCellCoord,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), ExcelError> {
    let n_row = cast_row_num(coord.row)?;
    let n_col = cast_col_num(coord.column)?;
    match value {
        EnumCellValue::None => {
            worksheet.write_blank(n_row, n_col, format)?;
        }
        EnumCellValue::String(val) => {
            worksheet.write_string_with_format(n_row, n_col, val, format)?;
        }
        EnumCellValue::Number(val) | EnumCellValue::DateTime(val) => {
            worksheet.write_number_with_format(n_row, n_col, *val, format)?;
        }
        EnumCellValue::Boolean(val) => {
            worksheet.write_boolean_with_format(n_row, n_col, *val, format)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(style: &SpecCellStyle, value: &EnumCellValue) -> Format {
    let mut format = Format::new();

    if let Some(font) = &style.font {
        if let Some(val) = &font.name {
            format = format.set_font_name(val.as_str());
        }
        if let Some(val) = font.size {
            format = format.set_font_size(val);
        }
        if let Some(val) = font.color {
            format = format.set_font_color(val);
        }
        if let Some(val) = font.underline {
            format = format.set_underline(val);
        }
        if font.bold {
            format = format.set_bold();
        }
        if font.italic {
            format = format.set_italic();
        }
        if font.strike {
            format = format.set_font_strikethrough();
        }
    }

    if let Some(fill) = &style.fill {
        format = format.set_pattern(fill.pattern);
        // Solid fills show the background colour in rust_xlsxwriter.
        match (fill.pattern, fill.color_main, fill.color_second) {
            (FormatPattern::None, _, _) => {}
            (FormatPattern::Solid, Some(main), _) => {
                format = format.set_background_color(main);
            }
            (_, main, second) => {
                if let Some(val) = main {
                    format = format.set_foreground_color(val);
                }
                if let Some(val) = second {
                    format = format.set_background_color(val);
                }
            }
        }
    }

    if let Some(border) = &style.border {
        if let Some(side) = border.top {
            format = format.set_border_top(side.style);
            if let Some(color) = side.color {
                format = format.set_border_top_color(color);
            }
        }
        if let Some(side) = border.bottom {
            format = format.set_border_bottom(side.style);
            if let Some(color) = side.color {
                format = format.set_border_bottom_color(color);
            }
        }
        if let Some(side) = border.left {
            format = format.set_border_left(side.style);
            if let Some(color) = side.color {
                format = format.set_border_left_color(color);
            }
        }
        if let Some(side) = border.right {
            format = format.set_border_right(side.style);
            if let Some(color) = side.color {
                format = format.set_border_right_color(color);
            }
        }
    }

    if let Some(alignment) = &style.alignment {
        if let Some(val) = alignment.horizontal {
            format = format.set_align(val);
        }
        if let Some(val) = alignment.vertical {
            format = format.set_align(val);
        }
        if let Some(val) = alignment.rotation {
            format = format.set_rotation(val);
        }
        if let Some(val) = alignment.indent {
            format = format.set_indent(val);
        }
        if alignment.wrap {
            format = format.set_text_wrap();
        }
        if alignment.shrink {
            format = format.set_shrink();
        }
    }

    match (&style.num_format, value) {
        (Some(val), _) => format = format.set_num_format(val.to_string()),
        (None, EnumCellValue::DateTime(_)) => format = format.set_num_format(C_NUM_FORMAT_DATETIME),
        _ => {}
    }

    format
}

/// 1-based row to the writer's 0-based row number.
fn cast_row_num(value: usize) -> Result<u32, ExcelError> {
    u32::try_from(value.saturating_sub(1))
        .map_err(|_| ExcelError::InvalidRange(format!("row index overflow: {value}")))
}

/// 1-based column to the writer's 0-based column number.
fn cast_col_num(value: usize) -> Result<u16, ExcelError> {
    u16::try_from(value.saturating_sub(1))
        .map_err(|_| ExcelError::InvalidRange(format!("column index overflow: {value}")))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rust_xlsxwriter::FormatAlign;
    use serde_json::json;

    use super::*;

    fn new_workbook() -> XlsxWorkbook {
        XlsxWorkbook::create("unused.xlsx")
    }

    fn border_at(workbook: &XlsxWorkbook, range: &str) -> Option<StyleBorder> {
        let coord = convert_range(&range.into()).unwrap();
        workbook
            .active_sheet()
            .cell(coord)
            .and_then(|cell| cell.style.border.as_deref().cloned())
    }

    #[test]
    fn test_scalar_round_trip_for_text_integer_boolean() {
        let mut workbook = new_workbook();
        workbook.write_value_singular("A1", "kertas").unwrap();
        workbook.write_value_singular(("B", 1), 42i64).unwrap();
        workbook.write_value_singular("C1", true).unwrap();

        assert_eq!(workbook.get_value_singular("A1").unwrap(), EnumCellValue::from("kertas"));
        assert_eq!(workbook.get_value_singular("b1").unwrap(), EnumCellValue::Number(42.0));
        assert_eq!(workbook.get_value_singular("C1").unwrap(), EnumCellValue::Boolean(true));
        assert_eq!(workbook.get_value_singular("D1").unwrap(), EnumCellValue::None);
    }

    #[test]
    fn test_write_value_singular_rejects_sequences() {
        let mut workbook = new_workbook();
        let err = workbook
            .write_value_singular("A1", vec![1i64, 2])
            .unwrap_err();
        assert!(matches!(err, ExcelError::InvalidValueShape(_)));
    }

    #[test]
    fn test_write_value_multiple_is_row_major() {
        let mut workbook = new_workbook();
        workbook
            .write_value_multiple("A1", "B2", vec!["a", "b", "c", "d", "extra"])
            .unwrap();
        assert_eq!(
            workbook.get_value_2d("A1", "B2").unwrap(),
            vec![
                vec![EnumCellValue::from("a"), EnumCellValue::from("b")],
                vec![EnumCellValue::from("c"), EnumCellValue::from("d")],
            ]
        );
        assert_eq!(workbook.get_value_singular("C1").unwrap(), EnumCellValue::None);

        workbook.write_value_multiple("A3", "C3", 0i64).unwrap();
        assert_eq!(
            workbook.get_value_multiple("A3", "C3").unwrap(),
            vec![EnumCellValue::Number(0.0); 3]
        );
    }

    #[test]
    fn test_write_value_multiple_shape_errors() {
        let mut workbook = new_workbook();
        assert!(matches!(
            workbook.write_value_multiple("A1", "B2", vec![1i64, 2, 3]),
            Err(ExcelError::ValueIndexOutOfRange { n_needed: 4, n_given: 3 })
        ));
        assert!(matches!(
            workbook.write_value_multiple("A1", "B1", vec![vec![1i64], vec![2i64]]),
            Err(ExcelError::InvalidValueShape(_))
        ));
    }

    #[test]
    fn test_write_value_2d_derives_end_from_shape() {
        let mut workbook = new_workbook();
        workbook
            .write_value_2d("B2", vec![vec![1i64, 2, 3], vec![4i64, 5, 6]])
            .unwrap();
        assert_eq!(workbook.get_value_singular("D3").unwrap(), EnumCellValue::Number(6.0));
        assert_eq!(workbook.get_value_singular("E2").unwrap(), EnumCellValue::None);

        assert!(matches!(
            workbook.write_value_2d("A1", vec![1i64, 2]),
            Err(ExcelError::InvalidValueShape(_))
        ));
        assert!(matches!(
            workbook.write_value_2d("A1", EnumWriteValue::Sequence(Vec::new())),
            Err(ExcelError::ValueIndexOutOfRange { .. })
        ));
        assert!(matches!(
            workbook.write_value_2d("A1", vec![vec![1i64, 2], vec![3i64]]),
            Err(ExcelError::ValueIndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_merged_member_is_read_only() {
        let mut workbook = new_workbook();
        workbook.write_value_singular("A1", "judul").unwrap();
        workbook.merge("A1", "C1").unwrap();
        assert!(matches!(
            workbook.write_value_singular("B1", "x"),
            Err(ExcelError::MergedCellWrite(_))
        ));
        assert!(workbook.merge("C1", "D2").is_err());
        workbook.unmerge("A1", "C1").unwrap();
        workbook.write_value_singular("B1", "x").unwrap();
    }

    #[test]
    fn test_range_writes_touching_merged_member_write_nothing() {
        let mut workbook = new_workbook();
        workbook.write_value_singular("A1", "judul").unwrap();
        workbook.merge("A1", "B1").unwrap();

        assert!(matches!(
            workbook.write_value_multiple("A1", "C1", vec![1i64, 2, 3]),
            Err(ExcelError::MergedCellWrite(_))
        ));
        assert!(matches!(
            workbook.write_value_2d("A1", vec![vec![1i64, 2, 3]]),
            Err(ExcelError::MergedCellWrite(_))
        ));
        assert_eq!(
            workbook.get_value_multiple("A1", "C1").unwrap(),
            vec![
                EnumCellValue::from("judul"),
                EnumCellValue::None,
                EnumCellValue::None
            ]
        );
    }

    #[test]
    fn test_write_value_2d_from_loose_json() {
        let mut workbook = new_workbook();
        let values = EnumWriteValue::from_json(&json!([["Nama", 3], [true, null]])).unwrap();
        workbook.write_value_2d("B2", values).unwrap();

        assert_eq!(
            workbook.get_value_2d("B2", "C3").unwrap(),
            vec![
                vec![EnumCellValue::from("Nama"), EnumCellValue::Number(3.0)],
                vec![EnumCellValue::Boolean(true), EnumCellValue::None],
            ]
        );
        assert!(matches!(
            EnumWriteValue::from_json(&json!([{"a": 1}])),
            Err(ExcelError::InvalidValueShape(_))
        ));
    }

    #[test]
    fn test_set_zoom_bounds() {
        let mut workbook = new_workbook();
        workbook.set_zoom(10).unwrap();
        workbook.set_zoom(400).unwrap();
        assert!(matches!(workbook.set_zoom(9), Err(ExcelError::InvalidZoom(9))));
        assert!(matches!(workbook.set_zoom(401), Err(ExcelError::InvalidZoom(401))));
        assert_eq!(workbook.active_sheet().zoom(), Some(400));
    }

    #[test]
    fn test_side_thick_border_marks_only_the_ends() {
        let mut workbook = new_workbook();
        workbook.side_thick_border("A1", "C1").unwrap();

        let border_a = border_at(&workbook, "A1").unwrap();
        assert_eq!(border_a.left.unwrap().style, FormatBorder::Thick);
        assert_eq!(border_a.right.unwrap().style, FormatBorder::Thin);
        assert_eq!(border_a.top.unwrap().style, FormatBorder::Thin);

        let border_c = border_at(&workbook, "C1").unwrap();
        assert_eq!(border_c.right.unwrap().style, FormatBorder::Thick);
        assert_eq!(border_c.left.unwrap().style, FormatBorder::Thin);
        assert_eq!(border_c.bottom.unwrap().style, FormatBorder::Thin);

        assert!(border_at(&workbook, "B1").is_none());
    }

    #[test]
    fn test_border_side_selector_and_sharing() {
        let mut workbook = new_workbook();
        workbook
            .border_multiple("A1", "B2", "Bottom", &SpecBorderOptions::with_style("thin"))
            .unwrap();
        let border = border_at(&workbook, "B2").unwrap();
        assert_eq!(border.bottom.unwrap().style, FormatBorder::Thin);
        assert!(border.top.is_none());

        let sheet = workbook.active_sheet();
        let rc_a1 = sheet.cell(SpecCellCoord::new(1, 1)).unwrap().style.border.clone().unwrap();
        let rc_b2 = sheet.cell(SpecCellCoord::new(2, 2)).unwrap().style.border.clone().unwrap();
        assert!(Rc::ptr_eq(&rc_a1, &rc_b2));

        assert!(matches!(
            workbook.border_singular("A1", "middle", &SpecBorderOptions::default()),
            Err(ExcelError::InvalidSide(_))
        ));
    }

    #[test]
    fn test_fill_multiple_shade_bands_by_column() {
        let mut workbook = new_workbook();
        let options = SpecFillOptions {
            shade: true,
            second_color: Some("00FF00".to_string()),
            ..SpecFillOptions::solid("FFFF00")
        };
        workbook.fill_multiple("A1", "D1", &options).unwrap();

        let sheet = workbook.active_sheet();
        let color_at = |n_col: usize| {
            sheet
                .cell(SpecCellCoord::new(n_col, 1))
                .and_then(|cell| cell.style.fill.as_ref())
                .and_then(|fill| fill.color_main)
        };
        assert_eq!(color_at(1), Some(rust_xlsxwriter::Color::RGB(0xFFFF00)));
        assert_eq!(color_at(2), Some(rust_xlsxwriter::Color::RGB(0x00FF00)));
        assert_eq!(color_at(3), Some(rust_xlsxwriter::Color::RGB(0xFFFF00)));
    }

    #[test]
    fn test_adjust_width_clamps_and_wraps_range_rows() {
        let mut workbook = new_workbook();
        workbook
            .write_value_multiple("A2", "A4", vec!["abc", "abcdefg", "ab"])
            .unwrap();
        workbook
            .alignment_singular("A3", &SpecAlignmentOptions::centered())
            .unwrap();

        let plan = workbook
            .adjust_width(
                "A2",
                "A4",
                &SpecAutofitPolicy {
                    extra_width: 0,
                    width_limit: Some(5),
                },
            )
            .unwrap();
        assert_eq!(plan.widths_by_col.get(&1), Some(&6));
        assert_eq!(workbook.active_sheet().column_widths().get(&1), Some(&6.0));

        let sheet = workbook.active_sheet();
        let alignment = sheet.cell(SpecCellCoord::new(1, 3)).unwrap().style.alignment.clone().unwrap();
        assert!(alignment.wrap);
        assert_eq!(alignment.horizontal, Some(FormatAlign::Center));
        assert!(sheet.cell(SpecCellCoord::new(1, 1)).is_none());
    }

    #[test]
    fn test_set_width_and_height_apply_unit_factors() {
        let mut workbook = new_workbook();
        workbook.set_width("B", 1000.0).unwrap();
        workbook.set_height(3, 200.0).unwrap();
        let sheet = workbook.active_sheet();
        assert_eq!(sheet.column_widths().get(&2), Some(&111.0));
        assert_eq!(sheet.row_heights().get(&3), Some(&121.0));
        assert!(workbook.clone().set_width(0usize, 10.0).is_err());
    }

    #[test]
    fn test_sheet_lifecycle() {
        let mut workbook = new_workbook();
        assert_eq!(workbook.create_sheet("Barang"), "Barang");
        assert_eq!(workbook.create_sheet("barang"), "barang1");
        assert_eq!(workbook.create_sheet("a/b"), "a_b");
        assert_eq!(workbook.sheet_names(), vec!["Sheet", "Barang", "barang1", "a_b"]);

        workbook.change_sheet(2usize).unwrap();
        assert_eq!(workbook.active_sheet().name(), "Barang");
        workbook.change_sheet("a_b").unwrap();
        assert!(workbook.change_sheet(9usize).is_err());
        assert!(workbook.change_sheet("missing").is_err());

        workbook.change_sheet_name("a_b", "Kategori").unwrap();
        assert!(workbook.change_sheet_name("Kategori", "barang").is_err());

        workbook.delete_sheet("Kategori").unwrap();
        assert_eq!(workbook.active_sheet().name(), "barang1");
        workbook.delete_sheet(1usize).unwrap();
        workbook.delete_sheet("Barang").unwrap();
        assert!(matches!(
            workbook.delete_sheet(1usize),
            Err(ExcelError::InvalidSheet(_))
        ));
    }
}
