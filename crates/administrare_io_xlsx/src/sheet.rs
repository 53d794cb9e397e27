//! In-memory grid of one worksheet: cells, merge regions, dimensions and the
//! auto-width planner.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::conf::N_WIDTH_AUTOFIT_PADDING;
use crate::spec::{
    EnumCellValue, ExcelError, SpecAutofitPlan, SpecAutofitPolicy, SpecCellCoord,
    SpecMergeRegion,
};
use crate::style::{StyleAlignment, StyleBorder, StyleFill, StyleFont};

/// Style families attached to one cell. Families are shared, never mutated.
#[derive(Debug, Clone, Default)]
pub struct SpecCellStyle {
    pub font: Option<Rc<StyleFont>>,
    pub fill: Option<Rc<StyleFill>>,
    pub border: Option<Rc<StyleBorder>>,
    pub alignment: Option<Rc<StyleAlignment>>,
    pub num_format: Option<Rc<str>>,
}

impl SpecCellStyle {
    pub fn is_empty(&self) -> bool {
        self.font.is_none()
            && self.fill.is_none()
            && self.border.is_none()
            && self.alignment.is_none()
            && self.num_format.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct XlsxCell {
    pub value: EnumCellValue,
    pub style: SpecCellStyle,
}

/// One named worksheet.
#[derive(Debug, Clone)]
pub struct XlsxSheet {
    name: String,
    dict_cells: BTreeMap<SpecCellCoord, XlsxCell>,
    l_merges: Vec<SpecMergeRegion>,
    dict_widths: BTreeMap<usize, f64>,
    dict_heights: BTreeMap<usize, f64>,
    zoom: Option<u16>,
}

impl XlsxSheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dict_cells: BTreeMap::new(),
            l_merges: Vec::new(),
            dict_widths: BTreeMap::new(),
            dict_heights: BTreeMap::new(),
            zoom: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn cell(&self, coord: SpecCellCoord) -> Option<&XlsxCell> {
        self.dict_cells.get(&coord)
    }

    pub fn cells(&self) -> impl Iterator<Item = (&SpecCellCoord, &XlsxCell)> {
        self.dict_cells.iter()
    }

    pub fn merges(&self) -> &[SpecMergeRegion] {
        &self.l_merges
    }

    pub fn column_widths(&self) -> &BTreeMap<usize, f64> {
        &self.dict_widths
    }

    pub fn row_heights(&self) -> &BTreeMap<usize, f64> {
        &self.dict_heights
    }

    pub fn zoom(&self) -> Option<u16> {
        self.zoom
    }

    pub(crate) fn set_zoom(&mut self, value: u16) {
        self.zoom = Some(value);
    }

    pub(crate) fn set_column_width(&mut self, column: usize, width: f64) {
        self.dict_widths.insert(column, width);
    }

    pub(crate) fn set_row_height(&mut self, row: usize, height: f64) {
        self.dict_heights.insert(row, height);
    }

    /// Merge region whose non-anchor area holds `coord`, if any.
    pub fn find_member_region(&self, coord: SpecCellCoord) -> Option<&SpecMergeRegion> {
        self.l_merges.iter().find(|region| region.is_member(coord))
    }

    /// Value at `coord`; merged members and unset cells read as empty.
    pub fn get_value(&self, coord: SpecCellCoord) -> EnumCellValue {
        if self.find_member_region(coord).is_some() {
            return EnumCellValue::None;
        }
        self.dict_cells
            .get(&coord)
            .map(|cell| cell.value.clone())
            .unwrap_or_default()
    }

    /// Fail when `coord` is a merged member.
    pub fn validate_writable(&self, coord: SpecCellCoord) -> Result<(), ExcelError> {
        match self.find_member_region(coord) {
            Some(region) => Err(ExcelError::MergedCellWrite(format!("{coord} (in {region})"))),
            None => Ok(()),
        }
    }

    pub fn write_value(
        &mut self,
        coord: SpecCellCoord,
        value: EnumCellValue,
    ) -> Result<(), ExcelError> {
        self.validate_writable(coord)?;
        self.dict_cells.entry(coord).or_default().value = value;
        Ok(())
    }

    /// Mutable style of `coord`; merged members may carry styles (borders).
    pub(crate) fn style_mut(&mut self, coord: SpecCellCoord) -> &mut SpecCellStyle {
        &mut self.dict_cells.entry(coord).or_default().style
    }

    /// Declare a merge region and clear its member values.
    pub fn add_merge(&mut self, region: SpecMergeRegion) -> Result<(), ExcelError> {
        if let Some(existing) = self.l_merges.iter().find(|val| val.overlaps(&region)) {
            return Err(ExcelError::InvalidMerge(format!(
                "{region} overlaps merged range {existing}"
            )));
        }
        for (coord, cell) in self.dict_cells.iter_mut() {
            if region.is_member(*coord) {
                cell.value = EnumCellValue::None;
            }
        }
        self.l_merges.push(region);
        Ok(())
    }

    pub fn remove_merge(&mut self, region: SpecMergeRegion) -> Result<(), ExcelError> {
        let Some(idx) = self.l_merges.iter().position(|val| *val == region) else {
            return Err(ExcelError::InvalidMerge(format!("{region} is not merged")));
        };
        self.l_merges.remove(idx);
        Ok(())
    }

    /// Switch `wrap` on for the cells of `column` over `rows`, keeping other alignment fields.
    pub(crate) fn apply_wrap(&mut self, column: usize, rows: (usize, usize)) {
        for n_row in rows.0..=rows.1 {
            let style = self.style_mut(SpecCellCoord::new(column, n_row));
            let alignment = style
                .alignment
                .as_deref()
                .cloned()
                .unwrap_or_default();
            if alignment.wrap {
                continue;
            }
            style.alignment = Some(Rc::new(StyleAlignment {
                wrap: true,
                ..alignment
            }));
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    // #region AutofitPlanning

    /// Plan column widths for the inclusive range `start..=end`.
    ///
    /// A reversed range holds no cells and yields an empty plan.
    pub fn plan_autofit(
        &self,
        start: SpecCellCoord,
        end: SpecCellCoord,
        policy: &SpecAutofitPolicy,
    ) -> SpecAutofitPlan {
        let mut plan = SpecAutofitPlan {
            rows: (start.row, end.row),
            ..SpecAutofitPlan::default()
        };
        if start.column > end.column || start.row > end.row {
            return plan;
        }

        // (row, column) -> recorded display length
        let mut dict_lengths: BTreeMap<(usize, usize), usize> = BTreeMap::new();
        for n_row in start.row..=end.row {
            for n_col in start.column..=end.column {
                let coord = SpecCellCoord::new(n_col, n_row);
                let n_len = if self.find_member_region(coord).is_some() {
                    0
                } else {
                    self.dict_cells
                        .get(&coord)
                        .and_then(|cell| cell.value.to_display_string())
                        .map_or(0, |text| text.chars().count())
                };
                dict_lengths.insert((n_row, n_col), n_len);
            }
        }

        for region in &self.l_merges {
            let n_row_first = region.start.row.max(start.row);
            let n_row_last = region.end.row.min(end.row);
            let n_col_first = region.start.column.max(start.column);
            let n_col_last = region.end.column.min(end.column);
            if n_row_first > n_row_last || n_col_first > n_col_last {
                continue;
            }

            let n_span = n_col_last - n_col_first + 1;
            let n_len_total = dict_lengths
                .get(&(n_row_first, n_col_first))
                .copied()
                .unwrap_or(0);
            let n_len_each = n_len_total.div_ceil(n_span);
            for n_col in n_col_first..=n_col_last {
                dict_lengths.insert((n_row_first, n_col), n_len_each);
            }
        }

        let n_limit = policy.width_limit.filter(|val| *val > 0);
        for n_col in start.column..=end.column {
            let mut n_max = (start.row..=end.row)
                .filter_map(|n_row| dict_lengths.get(&(n_row, n_col)))
                .copied()
                .max()
                .unwrap_or(0);
            if let Some(n_limit) = n_limit
                && n_max > n_limit
            {
                n_max = n_limit;
                plan.cols_wrapped.push(n_col);
            }
            plan.widths_by_col.insert(
                n_col,
                n_max + N_WIDTH_AUTOFIT_PADDING + policy.extra_width,
            );
        }

        plan
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
}
