//! Style attribute builder.
//!
//! Each family has a typed option struct (all fields optional) that callers
//! can fill directly, plus `from_attributes` for loosely-typed JSON maps. The
//! `build` step validates names and colours and yields an immutable family
//! that maps one-to-one onto `rust_xlsxwriter` format calls.

use std::str::FromStr;

use rust_xlsxwriter::{Color, FormatAlign, FormatBorder, FormatPattern, FormatUnderline};
use serde_json::{Map, Value};

use crate::spec::ExcelError;
use crate::util::{normalize_lower_camel, parse_color};

////////////////////////////////////////////////////////////////////////////////
// #region AttributeReaders

fn read_str(
    attributes: &Map<String, Value>,
    key: &str,
    expected: &str,
) -> Result<Option<String>, ExcelError> {
    match attributes.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ExcelError::style_value(key, expected)),
    }
}

fn read_bool(attributes: &Map<String, Value>, key: &str) -> Result<Option<bool>, ExcelError> {
    match attributes.get(key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(ExcelError::style_value(key, "a boolean")),
    }
}

/// Integer or numeric string, coerced to `i64`.
fn read_int(attributes: &Map<String, Value>, key: &str) -> Result<Option<i64>, ExcelError> {
    let expected = "a string or an integer";
    match attributes.get(key) {
        None => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| ExcelError::style_value(key, expected)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ExcelError::style_value(key, expected)),
        Some(_) => Err(ExcelError::style_value(key, expected)),
    }
}

fn derive_color(key: &str, value: Option<&str>) -> Result<Option<Color>, ExcelError> {
    match value {
        None => Ok(None),
        Some(val) => parse_color(val)
            .map(Some)
            .ok_or_else(|| ExcelError::style_value(key, "a hex colour or basic colour name")),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Font

/// Font options. Absent fields keep the library defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecFontOptions {
    pub font: Option<String>,
    pub size: Option<i64>,
    pub color: Option<String>,
    /// `single`, `double`, `singleAccounting`, `doubleAccounting` or `none`.
    pub underline: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub strike: Option<bool>,
}

impl SpecFontOptions {
    /// Read recognized keys; unknown keys are ignored.
    pub fn from_attributes(attributes: &Map<String, Value>) -> Result<Self, ExcelError> {
        Ok(Self {
            font: read_str(attributes, "font", "a string")?,
            size: read_int(attributes, "size")?,
            color: read_str(attributes, "color", "a string")?,
            underline: read_str(attributes, "underline", "a string")?,
            bold: read_bool(attributes, "bold")?,
            italic: read_bool(attributes, "italic")?,
            strike: read_bool(attributes, "strike")?,
        })
    }

    pub fn build(&self) -> Result<StyleFont, ExcelError> {
        let underline = match &self.underline {
            None => None,
            Some(val) => Some(derive_format_underline(&normalize_lower_camel(val))?),
        };
        Ok(StyleFont {
            name: self.font.clone(),
            size: self.size.map(|val| val as f64),
            color: derive_color("color", self.color.as_deref())?,
            underline,
            bold: self.bold.unwrap_or(false),
            italic: self.italic.unwrap_or(false),
            strike: self.strike.unwrap_or(false),
        })
    }
}

/// Built font family.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleFont {
    pub name: Option<String>,
    pub size: Option<f64>,
    pub color: Option<Color>,
    pub underline: Option<FormatUnderline>,
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
}

fn derive_format_underline(name: &str) -> Result<FormatUnderline, ExcelError> {
    match name {
        "none" => Ok(FormatUnderline::None),
        "single" => Ok(FormatUnderline::Single),
        "double" => Ok(FormatUnderline::Double),
        "singleAccounting" => Ok(FormatUnderline::SingleAccounting),
        "doubleAccounting" => Ok(FormatUnderline::DoubleAccounting),
        _ => Err(ExcelError::style_value(
            "underline",
            "one of single, double, singleAccounting, doubleAccounting",
        )),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Fill

/// Pattern fill options.
///
/// `fill_type` of `None` means no fill. With a solid pattern the main colour
/// is the visible cell colour; other patterns draw the main colour over the
/// second one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecFillOptions {
    pub fill_type: Option<String>,
    pub main_color: Option<String>,
    pub second_color: Option<String>,
    /// Alternate main/shade fills by column parity in `fill_multiple`.
    pub shade: bool,
}

impl SpecFillOptions {
    /// Convenience for the common solid fill.
    pub fn solid(color: &str) -> Self {
        Self {
            fill_type: Some("solid".to_string()),
            main_color: Some(color.to_string()),
            ..Self::default()
        }
    }

    /// Read recognized keys. `type` may be a string or null.
    ///
    /// Non-string colours are ignored rather than rejected.
    pub fn from_attributes(attributes: &Map<String, Value>) -> Result<Self, ExcelError> {
        let fill_type = match attributes.get("type") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(ExcelError::style_value("type", "a string or None")),
        };
        let main_color = attributes
            .get("main_color")
            .and_then(Value::as_str)
            .map(str::to_string);
        let second_color = attributes
            .get("second_color")
            .and_then(Value::as_str)
            .map(str::to_string);
        let shade = read_bool(attributes, "shade")?.unwrap_or(false);

        Ok(Self {
            fill_type,
            main_color,
            second_color,
            shade,
        })
    }

    pub fn build(&self) -> Result<StyleFill, ExcelError> {
        let pattern = match &self.fill_type {
            None => FormatPattern::None,
            Some(val) => derive_format_pattern(&normalize_lower_camel(val))?,
        };
        Ok(StyleFill {
            pattern,
            color_main: derive_color("main_color", self.main_color.as_deref())?,
            color_second: derive_color("second_color", self.second_color.as_deref())?,
        })
    }

    /// Build the banding companion: same pattern, main and second colours swapped.
    pub fn build_shade(&self) -> Result<StyleFill, ExcelError> {
        let fill = self.build()?;
        Ok(StyleFill {
            color_main: fill.color_second,
            color_second: fill.color_main,
            ..fill
        })
    }
}

/// Built fill family.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleFill {
    pub pattern: FormatPattern,
    pub color_main: Option<Color>,
    pub color_second: Option<Color>,
}

fn derive_format_pattern(name: &str) -> Result<FormatPattern, ExcelError> {
    let pattern = match name {
        "none" => FormatPattern::None,
        "solid" => FormatPattern::Solid,
        "mediumGray" => FormatPattern::MediumGray,
        "darkGray" => FormatPattern::DarkGray,
        "lightGray" => FormatPattern::LightGray,
        "darkHorizontal" => FormatPattern::DarkHorizontal,
        "darkVertical" => FormatPattern::DarkVertical,
        "darkDown" => FormatPattern::DarkDown,
        "darkUp" => FormatPattern::DarkUp,
        "darkGrid" => FormatPattern::DarkGrid,
        "darkTrellis" => FormatPattern::DarkTrellis,
        "lightHorizontal" => FormatPattern::LightHorizontal,
        "lightVertical" => FormatPattern::LightVertical,
        "lightDown" => FormatPattern::LightDown,
        "lightUp" => FormatPattern::LightUp,
        "lightGrid" => FormatPattern::LightGrid,
        "lightTrellis" => FormatPattern::LightTrellis,
        "gray125" => FormatPattern::Gray125,
        "gray0625" => FormatPattern::Gray0625,
        _ => return Err(ExcelError::style_value("type", "a known pattern fill type")),
    };
    Ok(pattern)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Border

/// Which edges of a cell receive a built border side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumBorderSide {
    All,
    Top,
    Left,
    Right,
    Bottom,
}

impl FromStr for EnumBorderSide {
    type Err = ExcelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "top" => Ok(Self::Top),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "bottom" => Ok(Self::Bottom),
            _ => Err(ExcelError::InvalidSide(value.to_string())),
        }
    }
}

/// Border side options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecBorderOptions {
    /// `thin`, `medium`, `thick`, `dashed`, ... or `none`.
    pub style: Option<String>,
    pub color: Option<String>,
}

impl SpecBorderOptions {
    pub fn with_style(style: &str) -> Self {
        Self {
            style: Some(style.to_string()),
            color: None,
        }
    }

    pub fn from_attributes(attributes: &Map<String, Value>) -> Result<Self, ExcelError> {
        Ok(Self {
            style: read_str(attributes, "style", "a string")?,
            color: read_str(attributes, "color", "a string")?,
        })
    }

    /// Build one border side. A missing style or `none` yields an invisible side.
    pub fn build(&self) -> Result<StyleBorderSide, ExcelError> {
        let style = match &self.style {
            None => FormatBorder::None,
            Some(val) if val.eq_ignore_ascii_case("none") => FormatBorder::None,
            Some(val) => derive_format_border(&normalize_lower_camel(val))?,
        };
        Ok(StyleBorderSide {
            style,
            color: derive_color("color", self.color.as_deref())?,
        })
    }
}

/// One built border edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleBorderSide {
    pub style: FormatBorder,
    pub color: Option<Color>,
}

impl StyleBorderSide {
    pub fn new(style: FormatBorder) -> Self {
        Self { style, color: None }
    }
}

/// Built border family; absent edges are not drawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleBorder {
    pub top: Option<StyleBorderSide>,
    pub bottom: Option<StyleBorderSide>,
    pub left: Option<StyleBorderSide>,
    pub right: Option<StyleBorderSide>,
}

impl StyleBorder {
    /// Place `side_style` on the edges named by `side`.
    pub fn from_side(side: EnumBorderSide, side_style: StyleBorderSide) -> Self {
        let mut border = Self::default();
        match side {
            EnumBorderSide::All => {
                border.top = Some(side_style);
                border.bottom = Some(side_style);
                border.left = Some(side_style);
                border.right = Some(side_style);
            }
            EnumBorderSide::Top => border.top = Some(side_style),
            EnumBorderSide::Left => border.left = Some(side_style),
            EnumBorderSide::Right => border.right = Some(side_style),
            EnumBorderSide::Bottom => border.bottom = Some(side_style),
        }
        border
    }
}

fn derive_format_border(name: &str) -> Result<FormatBorder, ExcelError> {
    let border = match name {
        "thin" => FormatBorder::Thin,
        "medium" => FormatBorder::Medium,
        "dashed" => FormatBorder::Dashed,
        "dotted" => FormatBorder::Dotted,
        "thick" => FormatBorder::Thick,
        "double" => FormatBorder::Double,
        "hair" => FormatBorder::Hair,
        "mediumDashed" => FormatBorder::MediumDashed,
        "dashDot" => FormatBorder::DashDot,
        "mediumDashDot" => FormatBorder::MediumDashDot,
        "dashDotDot" => FormatBorder::DashDotDot,
        "mediumDashDotDot" => FormatBorder::MediumDashDotDot,
        "slantDashDot" => FormatBorder::SlantDashDot,
        _ => return Err(ExcelError::style_value("style", "a known border style")),
    };
    Ok(border)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Alignment

/// Alignment options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecAlignmentOptions {
    /// `general`, `left`, `center`, `right`, `fill`, `justify`, `centerContinuous`, `distributed`.
    pub horizontal: Option<String>,
    /// `top`, `center`, `bottom`, `justify`, `distributed`.
    pub vertical: Option<String>,
    pub rotation: Option<i64>,
    pub indent: Option<i64>,
    pub wrap: Option<bool>,
    pub shrink: Option<bool>,
}

impl SpecAlignmentOptions {
    /// Horizontal and vertical centring, the most common report layout.
    pub fn centered() -> Self {
        Self {
            horizontal: Some("center".to_string()),
            vertical: Some("center".to_string()),
            ..Self::default()
        }
    }

    pub fn from_attributes(attributes: &Map<String, Value>) -> Result<Self, ExcelError> {
        Ok(Self {
            horizontal: read_str(attributes, "horizontal", "a string")?,
            vertical: read_str(attributes, "vertical", "a string")?,
            rotation: read_int(attributes, "rotation")?,
            indent: read_int(attributes, "indent")?,
            wrap: read_bool(attributes, "wrap")?,
            shrink: read_bool(attributes, "shrink")?,
        })
    }

    pub fn build(&self) -> Result<StyleAlignment, ExcelError> {
        let horizontal = match &self.horizontal {
            None => None,
            Some(val) => Some(derive_format_align_horizontal(&normalize_lower_camel(val))?),
        };
        let vertical = match &self.vertical {
            None => None,
            Some(val) => Some(derive_format_align_vertical(&normalize_lower_camel(val))?),
        };
        let rotation = match self.rotation {
            None => None,
            Some(val) if (-90..=90).contains(&val) || val == 270 => Some(val as i16),
            Some(_) => {
                return Err(ExcelError::style_value(
                    "rotation",
                    "an angle in -90..=90 or 270",
                ));
            }
        };
        let indent = match self.indent {
            None => None,
            Some(val) => Some(
                u8::try_from(val)
                    .map_err(|_| ExcelError::style_value("indent", "an integer in 0..=255"))?,
            ),
        };

        Ok(StyleAlignment {
            horizontal,
            vertical,
            rotation,
            indent,
            wrap: self.wrap.unwrap_or(false),
            shrink: self.shrink.unwrap_or(false),
        })
    }
}

/// Built alignment family.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleAlignment {
    pub horizontal: Option<FormatAlign>,
    pub vertical: Option<FormatAlign>,
    pub rotation: Option<i16>,
    pub indent: Option<u8>,
    pub wrap: bool,
    pub shrink: bool,
}

fn derive_format_align_horizontal(name: &str) -> Result<FormatAlign, ExcelError> {
    let align = match name {
        "general" => FormatAlign::General,
        "left" => FormatAlign::Left,
        "center" => FormatAlign::Center,
        "right" => FormatAlign::Right,
        "fill" => FormatAlign::Fill,
        "justify" => FormatAlign::Justify,
        "centerContinuous" => FormatAlign::CenterAcross,
        "distributed" => FormatAlign::Distributed,
        _ => {
            return Err(ExcelError::style_value(
                "horizontal",
                "a known horizontal alignment",
            ));
        }
    };
    Ok(align)
}

fn derive_format_align_vertical(name: &str) -> Result<FormatAlign, ExcelError> {
    let align = match name {
        "top" => FormatAlign::Top,
        "center" => FormatAlign::VerticalCenter,
        "bottom" => FormatAlign::Bottom,
        "justify" => FormatAlign::VerticalJustify,
        "distributed" => FormatAlign::VerticalDistributed,
        _ => {
            return Err(ExcelError::style_value(
                "vertical",
                "a known vertical alignment",
            ));
        }
    };
    Ok(align)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
