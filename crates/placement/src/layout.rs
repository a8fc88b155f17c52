use crate::error::LayoutError;
use crate::font::{Alignment, FontFamily};
use crate::position::Position;
use crate::{MAX_FONT_SIZE, MAX_LINE_SPACING, MIN_FONT_SIZE, MIN_LINE_SPACING};
use inscribe_types::Color;
use serde::{Deserialize, Serialize};

/// A font color as it appears in a serialized layout: either a hex string or
/// an `{r, g, b}` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Hex(String),
    Rgb { r: u8, g: u8, b: u8 },
}

impl ColorValue {
    fn resolve(&self) -> Result<Color, String> {
        match self {
            ColorValue::Hex(s) => Color::parse_hex(s),
            ColorValue::Rgb { r, g, b } => Ok(Color::rgb(*r, *g, *b)),
        }
    }
}

impl From<Color> for ColorValue {
    fn from(color: Color) -> Self {
        ColorValue::Hex(color.to_hex())
    }
}

/// The unvalidated, serialized form of a layout, field for field what the
/// editor writes out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLayoutRecord {
    pub page_number: i64,
    pub position: Position,
    pub font_size: f32,
    pub font_family: String,
    pub font_color: ColorValue,
    pub alignment: String,
    pub line_spacing: f32,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

/// A validated placement for one template page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PageLayoutRecord", into = "PageLayoutRecord")]
pub struct PageLayout {
    pub page_number: u32,
    pub position: Position,
    pub font_size: f32,
    pub font_family: FontFamily,
    pub font_color: Color,
    pub alignment: Alignment,
    pub line_spacing: f32,
    /// Blocks interactive repositioning only. Batch rendering ignores it.
    pub locked: bool,
    /// A disabled page is copied through without a name.
    pub enabled: bool,
}

impl PageLayout {
    /// The layout a freshly uploaded template page starts with.
    pub fn default_for_page(page_number: u32) -> Self {
        Self {
            page_number,
            position: Position::CENTER,
            font_size: 24.0,
            font_family: FontFamily::NotoSansGujarati,
            font_color: Color::BLACK,
            alignment: Alignment::Center,
            line_spacing: 1.2,
            locked: false,
            enabled: true,
        }
    }

    /// Re-checks the ranges of a layout whose fields were set directly.
    pub fn validate(&self) -> Result<(), LayoutError> {
        validate(PageLayoutRecord::from(self.clone())).map(|_| ())
    }
}

impl From<PageLayout> for PageLayoutRecord {
    fn from(layout: PageLayout) -> Self {
        Self {
            page_number: i64::from(layout.page_number),
            position: layout.position,
            font_size: layout.font_size,
            font_family: layout.font_family.display_name().to_string(),
            font_color: layout.font_color.into(),
            alignment: layout.alignment.as_str().to_string(),
            line_spacing: layout.line_spacing,
            locked: layout.locked,
            enabled: layout.enabled,
        }
    }
}

impl TryFrom<PageLayoutRecord> for PageLayout {
    type Error = LayoutError;

    fn try_from(record: PageLayoutRecord) -> Result<Self, Self::Error> {
        validate(record)
    }
}

/// Turns a serialized record into a [`PageLayout`], rejecting out-of-range
/// numbers and names outside the supported sets.
pub fn validate(record: PageLayoutRecord) -> Result<PageLayout, LayoutError> {
    let page = record.page_number;
    let page_number = u32::try_from(page)
        .ok()
        .filter(|n| *n >= 1)
        .ok_or(LayoutError::InvalidPageNumber { page })?;

    if !record.position.is_in_range() {
        return Err(LayoutError::PositionOutOfRange {
            page,
            x: record.position.x,
            y: record.position.y,
        });
    }
    if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&record.font_size) {
        return Err(LayoutError::FontSizeOutOfRange {
            page,
            size: record.font_size,
        });
    }
    if !(MIN_LINE_SPACING..=MAX_LINE_SPACING).contains(&record.line_spacing) {
        return Err(LayoutError::LineSpacingOutOfRange {
            page,
            spacing: record.line_spacing,
        });
    }

    let font_family = record
        .font_family
        .parse::<FontFamily>()
        .map_err(|_| LayoutError::UnknownFontFamily {
            page,
            family: record.font_family.clone(),
        })?;
    let alignment = record
        .alignment
        .parse::<Alignment>()
        .map_err(|_| LayoutError::UnknownAlignment {
            page,
            alignment: record.alignment.clone(),
        })?;
    let font_color = record
        .font_color
        .resolve()
        .map_err(|reason| LayoutError::InvalidColor { page, reason })?;

    Ok(PageLayout {
        page_number,
        position: record.position,
        font_size: record.font_size,
        font_family,
        font_color,
        alignment,
        line_spacing: record.line_spacing,
        locked: record.locked,
        enabled: record.enabled,
    })
}
