use serde::{Deserialize, Serialize};

/// Anchor of the name block in percent of the page, measured from the
/// top-left corner. The anchor is always the center of the rendered block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const CENTER: Position = Position { x: 50.0, y: 50.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_in_range(&self) -> bool {
        (0.0..=100.0).contains(&self.x) && (0.0..=100.0).contains(&self.y)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::CENTER
    }
}

/// Converts pointer coordinates relative to the preview container into the
/// stored percentage form, clamped to `0..=100` on both axes.
///
/// A NaN coordinate, or a container extent that is zero, negative or not
/// finite, yields 0 on that axis.
pub fn normalize_position(
    x_pixels: f32,
    y_pixels: f32,
    container_width: f32,
    container_height: f32,
) -> Position {
    Position {
        x: to_percent(x_pixels, container_width),
        y: to_percent(y_pixels, container_height),
    }
}

fn to_percent(value: f32, extent: f32) -> f32 {
    if value.is_nan() || !extent.is_finite() || extent <= 0.0 {
        return 0.0;
    }
    (value / extent * 100.0).clamp(0.0, 100.0)
}
