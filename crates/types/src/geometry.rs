/// A point in PDF user space (origin bottom-left, y grows upward).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }
}

/// A page rectangle in user space, as read from its `MediaBox` or `CropBox`.
///
/// Stored as the two corners `(x0, y0)` (lower-left) and `(x1, y1)`
/// (upper-right) in points. Boxes with swapped corners are normalized on
/// construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl PageBox {
    /// US Letter, the fallback when a page carries no usable `MediaBox`.
    pub const LETTER: PageBox = PageBox {
        x0: 0.0,
        y0: 0.0,
        x1: 612.0,
        y1: 792.0,
    };

    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Converts percentage coordinates measured from the top-left corner (the
    /// editor's convention) into an absolute point in PDF user space.
    pub fn point_at_percent(&self, x_percent: f32, y_percent: f32) -> Point {
        Point {
            x: self.x0 + self.width() * x_percent / 100.0,
            y: self.y1 - self.height() * y_percent / 100.0,
        }
    }
}

impl Default for PageBox {
    fn default() -> Self {
        Self::LETTER
    }
}

/// Clockwise rotation a viewer applies when displaying a page (`/Rotate`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    None,
    Quarter,
    Half,
    ThreeQuarters,
}

impl Rotation {
    /// Values that are not a multiple of 90 degrees yield `None`.
    pub fn from_degrees(degrees: i64) -> Self {
        match degrees.rem_euclid(360) {
            90 => Rotation::Quarter,
            180 => Rotation::Half,
            270 => Rotation::ThreeQuarters,
            _ => Rotation::None,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Quarter => 90,
            Rotation::Half => 180,
            Rotation::ThreeQuarters => 270,
        }
    }

    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Quarter | Rotation::ThreeQuarters)
    }
}

/// A page the way a viewer shows it: the visible box, turned by the page's
/// rotation.
///
/// Display space has its origin at the lower-left corner of the page as
/// displayed, with y growing upward, so layout code can work in it exactly
/// as it would on an unrotated page.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PageView {
    pub visible: PageBox,
    pub rotation: Rotation,
}

impl PageView {
    pub fn new(visible: PageBox, rotation: Rotation) -> Self {
        Self { visible, rotation }
    }

    /// Width and height as displayed.
    pub fn display_size(&self) -> Size {
        let size = self.visible.size();
        if self.rotation.swaps_axes() {
            Size::new(size.height, size.width)
        } else {
            size
        }
    }

    /// The box layout happens in, plus the `cm` matrix taking it to user
    /// space. Unrotated pages lay out directly in user space.
    pub fn layout_frame(&self) -> (PageBox, Option<[f32; 6]>) {
        match self.rotation {
            Rotation::None => (self.visible, None),
            _ => {
                let size = self.display_size();
                (
                    PageBox::new(0.0, 0.0, size.width, size.height),
                    Some(self.display_to_user()),
                )
            }
        }
    }

    /// `[a b c d e f]` mapping display space onto user space.
    pub fn display_to_user(&self) -> [f32; 6] {
        let PageBox { x0, y0, x1, y1 } = self.visible;
        match self.rotation {
            Rotation::None => [1.0, 0.0, 0.0, 1.0, x0, y0],
            Rotation::Quarter => [0.0, 1.0, -1.0, 0.0, x1, y0],
            Rotation::Half => [-1.0, 0.0, 0.0, -1.0, x1, y1],
            Rotation::ThreeQuarters => [0.0, -1.0, 1.0, 0.0, x0, y1],
        }
    }

    /// Converts editor percentages into a user-space point.
    pub fn user_point_at_percent(&self, x_percent: f32, y_percent: f32) -> Point {
        let size = self.display_size();
        let display = PageBox::new(0.0, 0.0, size.width, size.height)
            .point_at_percent(x_percent, y_percent);
        let [a, b, c, d, e, f] = self.display_to_user();
        Point::new(
            a * display.x + c * display.y + e,
            b * display.x + d * display.y + f,
        )
    }
}
