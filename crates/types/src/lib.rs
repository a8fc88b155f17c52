//! Value types shared by every inscribe crate.

pub mod color;
pub mod geometry;

pub use color::Color;
pub use geometry::{PageBox, PageView, Point, Rotation, Size};
