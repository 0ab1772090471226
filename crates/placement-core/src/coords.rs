//! Coordinate transformation between surface pixels and page-fractional space
//!
//! Fields are stored as percentages of the rendered page box so their
//! position is independent of the width the page happens to be drawn at.

use crate::error::PlacementError;
use serde::{Deserialize, Serialize};

pub const MIN_PERCENT: f64 = 0.0;
pub const MAX_PERCENT: f64 = 100.0;

/// A point or offset in surface pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pixel-space bounding box of a rendered page as currently displayed
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// False until the surface has a positive, finite size
    pub fn is_laid_out(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    fn require_layout(&self) -> Result<(), PlacementError> {
        if self.is_laid_out() {
            Ok(())
        } else {
            Err(PlacementError::LayoutNotReady)
        }
    }
}

/// Anchor a newly dropped field exactly at the drop point.
///
/// `pointer` is the absolute pointer offset at drop, in the same pixel space
/// as `surface.left`/`surface.top`.
pub fn place_new(pointer: Point, surface: &SurfaceBox) -> Result<(f64, f64), PlacementError> {
    surface.require_layout()?;

    let left = (pointer.x - surface.left) / surface.width * 100.0;
    let top = (pointer.y - surface.top) / surface.height * 100.0;

    Ok((clamp_percent(left), clamp_percent(top)))
}

/// Move an existing field by the distance the pointer travelled.
///
/// Uses the drag delta rather than the drop point, so grabbing a field away
/// from its anchor does not make it jump.
pub fn move_existing(
    current_left: f64,
    current_top: f64,
    delta: Point,
    surface: &SurfaceBox,
) -> Result<(f64, f64), PlacementError> {
    surface.require_layout()?;

    let left = current_left + delta.x / surface.width * 100.0;
    let top = current_top + delta.y / surface.height * 100.0;

    Ok((clamp_percent(left), clamp_percent(top)))
}

/// Convert fractional coordinates back to pixels, relative to the surface's
/// top-left corner
pub fn to_pixels(left: f64, top: f64, surface: &SurfaceBox) -> (f64, f64) {
    (left / 100.0 * surface.width, top / 100.0 * surface.height)
}

/// Convert fractional coordinates (top-left origin) to PDF user space
/// (bottom-left origin, points)
pub fn to_pdf_points(left: f64, top: f64, media_box: [f64; 4]) -> (f64, f64) {
    let [mb_x, mb_y, mb_width, mb_height] = media_box;

    let pdf_x = mb_x + (left / 100.0 * mb_width);
    let pdf_y = mb_y + (mb_height - (top / 100.0 * mb_height));

    (pdf_x, pdf_y)
}

// NaN pins to the origin
pub(crate) fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        MIN_PERCENT
    } else {
        value.clamp(MIN_PERCENT, MAX_PERCENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_new_anchor() {
        let surface = SurfaceBox::new(0.0, 0.0, 200.0, 400.0);
        let (left, top) = place_new(Point::new(50.0, 20.0), &surface).unwrap();
        assert_eq!(left, 25.0);
        assert_eq!(top, 5.0);
    }

    #[test]
    fn test_place_new_respects_surface_offset() {
        let surface = SurfaceBox::new(100.0, 50.0, 400.0, 500.0);
        let (left, top) = place_new(Point::new(300.0, 300.0), &surface).unwrap();
        assert_eq!(left, 50.0);
        assert_eq!(top, 50.0);
    }

    #[test]
    fn test_place_new_clamps_outside_drop() {
        let surface = SurfaceBox::new(10.0, 10.0, 100.0, 100.0);
        let (left, top) = place_new(Point::new(-40.0, 500.0), &surface).unwrap();
        assert_eq!(left, 0.0);
        assert_eq!(top, 100.0);
    }

    #[test]
    fn test_move_existing_uses_delta() {
        let surface = SurfaceBox::new(37.0, 91.0, 200.0, 400.0);
        let (left, top) = move_existing(25.0, 5.0, Point::new(20.0, -8.0), &surface).unwrap();
        assert!((left - 35.0).abs() < 1e-9);
        assert!((top - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_sized_surface_refused() {
        let flat = SurfaceBox::new(0.0, 0.0, 200.0, 0.0);
        let thin = SurfaceBox::new(0.0, 0.0, 0.0, 300.0);

        assert_eq!(
            place_new(Point::new(1.0, 1.0), &flat),
            Err(PlacementError::LayoutNotReady)
        );
        assert_eq!(
            move_existing(10.0, 10.0, Point::new(1.0, 1.0), &thin),
            Err(PlacementError::LayoutNotReady)
        );
    }

    #[test]
    fn test_to_pixels_inverse_of_place_new() {
        let surface = SurfaceBox::new(0.0, 0.0, 640.0, 828.0);
        let (left, top) = place_new(Point::new(160.0, 207.0), &surface).unwrap();
        assert_eq!(to_pixels(left, top, &surface), (160.0, 207.0));
    }

    #[test]
    fn test_to_pdf_points_flips_y() {
        let media_box = [0.0, 0.0, 612.0, 792.0];
        assert_eq!(to_pdf_points(0.0, 0.0, media_box), (0.0, 792.0));
        assert_eq!(to_pdf_points(100.0, 100.0, media_box), (612.0, 0.0));
        let (x, y) = to_pdf_points(50.0, 25.0, media_box);
        assert!((x - 306.0).abs() < 0.1);
        assert!((y - 594.0).abs() < 0.1);
    }
}
