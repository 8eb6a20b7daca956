//! Utility functions for coordinate mapping and numeric conversions.

pub mod remap;
pub mod safe_cast;

use opencv::core::{Point, Rect};

/// Midpoint of a bounding rectangle, truncated to whole pixels
#[must_use]
pub fn rect_center(rect: Rect) -> Point {
    let br_x = rect.x + rect.width;
    let br_y = rect.y + rect.height;
    Point::new((rect.x + br_x) / 2, (rect.y + br_y) / 2)
}

/// Table radius estimate from its bounding rectangle: mean of the half-sides
#[must_use]
pub fn rect_radius(rect: Rect) -> i32 {
    (rect.width + rect.height) / 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_center() {
        assert_eq!(rect_center(Rect::new(0, 0, 100, 50)), Point::new(50, 25));
        assert_eq!(rect_center(Rect::new(10, 20, 31, 41)), Point::new(25, 40));
    }

    #[test]
    fn test_rect_radius() {
        assert_eq!(rect_radius(Rect::new(0, 0, 100, 100)), 50);
        assert_eq!(rect_radius(Rect::new(0, 0, 101, 100)), 50);
        assert_eq!(rect_radius(Rect::new(0, 0, 3, 0)), 0);
    }
}
