//! Pure helpers shared by every drawable container: visibility tests,
//! rotated bounds and zoom derivation.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::window::VisibleWindow;

/// Per-axis scale applied to child positions and sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zoom {
    pub x: f64,
    pub y: f64,
}

impl Zoom {
    pub const IDENTITY: Zoom = Zoom { x: 1.0, y: 1.0 };

    pub fn is_identity(&self) -> bool {
        self.x == 1.0 && self.y == 1.0
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Half-open overlap test. Rectangles touching only along an edge or at a
/// corner do not intersect, and empty rectangles intersect nothing.
pub fn rect_intersects(a: &Rect, b: &Rect) -> bool {
    a.intersects(b)
}

/// Axis-aligned bounds of `rect` rotated by `angle` degrees about the point
/// at fractions `anchor` of its size. Positive angles turn x toward y.
///
/// Unrotated, empty or non-finite input returns `rect` unchanged.
pub fn rotated_bounds(rect: &Rect, angle: f64, anchor: (f64, f64)) -> Rect {
    if angle == 0.0 || !angle.is_finite() || rect.is_empty() {
        return *rect;
    }
    let (sin, cos) = angle.to_radians().sin_cos();
    let ax = rect.x + anchor.0 * rect.w;
    let ay = rect.y + anchor.1 * rect.h;

    let corners = [
        (rect.x, rect.y),
        (rect.right(), rect.y),
        (rect.x, rect.bottom()),
        (rect.right(), rect.bottom()),
    ];
    let (mut left, mut top) = (f64::INFINITY, f64::INFINITY);
    let (mut right, mut bottom) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for (px, py) in corners {
        let (dx, dy) = (px - ax, py - ay);
        let x = ax + cos * dx - sin * dy;
        let y = ay + sin * dx + cos * dy;
        left = left.min(x);
        top = top.min(y);
        right = right.max(x);
        bottom = bottom.max(y);
    }
    Rect::new(left, top, right - left, bottom - top)
}

/// Ratio of a window's declared size to its native content size.
///
/// Returns [`Zoom::IDENTITY`] when either native dimension is zero,
/// negative or not finite.
pub fn zoom_factor(window: &VisibleWindow) -> Zoom {
    let native = window.source;
    let usable = |v: f64| v.is_finite() && v > 0.0;
    if !usable(native.w) || !usable(native.h) {
        return Zoom::IDENTITY;
    }
    Zoom {
        x: window.w / native.w,
        y: window.h / native.h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersection_is_symmetric() {
        let rects = [
            Rect::new(0.0, 0.0, 16.0, 16.0),
            Rect::new(16.0, 0.0, 16.0, 16.0),
            Rect::new(8.0, 8.0, 1.0, 1.0),
            Rect::new(-4.0, -4.0, 5.0, 5.0),
            Rect::new(0.0, 0.0, 0.0, 0.0),
            Rect::new(15.5, 15.5, 10.0, 10.0),
        ];
        for a in &rects {
            for b in &rects {
                assert_eq!(rect_intersects(a, b), rect_intersects(b, a), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn test_rotated_bounds() {
        let r = Rect::new(28.0, 10.0, 16.0, 16.0);
        assert_eq!(rotated_bounds(&r, 0.0, (0.5, 0.5)), r);

        let b = rotated_bounds(&r, 45.0, (0.5, 0.5));
        let half = 8.0 * std::f64::consts::SQRT_2;
        assert!((b.x - (36.0 - half)).abs() < 1e-9);
        assert!((b.y - (18.0 - half)).abs() < 1e-9);
        assert!((b.w - 2.0 * half).abs() < 1e-9);
        assert!(rect_intersects(&b, &Rect::new(10.0, 10.0, 16.0, 16.0)));
        assert!(!rect_intersects(&r, &Rect::new(10.0, 10.0, 16.0, 16.0)));

        // A quarter turn about the top-left corner swings the rect to the left.
        let q = rotated_bounds(&Rect::new(0.0, 0.0, 10.0, 4.0), 90.0, (0.0, 0.0));
        assert!((q.x + 4.0).abs() < 1e-9 && q.y.abs() < 1e-9);
        assert!((q.w - 4.0).abs() < 1e-9 && (q.h - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_factor() {
        let w = VisibleWindow::new(0.0, 0.0, 1280.0, 384.0, Rect::new(0.0, 0.0, 640.0, 384.0));
        assert_eq!(zoom_factor(&w), Zoom { x: 2.0, y: 1.0 });
    }

    #[test]
    fn test_zoom_identity_when_declared_equals_native() {
        let w = VisibleWindow::identity(64.0, 64.0);
        assert!(zoom_factor(&w).is_identity());
    }

    #[test]
    fn test_zoom_degenerate_native_size() {
        let zero_w = VisibleWindow::new(0.0, 0.0, 64.0, 64.0, Rect::new(0.0, 0.0, 0.0, 64.0));
        let zero_h = VisibleWindow::new(0.0, 0.0, 64.0, 64.0, Rect::new(0.0, 0.0, 64.0, 0.0));
        let negative = VisibleWindow::new(0.0, 0.0, 64.0, 64.0, Rect::new(0.0, 0.0, -2.0, 64.0));
        assert_eq!(zoom_factor(&zero_w), Zoom::IDENTITY);
        assert_eq!(zoom_factor(&zero_h), Zoom::IDENTITY);
        assert_eq!(zoom_factor(&negative), Zoom::IDENTITY);
    }
}
