use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};
use crate::transform::{zoom_factor, Zoom};

/// The visible window of a container, mapping a sub-rectangle of logical
/// space onto a screen footprint.
///
/// - `x, y`: linear offset of the footprint on screen.
/// - `w, h`: declared footprint size.
/// - `source`: the visible sub-window of logical space. Its `w, h` are the
///   native content size, compared against `w, h` to derive zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibleWindow {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub source: Rect,
}

impl VisibleWindow {
    pub fn new(x: f64, y: f64, w: f64, h: f64, source: Rect) -> Self {
        Self { x, y, w, h, source }
    }

    /// A window at the origin showing `w × h` of logical space at zoom 1.
    pub fn identity(w: f64, h: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w,
            h,
            source: Rect::new(0.0, 0.0, w, h),
        }
    }

    pub fn zoom(&self) -> Zoom {
        zoom_factor(self)
    }

    /// Screen footprint covered by the window.
    pub fn footprint(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// Move the visible window by a delta in logical units.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.source.x += dx;
        self.source.y += dy;
    }

    /// Place the visible window's origin at a logical position.
    pub fn pan_to(&mut self, x: f64, y: f64) {
        self.source.x = x;
        self.source.y = y;
    }

    /// Zoom by `factor` keeping the logical point under `screen` fixed.
    ///
    /// The declared footprint never changes; zooming shrinks or grows the
    /// visible sub-window instead.
    pub fn zoom_at(&mut self, screen: Point, factor: f64) {
        if !(factor.is_finite() && factor > 0.0) || self.source.is_empty() {
            return;
        }
        let before = self.screen_to_logical(screen);
        self.source.w /= factor;
        self.source.h /= factor;
        let after = self.screen_to_logical(screen);
        self.source.x -= after.x - before.x;
        self.source.y -= after.y - before.y;
    }

    pub fn logical_to_screen(&self, p: Point) -> Point {
        let zoom = self.zoom();
        Point::new(
            (p.x - self.source.x) * zoom.x + self.x,
            (p.y - self.source.y) * zoom.y + self.y,
        )
    }

    pub fn screen_to_logical(&self, p: Point) -> Point {
        let zoom = self.zoom();
        Point::new(
            (p.x - self.x) / zoom.x + self.source.x,
            (p.y - self.y) / zoom.y + self.source.y,
        )
    }

    /// Map a logical rectangle to its screen rectangle.
    pub fn logical_rect_to_screen(&self, r: &Rect) -> Rect {
        let zoom = self.zoom();
        let origin = self.logical_to_screen(r.origin());
        Rect::new(origin.x, origin.y, r.w * zoom.x, r.h * zoom.y)
    }
}
