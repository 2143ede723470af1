use serde::{Deserialize, Serialize};

/// A 2D point in logical (pre-zoom) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// An axis-aligned rectangle covering the half-open extent `[x, x+w) × [y, y+h)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Build a rectangle from two opposite corners, in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            w: (a.x - b.x).abs(),
            h: (a.y - b.y).abs(),
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// A rectangle without positive width and height covers no points.
    pub fn is_empty(&self) -> bool {
        !(self.w > 0.0 && self.h > 0.0)
    }

    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Overlap test on half-open extents; shared edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        Some(Rect::new(
            x,
            y,
            self.right().min(other.right()) - x,
            self.bottom().min(other.bottom()) - y,
        ))
    }

    /// Smallest rectangle covering both. Empty rectangles are ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Copy with negative extents collapsed to zero.
    pub fn normalized(&self) -> Self {
        Self {
            w: self.w.max(0.0),
            h: self.h.max(0.0),
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let c = Rect::new(20.0, 20.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_shared_edge_is_not_overlap() {
        let a = Rect::new(0.0, 0.0, 16.0, 16.0);
        let right = Rect::new(16.0, 0.0, 16.0, 16.0);
        let below = Rect::new(0.0, 16.0, 16.0, 16.0);
        let corner = Rect::new(16.0, 16.0, 4.0, 4.0);
        assert!(!a.intersects(&right));
        assert!(!a.intersects(&below));
        assert!(!a.intersects(&corner));
        // One unit further in is an overlap.
        assert!(a.intersects(&right.translate(-1.0, 0.0)));
    }

    #[test]
    fn test_empty_rect_never_intersects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&Rect::new(5.0, 5.0, 0.0, 3.0)));
        assert!(!a.intersects(&Rect::new(5.0, 5.0, -3.0, 3.0)));
    }

    #[test]
    fn test_union_and_intersection() {
        let a = Rect::new(0.0, 70.0, 16.0, 16.0);
        let b = Rect::new(17.0, 70.0, 16.0, 16.0);
        let u = a.union(&b);
        assert_eq!(u, Rect::new(0.0, 70.0, 33.0, 16.0));
        assert_eq!(a.union(&Rect::default()), a);

        let i = u.intersection(&Rect::new(10.0, 60.0, 10.0, 20.0)).unwrap();
        assert_eq!(i, Rect::new(10.0, 70.0, 10.0, 10.0));
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn test_from_corners() {
        let r = Rect::from_corners(Point::new(10.0, 5.0), Point::new(2.0, 8.0));
        assert_eq!(r, Rect::new(2.0, 5.0, 8.0, 3.0));
        assert!(r.contains_point(&Point::new(2.0, 5.0)));
        assert!(!r.contains_point(&Point::new(10.0, 5.0)));
    }
}
