use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::geometry::Rect;
use crate::transform::rotated_bounds;

/// Texture path used when a sprite has none: a solid, tintable pixel.
pub const DEFAULT_SPRITE_PATH: &str = "pixel";

/// A positioned, scaled, rotated, tinted rectangle referencing a texture region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub name: String,
    pub x: f64,
    pub y: f64,
    w: f64,
    h: f64,
    pub path: Option<String>,
    /// Rotation in degrees about the anchor.
    pub angle: f64,
    anchor_x: f64,
    anchor_y: f64,
    pub color: Rgba,
    pub flip_horizontally: bool,
    pub flip_vertically: bool,
    /// Sub-region of the texture to sample. `None` samples the whole texture.
    pub source: Option<Rect>,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            name: String::new(),
            x: 0.0,
            y: 0.0,
            w: 0.0,
            h: 0.0,
            path: None,
            angle: 0.0,
            anchor_x: 0.5,
            anchor_y: 0.5,
            color: Rgba::WHITE,
            flip_horizontally: false,
            flip_vertically: false,
            source: None,
        }
    }
}

impl Sprite {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_rect(mut self, x: f64, y: f64, w: f64, h: f64) -> Self {
        self.x = x;
        self.y = y;
        self.set_size(w, h);
        self
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    pub fn with_angle(mut self, angle: f64, anchor_x: f64, anchor_y: f64) -> Self {
        self.angle = angle;
        self.set_anchor(anchor_x, anchor_y);
        self
    }

    pub fn with_source(mut self, source: Rect) -> Self {
        self.source = Some(source.normalized());
        self
    }

    pub fn with_flip(mut self, horizontally: bool, vertically: bool) -> Self {
        self.flip_horizontally = horizontally;
        self.flip_vertically = vertically;
        self
    }

    pub fn w(&self) -> f64 {
        self.w
    }

    pub fn h(&self) -> f64 {
        self.h
    }

    /// Negative sizes are clamped to zero.
    pub fn set_size(&mut self, w: f64, h: f64) {
        self.w = w.max(0.0);
        self.h = h.max(0.0);
    }

    pub fn anchor(&self) -> (f64, f64) {
        (self.anchor_x, self.anchor_y)
    }

    /// Anchors are fractions of the sprite size, clamped to `[0, 1]`.
    pub fn set_anchor(&mut self, x: f64, y: f64) {
        self.anchor_x = x.clamp(0.0, 1.0);
        self.anchor_y = y.clamp(0.0, 1.0);
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    /// Bounding rectangle. Sizes read from untrusted input are reported as
    /// zero when negative.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h).normalized()
    }

    /// Area the sprite covers once rotated about its anchor. Mark this
    /// rather than [`rect`](Self::rect) dirty when a rotated sprite changes.
    pub fn bounds(&self) -> Rect {
        rotated_bounds(&self.rect(), self.angle, self.anchor())
    }

    pub fn path_or_default(&self) -> &str {
        self.path.as_deref().unwrap_or(DEFAULT_SPRITE_PATH)
    }
}
