//! CPU rasterization of draw commands into `tiny_skia` pixmaps.
//!
//! Sprites with the default path are solid rectangles in their tint color.
//! Other paths are looked up in a [`TextureCache`]; the selected source
//! region is tinted by the sprite color and stretched over the sprite.
//! Labels are not rasterized here: glyph rendering belongs to whoever owns
//! font resolution.

use std::collections::HashMap;

use tiny_skia::{
    Color, ColorU8, FillRule, FilterQuality, IntRect, Mask, Paint, PathBuilder, Pattern, Pixmap,
    PremultipliedColorU8, SpreadMode, Transform,
};

use tilestack_core::sprite::DEFAULT_SPRITE_PATH;
use tilestack_core::{DrawSink, LabelCommand, Rect, Rgba, SpriteCommand};

/// Read-only textures addressed by path.
#[derive(Debug, Default)]
pub struct TextureCache {
    textures: HashMap<String, Pixmap>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
        }
    }

    pub fn insert(&mut self, path: &str, texture: Pixmap) -> Option<Pixmap> {
        self.textures.insert(path.to_string(), texture)
    }

    pub fn remove(&mut self, path: &str) -> Option<Pixmap> {
        self.textures.remove(path)
    }

    pub fn get(&self, path: &str) -> Option<&Pixmap> {
        self.textures.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.textures.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// Counters for one rasterization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterStats {
    pub sprites_drawn: usize,
    pub sprites_skipped: usize,
    pub labels_skipped: usize,
    pub missing_textures: usize,
}

/// A [`DrawSink`] that paints sprite commands into a pixmap.
pub struct RasterSink<'a> {
    target: &'a mut Pixmap,
    textures: &'a TextureCache,
    clip: Option<&'a Mask>,
    stats: RasterStats,
}

impl<'a> RasterSink<'a> {
    pub fn new(target: &'a mut Pixmap, textures: &'a TextureCache) -> Self {
        Self {
            target,
            textures,
            clip: None,
            stats: RasterStats::default(),
        }
    }

    /// Limit every write to the pixels covered by `clip`.
    pub fn with_clip(mut self, clip: &'a Mask) -> Self {
        self.clip = Some(clip);
        self
    }

    pub fn stats(&self) -> RasterStats {
        self.stats
    }

    fn fill_solid(&mut self, cmd: &SpriteCommand, rect: tiny_skia::Rect, transform: Transform) {
        let mut paint = Paint::default();
        paint.set_color_rgba8(cmd.r, cmd.g, cmd.b, cmd.a);
        paint.anti_alias = false;
        self.target.fill_rect(rect, &paint, transform, self.clip);
    }

    fn fill_textured(
        &mut self,
        cmd: &SpriteCommand,
        texture: &Pixmap,
        rect: tiny_skia::Rect,
        transform: Transform,
    ) -> bool {
        let Some(region) = tinted_region(texture, cmd) else {
            return false;
        };
        let sx = rect.width() / region.width() as f32;
        let sy = rect.height() / region.height() as f32;

        let mut paint = Paint::default();
        paint.anti_alias = false;
        paint.shader = Pattern::new(
            region.as_ref(),
            SpreadMode::Pad,
            FilterQuality::Nearest,
            1.0,
            Transform::from_scale(sx, sy),
        );
        self.target.fill_rect(rect, &paint, transform, self.clip);
        true
    }
}

impl DrawSink for RasterSink<'_> {
    fn draw_sprite(&mut self, cmd: &SpriteCommand) {
        let rect = match tiny_skia::Rect::from_xywh(0.0, 0.0, cmd.w as f32, cmd.h as f32) {
            Some(rect) if cmd.a > 0 => rect,
            _ => {
                self.stats.sprites_skipped += 1;
                return;
            }
        };
        let transform = sprite_transform(cmd);

        if cmd.path != DEFAULT_SPRITE_PATH {
            let textures = self.textures;
            if let Some(texture) = textures.get(&cmd.path) {
                if self.fill_textured(cmd, texture, rect, transform) {
                    self.stats.sprites_drawn += 1;
                    return;
                }
                log::debug!("texture '{}': source region {:?} is empty", cmd.path, cmd.source);
            } else {
                log::debug!("texture '{}' not loaded, drawing a solid fill", cmd.path);
            }
            self.stats.missing_textures += 1;
        }

        self.fill_solid(cmd, rect, transform);
        self.stats.sprites_drawn += 1;
    }

    fn draw_label(&mut self, cmd: &LabelCommand) {
        log::trace!("label '{}' at ({}, {}) not rasterized", cmd.text, cmd.x, cmd.y);
        self.stats.labels_skipped += 1;
    }
}

/// Local-to-target transform for a sprite occupying `(0, 0, w, h)` locally:
/// flip about the center, rotate about the anchor, then translate.
pub fn sprite_transform(cmd: &SpriteCommand) -> Transform {
    let (w, h) = (cmd.w as f32, cmd.h as f32);
    let mut ts = Transform::from_translate(cmd.x as f32, cmd.y as f32);
    if cmd.angle != 0.0 {
        ts = ts.pre_concat(Transform::from_rotate_at(
            cmd.angle as f32,
            cmd.anchor_x as f32 * w,
            cmd.anchor_y as f32 * h,
        ));
    }
    if cmd.flip_horizontally || cmd.flip_vertically {
        let (sx, tx) = if cmd.flip_horizontally { (-1.0, w) } else { (1.0, 0.0) };
        let (sy, ty) = if cmd.flip_vertically { (-1.0, h) } else { (1.0, 0.0) };
        ts = ts.pre_concat(Transform::from_row(sx, 0.0, 0.0, sy, tx, ty));
    }
    ts
}

/// Copy the sampled texture region, multiplied by the command tint.
fn tinted_region(texture: &Pixmap, cmd: &SpriteCommand) -> Option<Pixmap> {
    let full = Rect::new(0.0, 0.0, texture.width() as f64, texture.height() as f64);
    let source = cmd.source.unwrap_or(full);
    let region = pixel_region(&source, texture.width(), texture.height())?;
    let mut copy = texture.clone_rect(region)?;

    if (cmd.r, cmd.g, cmd.b, cmd.a) != (255, 255, 255, 255) {
        let mul = |c: u8, t: u8| ((c as u16 * t as u16 + 127) / 255) as u8;
        for px in copy.pixels_mut() {
            let tinted = PremultipliedColorU8::from_rgba(
                mul(mul(px.red(), cmd.r), cmd.a),
                mul(mul(px.green(), cmd.g), cmd.a),
                mul(mul(px.blue(), cmd.b), cmd.a),
                mul(px.alpha(), cmd.a),
            );
            *px = tinted.unwrap_or(PremultipliedColorU8::TRANSPARENT);
        }
    }
    Some(copy)
}

// ── Pixel regions ─────────────────────────────────────────────────────

/// Round `rect` outward to whole pixels and clamp it to a `width × height`
/// buffer. Returns `None` when nothing of it lies inside the buffer.
pub fn pixel_region(rect: &Rect, width: u32, height: u32) -> Option<IntRect> {
    if rect.is_empty() || !(rect.x.is_finite() && rect.y.is_finite()) {
        return None;
    }
    let left = rect.x.floor().max(0.0);
    let top = rect.y.floor().max(0.0);
    let right = rect.right().ceil().min(width as f64);
    let bottom = rect.bottom().ceil().min(height as f64);
    if right <= left || bottom <= top {
        return None;
    }
    IntRect::from_xywh(
        left as i32,
        top as i32,
        (right - left) as u32,
        (bottom - top) as u32,
    )
}

pub fn int_rect_to_rect(region: &IntRect) -> Rect {
    Rect::new(
        region.x() as f64,
        region.y() as f64,
        region.width() as f64,
        region.height() as f64,
    )
}

/// A `width × height` mask covering exactly the pixels of `region`.
pub fn region_mask(region: &IntRect, width: u32, height: u32) -> Option<Mask> {
    let mut mask = Mask::new(width, height)?;
    let rect = tiny_skia::Rect::from_xywh(
        region.x() as f32,
        region.y() as f32,
        region.width() as f32,
        region.height() as f32,
    )?;
    let path = PathBuilder::from_rect(rect);
    mask.fill_path(&path, FillRule::Winding, false, Transform::identity());
    Some(mask)
}

/// Overwrite every pixel of `region` with `color`.
pub fn clear_region(pixmap: &mut Pixmap, region: &IntRect, color: Rgba) {
    let fill = premultiplied(color);
    let stride = pixmap.width() as usize;
    let (x0, x1) = (region.x() as usize, region.right() as usize);
    let pixels = pixmap.pixels_mut();
    for y in region.y() as usize..region.bottom() as usize {
        let row = y * stride;
        if let Some(span) = pixels.get_mut(row + x0..row + x1) {
            span.fill(fill);
        }
    }
}

pub fn clear_all(pixmap: &mut Pixmap, color: Rgba) {
    pixmap.fill(Color::from_rgba8(color.r, color.g, color.b, color.a));
}

fn premultiplied(color: Rgba) -> PremultipliedColorU8 {
    ColorU8::from_rgba(color.r, color.g, color.b, color.a).premultiply()
}

/// Read one pixel back as straight (non-premultiplied) RGBA.
pub fn pixel_at(pixmap: &Pixmap, x: u32, y: u32) -> Option<Rgba> {
    let c = pixmap.pixel(x, y)?.demultiply();
    Some(Rgba::new(c.red(), c.green(), c.blue(), c.alpha()))
}
