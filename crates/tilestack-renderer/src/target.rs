//! Two-slot off-screen buffer.
//!
//! Exactly one slot is active (presented) at a time. Every render writes the
//! standby slot and flips the active index only once drawing has finished,
//! so readers of [`DoubleBuffer::front`] only ever see a completed render.

use tiny_skia::{IntRect, Pixmap};

use tilestack_core::Rgba;

use crate::error::RenderError;
use crate::raster::{
    clear_all, clear_region, int_rect_to_rect, pixel_region, region_mask, RasterSink, RasterStats,
    TextureCache,
};

#[derive(Debug)]
pub struct DoubleBuffer {
    buffers: [Pixmap; 2],
    active: usize,
    renders: u64,
}

impl DoubleBuffer {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let alloc = || Pixmap::new(width, height).ok_or(RenderError::BufferAllocation { width, height });
        Ok(Self {
            buffers: [alloc()?, alloc()?],
            active: 0,
            renders: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.front().width()
    }

    pub fn height(&self) -> u32 {
        self.front().height()
    }

    /// The presented buffer.
    pub fn front(&self) -> &Pixmap {
        &self.buffers[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Number of renders completed since creation.
    pub fn completed_renders(&self) -> u64 {
        self.renders
    }

    /// Whether the front buffer holds a completed render yet.
    pub fn has_content(&self) -> bool {
        self.renders > 0
    }

    /// Clear the standby buffer, let `draw` paint all of it, then present it.
    pub fn render_full<F>(&mut self, background: Rgba, textures: &TextureCache, draw: F) -> RasterStats
    where
        F: FnOnce(&mut RasterSink<'_>),
    {
        let (_, standby) = self.split();
        clear_all(standby, background);

        let mut sink = RasterSink::new(standby, textures);
        draw(&mut sink);
        let stats = sink.stats();

        self.swap();
        stats
    }

    /// Seed the standby buffer from the front buffer, clear `region`, let
    /// `draw` repaint it with writes clipped to `region`, then present it.
    ///
    /// `region` is clamped to the buffer. Returns `None` without touching
    /// either buffer when nothing of it lies inside.
    pub fn render_region<F>(
        &mut self,
        region: IntRect,
        background: Rgba,
        textures: &TextureCache,
        draw: F,
    ) -> Option<RasterStats>
    where
        F: FnOnce(&mut RasterSink<'_>),
    {
        let (width, height) = (self.width(), self.height());
        let region = pixel_region(&int_rect_to_rect(&region), width, height)?;
        let mask = region_mask(&region, width, height)?;

        let (front, standby) = self.split();
        standby.data_mut().copy_from_slice(front.data());
        clear_region(standby, &region, background);

        let mut sink = RasterSink::new(standby, textures).with_clip(&mask);
        draw(&mut sink);
        let stats = sink.stats();

        self.swap();
        Some(stats)
    }

    /// Split into `(front, standby)`.
    fn split(&mut self) -> (&Pixmap, &mut Pixmap) {
        let [first, second] = &mut self.buffers;
        if self.active == 0 {
            (first, second)
        } else {
            (second, first)
        }
    }

    fn swap(&mut self) {
        self.active ^= 1;
        self.renders += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::pixel_at;
    use tilestack_core::{DrawSink, Sprite, SpriteCommand};

    fn fill(sink: &mut RasterSink<'_>, sprite: &Sprite) {
        sink.draw_sprite(&SpriteCommand::from_sprite(sprite, sprite.rect()));
    }

    #[test]
    fn test_swap_after_each_render() {
        let mut buf = DoubleBuffer::new(8, 8).unwrap();
        let textures = TextureCache::new();
        assert!(!buf.has_content());
        assert_eq!(buf.active_index(), 0);

        buf.render_full(Rgba::TRANSPARENT, &textures, |_| {});
        assert_eq!(buf.active_index(), 1);
        let region = IntRect::from_xywh(0, 0, 2, 2).unwrap();
        buf.render_region(region, Rgba::TRANSPARENT, &textures, |_| {});
        assert_eq!(buf.active_index(), 0);
        assert_eq!(buf.completed_renders(), 2);
    }

    #[test]
    fn test_region_render_keeps_pixels_outside_region() {
        let mut buf = DoubleBuffer::new(16, 16).unwrap();
        let textures = TextureCache::new();
        let red = Sprite::new("red").with_rect(0.0, 0.0, 16.0, 16.0).with_color(Rgba::opaque(255, 0, 0));
        buf.render_full(Rgba::TRANSPARENT, &textures, |sink| fill(sink, &red));

        let blue = Sprite::new("blue").with_rect(0.0, 0.0, 16.0, 16.0).with_color(Rgba::opaque(0, 0, 255));
        let region = IntRect::from_xywh(4, 4, 4, 4).unwrap();
        buf.render_region(region, Rgba::TRANSPARENT, &textures, |sink| fill(sink, &blue));

        assert_eq!(pixel_at(buf.front(), 5, 5), Some(Rgba::opaque(0, 0, 255)));
        assert_eq!(pixel_at(buf.front(), 3, 5), Some(Rgba::opaque(255, 0, 0)));
        assert_eq!(pixel_at(buf.front(), 8, 8), Some(Rgba::opaque(255, 0, 0)));
    }

    #[test]
    fn test_region_is_cleared_before_redraw() {
        let mut buf = DoubleBuffer::new(8, 8).unwrap();
        let textures = TextureCache::new();
        let white = Sprite::new("w").with_rect(0.0, 0.0, 8.0, 8.0);
        buf.render_full(Rgba::TRANSPARENT, &textures, |sink| fill(sink, &white));

        let region = IntRect::from_xywh(0, 0, 4, 8).unwrap();
        buf.render_region(region, Rgba::TRANSPARENT, &textures, |_| {});
        assert_eq!(pixel_at(buf.front(), 1, 1), Some(Rgba::TRANSPARENT));
        assert_eq!(pixel_at(buf.front(), 5, 1), Some(Rgba::WHITE));
    }

    #[test]
    fn test_region_outside_buffer_renders_nothing() {
        let mut buf = DoubleBuffer::new(8, 8).unwrap();
        let textures = TextureCache::new();
        buf.render_full(Rgba::TRANSPARENT, &textures, |_| {});

        let mut drawn = false;
        let region = IntRect::from_xywh(20, 20, 4, 4).unwrap();
        let stats = buf.render_region(region, Rgba::TRANSPARENT, &textures, |_| drawn = true);
        assert!(stats.is_none());
        assert!(!drawn);
        assert_eq!(buf.active_index(), 1);
        assert_eq!(buf.completed_renders(), 1);
    }

    #[test]
    fn test_region_is_clamped_to_buffer() {
        let mut buf = DoubleBuffer::new(8, 8).unwrap();
        let textures = TextureCache::new();
        let white = Sprite::new("w").with_rect(0.0, 0.0, 8.0, 8.0);
        buf.render_full(Rgba::TRANSPARENT, &textures, |sink| fill(sink, &white));

        let region = IntRect::from_xywh(6, -4, 10, 8).unwrap();
        assert!(buf.render_region(region, Rgba::TRANSPARENT, &textures, |_| {}).is_some());
        assert_eq!(pixel_at(buf.front(), 7, 3), Some(Rgba::TRANSPARENT));
        assert_eq!(pixel_at(buf.front(), 7, 4), Some(Rgba::WHITE));
        assert_eq!(pixel_at(buf.front(), 5, 0), Some(Rgba::WHITE));
    }

    #[test]
    fn test_zero_size_buffer_is_an_error() {
        let err = DoubleBuffer::new(0, 10).unwrap_err();
        assert!(matches!(err, RenderError::BufferAllocation { width: 0, height: 10 }));
    }
}
