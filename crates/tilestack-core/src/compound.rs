use serde::{Deserialize, Serialize};

use crate::command::{DrawSink, LabelCommand, SpriteCommand};
use crate::geometry::Rect;
use crate::label::Label;
use crate::sprite::Sprite;
use crate::transform::{rect_intersects, rotated_bounds};
use crate::window::VisibleWindow;

/// Counts from one render pass of a [`CompoundSprite`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitStats {
    pub sprites_emitted: usize,
    pub sprites_culled: usize,
    pub labels_emitted: usize,
}

/// A group of sprites and labels positioned and zoomed as one unit.
///
/// The compound itself is never rasterized. Its window decides where the
/// children land on screen:
/// - `window.x/y`: linear offset
/// - `window.w/h` against `window.source.w/h`: zoom
/// - `window.source`: the visible sub-window of the children's space
///
/// Children are culled against the visible window but never cropped: a
/// sprite that is even partially visible is emitted at full extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundSprite {
    pub name: String,
    window: VisibleWindow,
    sprites: Vec<Sprite>,
    labels: Vec<Label>,
}

impl CompoundSprite {
    pub fn new(name: &str, window: VisibleWindow) -> Self {
        Self {
            name: name.to_string(),
            window,
            sprites: Vec::new(),
            labels: Vec::new(),
        }
    }

    // ── Children ─────────────────────────────────────────────────────

    pub fn add_sprite(&mut self, sprite: Sprite) -> usize {
        self.sprites.push(sprite);
        self.sprites.len() - 1
    }

    pub fn add_label(&mut self, label: Label) -> usize {
        self.labels.push(label);
        self.labels.len() - 1
    }

    pub fn remove_sprite(&mut self, index: usize) -> Option<Sprite> {
        if index < self.sprites.len() {
            Some(self.sprites.remove(index))
        } else {
            None
        }
    }

    pub fn remove_label(&mut self, index: usize) -> Option<Label> {
        if index < self.labels.len() {
            Some(self.labels.remove(index))
        } else {
            None
        }
    }

    pub fn set_sprites(&mut self, sprites: Vec<Sprite>) {
        self.sprites = sprites;
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn sprites_mut(&mut self) -> &mut [Sprite] {
        &mut self.sprites
    }

    pub fn sprite_mut(&mut self, index: usize) -> Option<&mut Sprite> {
        self.sprites.get_mut(index)
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn labels_mut(&mut self) -> &mut [Label] {
        &mut self.labels
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    pub fn clear(&mut self) {
        self.sprites.clear();
        self.labels.clear();
    }

    /// Union of all child sprite rectangles, in logical space.
    pub fn bounding_rect(&self) -> Option<Rect> {
        self.sprites
            .iter()
            .map(Sprite::rect)
            .filter(|r| !r.is_empty())
            .reduce(|acc, r| acc.union(&r))
    }

    // ── Window ───────────────────────────────────────────────────────

    pub fn window(&self) -> &VisibleWindow {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut VisibleWindow {
        &mut self.window
    }

    pub fn set_window(&mut self, window: VisibleWindow) {
        self.window = window;
    }

    // ── Rendering ────────────────────────────────────────────────────

    /// Emit draw commands for every visible sprite, then every label.
    ///
    /// Labels are not culled against the visible window.
    pub fn render<S: DrawSink + ?Sized>(&self, sink: &mut S) -> EmitStats {
        let mut stats = self.emit_sprites(None, sink);
        let zoom = self.window.zoom();
        let source = self.window.source;

        for label in &self.labels {
            let x = (label.x - source.x) * zoom.x + self.window.x;
            let y = (label.y - source.y) * zoom.y + self.window.y;
            sink.draw_label(&LabelCommand::from_label(label, x, y));
            stats.labels_emitted += 1;
        }

        log::trace!(
            "compound '{}': {} sprites emitted, {} culled, {} labels",
            self.name,
            stats.sprites_emitted,
            stats.sprites_culled,
            stats.labels_emitted
        );
        stats
    }

    /// Emit only the visible sprites whose drawn area, rotation included,
    /// intersects `region` (logical space). Labels are skipped.
    pub fn render_region<S: DrawSink + ?Sized>(&self, region: &Rect, sink: &mut S) -> EmitStats {
        self.emit_sprites(Some(region), sink)
    }

    fn emit_sprites<S: DrawSink + ?Sized>(&self, region: Option<&Rect>, sink: &mut S) -> EmitStats {
        let zoom = self.window.zoom();
        let source = self.window.source;
        let region = region.map(|r| self.window.logical_rect_to_screen(r));
        let mut stats = EmitStats::default();

        for sprite in &self.sprites {
            let rect = sprite.rect();
            if !rect_intersects(&rect, &source) {
                stats.sprites_culled += 1;
                continue;
            }

            let screen = Rect::new(
                (rect.x - source.x) * zoom.x + self.window.x,
                (rect.y - source.y) * zoom.y + self.window.y,
                rect.w * zoom.x,
                rect.h * zoom.y,
            );
            // Rotation is applied on screen, so compare the rotated screen area.
            if let Some(region) = &region {
                let drawn = rotated_bounds(&screen, sprite.angle, sprite.anchor());
                if !rect_intersects(&drawn, region) {
                    stats.sprites_culled += 1;
                    continue;
                }
            }

            sink.draw_sprite(&SpriteCommand::from_sprite(sprite, screen));
            stats.sprites_emitted += 1;
        }
        stats
    }
}
