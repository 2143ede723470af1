use tiny_skia::{IntRect, Pixmap};

use tilestack_core::{CompoundSprite, DrawSink, EmitStats, Rect, Rgba, Sprite, VisibleWindow};

use crate::error::RenderError;
use crate::frame::{LayerDrawable, RefreshOutcome, RenderMode};
use crate::raster::{int_rect_to_rect, pixel_region, TextureCache};
use crate::target::DoubleBuffer;

/// A unique layer identifier within a map.
pub type LayerId = u32;

/// A named group of sprites cached in an off-screen, double-buffered target.
///
/// The layer re-renders only when asked:
/// - `should_render == false`: the previous buffer stays presented.
/// - `should_render` with a `rerender_rect`: only that region is recomputed.
/// - `should_render` without a `rerender_rect`: the whole buffer is recomputed.
///
/// `should_render` belongs to the caller and is never reset here. The
/// dirty rect is consumed by every render.
#[derive(Debug)]
pub struct RenderLayer {
    id: LayerId,
    name: String,
    source: CompoundSprite,
    buffer: DoubleBuffer,
    textures: TextureCache,
    background: Rgba,
    pub should_render: bool,
    pub rerender_rect: Option<Rect>,
    pub visible: bool,
    opacity: f32,
}

impl RenderLayer {
    pub fn new(id: LayerId, name: &str, width: u32, height: u32) -> Result<Self, RenderError> {
        let window = VisibleWindow::identity(width as f64, height as f64);
        Ok(Self {
            id,
            name: name.to_string(),
            source: CompoundSprite::new(name, window),
            buffer: DoubleBuffer::new(width, height)?,
            textures: TextureCache::new(),
            background: Rgba::TRANSPARENT,
            should_render: false,
            rerender_rect: None,
            visible: true,
            opacity: 1.0,
        })
    }

    pub fn with_background(mut self, background: Rgba) -> Self {
        self.background = background;
        self
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    // ── Source sprites ───────────────────────────────────────────────

    pub fn source_sprites(&self) -> &[Sprite] {
        self.source.sprites()
    }

    /// Mutating sprites does not mark anything dirty; pair with
    /// [`mark_dirty`](Self::mark_dirty) or [`invalidate`](Self::invalidate).
    pub fn source_sprites_mut(&mut self) -> &mut [Sprite] {
        self.source.sprites_mut()
    }

    pub fn sprite_mut(&mut self, index: usize) -> Option<&mut Sprite> {
        self.source.sprite_mut(index)
    }

    pub fn set_source_sprites(&mut self, sprites: Vec<Sprite>) {
        self.source.set_sprites(sprites);
    }

    pub fn add_sprite(&mut self, sprite: Sprite) -> usize {
        self.source.add_sprite(sprite)
    }

    pub fn remove_sprite(&mut self, index: usize) -> Option<Sprite> {
        self.source.remove_sprite(index)
    }

    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureCache {
        &mut self.textures
    }

    // ── Dirty state ──────────────────────────────────────────────────

    /// Add `rect` to the pending dirty region and request a render.
    pub fn mark_dirty(&mut self, rect: Rect) {
        self.rerender_rect = Some(match self.rerender_rect {
            Some(pending) => pending.union(&rect),
            None => rect,
        });
        self.should_render = true;
    }

    /// Request a full render on the next refresh.
    pub fn invalidate(&mut self) {
        self.rerender_rect = None;
        self.should_render = true;
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    // ── Rendering ────────────────────────────────────────────────────

    pub fn refresh(&mut self) -> RefreshOutcome {
        self.refresh_observed(&mut ())
    }

    /// Refresh, forwarding every emitted draw command to `observer` as well.
    pub fn refresh_observed(&mut self, observer: &mut dyn DrawSink) -> RefreshOutcome {
        if !self.should_render {
            return RefreshOutcome::skipped();
        }

        let (width, height) = (self.width(), self.height());
        let region = match self.rerender_rect.take() {
            Some(rect) if self.buffer.has_content() => match pixel_region(&rect, width, height) {
                Some(region) => Some(region),
                None => {
                    log::debug!("layer '{}': dirty rect {:?} is outside the buffer, dropped", self.name, rect);
                    return RefreshOutcome::skipped();
                }
            },
            Some(rect) => {
                log::warn!(
                    "layer '{}': partial render of {:?} requested before any full render, rendering everything",
                    self.name,
                    rect
                );
                None
            }
            None => None,
        };

        let outcome = match region {
            Some(region) => match self.render_partial(region, observer) {
                Some(outcome) => outcome,
                None => {
                    log::warn!(
                        "layer '{}': cannot clip to {:?}, rendering everything",
                        self.name,
                        region
                    );
                    self.render_full(observer)
                }
            },
            None => self.render_full(observer),
        };

        log::debug!(
            "layer '{}': {:?} render, {} sprites drawn, region {:?}",
            self.name,
            outcome.mode,
            outcome.sprites_drawn,
            outcome.region
        );
        outcome
    }

    fn render_partial(&mut self, region: IntRect, observer: &mut dyn DrawSink) -> Option<RefreshOutcome> {
        let logical = int_rect_to_rect(&region);
        let source = &self.source;
        let mut emitted = EmitStats::default();
        self.buffer.render_region(region, self.background, &self.textures, |sink| {
            emitted = source.render_region(&logical, &mut (sink, &mut *observer));
        })?;
        Some(RefreshOutcome {
            mode: RenderMode::Partial,
            region: Some(logical),
            sprites_drawn: emitted.sprites_emitted,
            sprites_culled: emitted.sprites_culled,
        })
    }

    fn render_full(&mut self, observer: &mut dyn DrawSink) -> RefreshOutcome {
        let source = &self.source;
        let mut emitted = EmitStats::default();
        self.buffer.render_full(self.background, &self.textures, |sink| {
            emitted = source.render(&mut (sink, &mut *observer));
        });
        RefreshOutcome {
            mode: RenderMode::Full,
            region: None,
            sprites_drawn: emitted.sprites_emitted,
            sprites_culled: emitted.sprites_culled,
        }
    }

    /// The presented buffer.
    pub fn buffer(&self) -> &Pixmap {
        self.buffer.front()
    }

    pub fn completed_renders(&self) -> u64 {
        self.buffer.completed_renders()
    }

    pub fn output_drawable(&self) -> LayerDrawable<'_> {
        LayerDrawable {
            layer_id: self.id,
            name: &self.name,
            pixmap: self.buffer.front(),
            opacity: self.opacity,
            generation: self.buffer.completed_renders(),
        }
    }
}
