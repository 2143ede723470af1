//! Double-buffer render test.
//!
//! Two layers hold the same grid of sprites. Every tick one random sprite on
//! the active layer changes colour. The `fully_rerender` layer re-renders
//! everything to show it; the `double_buffered_rerender` layer re-renders
//! only that sprite's rectangle.

use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use tilestack_core::{hsv_to_rgb, CompoundSprite, DrawCommand, Label, Rgba, Sprite, VisibleWindow};
use tilestack_renderer::{LayeredMap, MapRefreshReport, MapSettings};

use crate::input::FrameContext;
use crate::registry::SpriteRegistry;
use crate::tracer::Tracer;

pub const MAP_NAME: &str = "double_buffered_test";
pub const FULL_LAYER: &str = "fully_rerender";
pub const DOUBLE_BUFFERED_LAYER: &str = "double_buffered_rerender";
pub const SPRITES_PER_LAYER: usize = 992;
/// One minute at 60 ticks per second.
pub const DEFAULT_SCENE_TIMER: u64 = 60 * 60;

const SPRITES_PER_ROW: usize = 32;
const SPRITE_EDGE: f64 = 16.0;
const PAGE_WIDTH: f64 = 640.0;

const KEY_TOGGLE_MODE: char = 'x';
const KEY_TOGGLE_RENDERING: char = 'z';
const KEY_NEXT_SCENE: char = ' ';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    Continue,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Full,
    DoubleBuffered,
    Off,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Full => "Full re-render",
            Mode::DoubleBuffered => "Double buffer re-render",
            Mode::Off => "Off",
        }
    }
}

/// Accumulated refresh time for one mode.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Timing {
    pub refreshes: u64,
    #[serde(serialize_with = "as_millis")]
    pub total: Duration,
}

impl Timing {
    fn record(&mut self, elapsed: Duration) {
        self.refreshes += 1;
        self.total += elapsed;
    }

    pub fn mean_ms(&self) -> f64 {
        if self.refreshes == 0 {
            return 0.0;
        }
        self.total.as_secs_f64() * 1000.0 / self.refreshes as f64
    }
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64() * 1000.0)
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ModeTimings {
    pub full: Timing,
    pub double_buffered: Timing,
}

pub struct DoubleBufferScene {
    pub map: LayeredMap,
    rendering: bool,
    full_render: bool,
    never_rendered: bool,
    scene_timer: u64,
    rng: StdRng,
    tracer: Tracer,
    hud: CompoundSprite,
    hud_commands: Vec<DrawCommand>,
    timings: ModeTimings,
    last_report: Option<MapRefreshReport>,
}

impl DoubleBufferScene {
    pub fn new(settings: MapSettings, registry: &SpriteRegistry, seed: Option<u64>) -> Result<Self> {
        let mut tracer = Tracer::new();
        tracer.begin_tick();

        let mut map = LayeredMap::new(MAP_NAME, settings)?;
        map.add_layer(FULL_LAYER)?;
        map.add_layer(DOUBLE_BUFFERED_LAYER)?;
        map.layer_mut(FULL_LAYER)?
            .set_source_sprites(initialize_sprites(registry, "full", 0)?);
        map.layer_mut(DOUBLE_BUFFERED_LAYER)?
            .set_source_sprites(initialize_sprites(registry, "double_buffered", 1)?);
        tracer.mark("initialize");

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let hud = CompoundSprite::new(
            "hud",
            VisibleWindow::identity(map.width() as f64, map.height() as f64),
        );

        Ok(Self {
            map,
            rendering: true,
            full_render: false,
            never_rendered: true,
            scene_timer: DEFAULT_SCENE_TIMER,
            rng,
            tracer,
            hud,
            hud_commands: Vec::new(),
            timings: ModeTimings::default(),
            last_report: None,
        })
    }

    /// Reset the scene timer to `ticks`.
    pub fn prepare_scene(&mut self, ticks: u64) {
        self.scene_timer = ticks;
        log::info!(
            "{}: {} sprites per layer, {} ticks",
            MAP_NAME,
            SPRITES_PER_LAYER,
            ticks
        );
    }

    pub fn mode(&self) -> Mode {
        match (self.rendering, self.full_render) {
            (false, _) => Mode::Off,
            (true, true) => Mode::Full,
            (true, false) => Mode::DoubleBuffered,
        }
    }

    pub fn scene_timer(&self) -> u64 {
        self.scene_timer
    }

    pub fn timings(&self) -> &ModeTimings {
        &self.timings
    }

    pub fn last_report(&self) -> Option<&MapRefreshReport> {
        self.last_report.as_ref()
    }

    /// Status labels drawn on the last tick.
    pub fn hud_commands(&self) -> &[DrawCommand] {
        &self.hud_commands
    }

    pub fn perform_tick(&mut self, ctx: &FrameContext) -> Result<TickResult> {
        self.tracer.begin_tick();

        if ctx.key_up(KEY_TOGGLE_MODE) {
            self.full_render = !self.full_render;
            log::info!("tick {}: render mode {}", ctx.tick, self.mode().label());
        }
        if ctx.key_up(KEY_TOGGLE_RENDERING) {
            self.rendering = !self.rendering;
            log::info!("tick {}: render mode {}", ctx.tick, self.mode().label());
        }

        self.rerender_focus(ctx)?;
        self.tracer.mark("rerender_focus");

        self.hud_commands = self.debug_labels(ctx);
        log::trace!("tick {}: {} hud labels", ctx.tick, self.hud_commands.len());
        self.tracer.end_tick();

        self.scene_timer = self.scene_timer.saturating_sub(1);
        if ctx.key_up(KEY_NEXT_SCENE) || self.scene_timer == 0 {
            return Ok(TickResult::Finished);
        }
        Ok(TickResult::Continue)
    }

    fn active_layer(&self) -> &'static str {
        if self.full_render {
            FULL_LAYER
        } else {
            DOUBLE_BUFFERED_LAYER
        }
    }

    fn rerender_focus(&mut self, ctx: &FrameContext) -> Result<()> {
        if self.rendering {
            let name = self.active_layer();
            let layer = self.map.layer_mut(name)?;
            let count = layer.source_sprites().len();
            if count > 0 {
                let index = self.rng.gen_range(0..count);
                if let Some(sprite) = layer.sprite_mut(index) {
                    sprite.color = sprite
                        .color
                        .with_rgb(hsv_to_rgb((ctx.tick % 360) as f64, 100.0, 100.0));
                    let rect = sprite.rect();
                    if name == DOUBLE_BUFFERED_LAYER && !self.never_rendered {
                        layer.rerender_rect = Some(rect);
                    }
                }
            }
        }

        let (full, double_buffered) = (
            self.never_rendered || (self.rendering && self.full_render),
            self.never_rendered || (self.rendering && !self.full_render),
        );
        self.map.layer_mut(FULL_LAYER)?.should_render = full;
        self.map.layer_mut(DOUBLE_BUFFERED_LAYER)?.should_render = double_buffered;
        self.tracer.mark("rerender_focus: setup");

        let started = Instant::now();
        let report = self.map.refresh();
        let elapsed = started.elapsed();
        self.tracer.mark("rerender_focus: refresh");

        if !self.never_rendered {
            match self.mode() {
                Mode::Full => self.timings.full.record(elapsed),
                Mode::DoubleBuffered => self.timings.double_buffered.record(elapsed),
                Mode::Off => {}
            }
        }
        log::debug!(
            "tick {}: {} layer(s) rendered in {:.3} ms",
            ctx.tick,
            report.rendered_layers(),
            elapsed.as_secs_f64() * 1000.0
        );

        self.last_report = Some(report);
        self.never_rendered = false;
        Ok(())
    }

    /// Status labels for the current tick, as draw commands.
    fn debug_labels(&mut self, ctx: &FrameContext) -> Vec<DrawCommand> {
        let white = Rgba::WHITE;
        let active = Rgba::opaque(255, 0, 0);
        let mode = self.mode();
        let slowest = self
            .tracer
            .slowest_mark()
            .map(|(name, d)| format!("{name} ({:.3} ms)", d.as_secs_f64() * 1000.0))
            .unwrap_or_default();
        let bottom = self.map.height() as f64 - 60.0;

        self.hud.clear();
        let lines = [
            (8.0, 8.0, format!(
                "DoubleBufferScene.  Press spacebar to transition to next scene, or wait {} ticks.",
                self.scene_timer
            ), white),
            (8.0, 28.0, format!("{:.3}ms {:.0}fps", self.tracer.last_tick_ms(), ctx.framerate), white),
            (8.0, 48.0, format!("Render mode (press X to change, Z for off): {}", mode.label()), white),
            (50.0, 100.0, "Full re-render".to_string(), if mode == Mode::Full { active } else { white }),
            (690.0, 100.0, "Double buffered re-render".to_string(), if mode == Mode::DoubleBuffered { active } else { white }),
            (8.0, bottom, format!("Last slowest mark: {slowest}"), white),
        ];
        for (x, y, text, color) in lines {
            self.hud.add_label(Label::new(x, y, &text).with_color(color));
        }

        let mut commands = Vec::new();
        self.hud.render(&mut commands);
        commands
    }
}

/// `SPRITES_PER_LAYER` 16×16 sprites in rows of 32 on a 17 px pitch.
/// Page 1 is shifted right by one page width and has no blue channel.
fn initialize_sprites(registry: &SpriteRegistry, name: &str, page: u32) -> Result<Vec<Sprite>> {
    (0..SPRITES_PER_LAYER)
        .map(|i| {
            let (y_i, x_i) = (i / SPRITES_PER_ROW, i % SPRITES_PER_ROW);
            let mut sprite = registry
                .construct("white_1")
                .ok_or_else(|| anyhow!("sprite prototype 'white_1' is not registered"))?;
            sprite.name = format!("{name}_{x_i}_{y_i}");
            sprite.color = Rgba::clamped(
                100 + x_i as i32,
                100 + y_i as i32,
                if page == 0 { 200 } else { 0 },
                255,
            );
            sprite.set_position(
                x_i as f64 * (SPRITE_EDGE + 1.0) + page as f64 * PAGE_WIDTH + 50.0,
                y_i as f64 * (SPRITE_EDGE + 1.0) + 70.0,
            );
            sprite.set_size(SPRITE_EDGE, SPRITE_EDGE);
            Ok(sprite)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilestack_renderer::RenderMode;

    fn scene() -> DoubleBufferScene {
        DoubleBufferScene::new(MapSettings::default(), &SpriteRegistry::with_defaults(), Some(7)).unwrap()
    }

    fn mode_of(scene: &DoubleBufferScene, layer: &str) -> RenderMode {
        scene.last_report().and_then(|r| r.outcome(layer)).map(|o| o.mode).unwrap()
    }

    #[test]
    fn test_sprite_grid_layout() {
        let registry = SpriteRegistry::with_defaults();
        let sprites = initialize_sprites(&registry, "full", 0).unwrap();
        assert_eq!(sprites.len(), SPRITES_PER_LAYER);
        assert_eq!(sprites[0].rect(), tilestack_core::Rect::new(50.0, 70.0, 16.0, 16.0));
        assert_eq!(sprites[33].name, "full_1_1");
        assert_eq!((sprites[33].x, sprites[33].y), (67.0, 87.0));
        assert_eq!(sprites[33].color, Rgba::opaque(101, 101, 200));

        let page = initialize_sprites(&registry, "double_buffered", 1).unwrap();
        assert_eq!(page[0].x, 690.0);
        assert_eq!(page[0].color.b, 0);
        assert!(page.iter().all(|s| s.rect().right() <= 1280.0 && s.rect().bottom() <= 768.0));
    }

    #[test]
    fn test_missing_prototype_is_an_error() {
        assert!(DoubleBufferScene::new(MapSettings::default(), &SpriteRegistry::new(), None).is_err());
    }

    #[test]
    fn test_first_tick_renders_both_layers() {
        let mut scene = scene();
        scene.perform_tick(&FrameContext::new(0)).unwrap();
        assert_eq!(mode_of(&scene, FULL_LAYER), RenderMode::Full);
        assert_eq!(mode_of(&scene, DOUBLE_BUFFERED_LAYER), RenderMode::Full);
    }

    #[test]
    fn test_double_buffered_mode_renders_partially() {
        let mut scene = scene();
        scene.perform_tick(&FrameContext::new(0)).unwrap();
        scene.perform_tick(&FrameContext::new(1)).unwrap();
        assert_eq!(scene.mode(), Mode::DoubleBuffered);
        assert_eq!(mode_of(&scene, FULL_LAYER), RenderMode::Skipped);
        assert_eq!(mode_of(&scene, DOUBLE_BUFFERED_LAYER), RenderMode::Partial);
        assert_eq!(scene.timings().double_buffered.refreshes, 1);
    }

    #[test]
    fn test_key_toggles() {
        let mut scene = scene();
        scene.perform_tick(&FrameContext::new(0)).unwrap();

        scene.perform_tick(&FrameContext::new(1).with_key_up('x')).unwrap();
        assert_eq!(scene.mode(), Mode::Full);
        assert_eq!(mode_of(&scene, FULL_LAYER), RenderMode::Full);
        assert_eq!(mode_of(&scene, DOUBLE_BUFFERED_LAYER), RenderMode::Skipped);

        scene.perform_tick(&FrameContext::new(2).with_key_up('z')).unwrap();
        assert_eq!(scene.mode(), Mode::Off);
        let report = scene.last_report().unwrap();
        assert_eq!(report.rendered_layers(), 0);
    }

    #[test]
    fn test_scene_finishes_on_timer_or_space() {
        let mut scene = scene();
        scene.prepare_scene(2);
        assert_eq!(scene.perform_tick(&FrameContext::new(0)).unwrap(), TickResult::Continue);
        assert_eq!(scene.perform_tick(&FrameContext::new(1)).unwrap(), TickResult::Finished);

        let mut scene = self::scene();
        let result = scene.perform_tick(&FrameContext::new(0).with_key_up(' ')).unwrap();
        assert_eq!(result, TickResult::Finished);
    }

    #[test]
    fn test_tick_keeps_hud_labels() {
        let mut scene = scene();
        scene.perform_tick(&FrameContext::new(0).with_key_up('x')).unwrap();
        let hud = scene.hud_commands();
        assert_eq!(hud.len(), 6);
        let mode = hud[2].as_label().unwrap();
        assert!(mode.text.ends_with("Full re-render"));
        let full = hud[3].as_label().unwrap();
        assert_eq!((full.r, full.g, full.b), (255, 0, 0));
        assert!(tilestack_core::command::commands_to_json(hud).unwrap().contains("\"kind\": \"label\""));
    }

    #[test]
    fn test_debug_labels_highlight_active_mode() {
        let mut scene = scene();
        let labels = scene.debug_labels(&FrameContext::new(0));
        assert_eq!(labels.len(), 6);
        let double = labels[4].as_label().unwrap();
        assert_eq!(double.text, "Double buffered re-render");
        assert_eq!((double.r, double.g, double.b), (255, 0, 0));
    }
}
