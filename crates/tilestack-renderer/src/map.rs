//! Layered map: an ordered stack of render layers sharing one tile grid.
//!
//! Layers are refreshed and composited back to front in insertion order,
//! which [`LayeredMap::move_layer`] can rearrange.

use tiny_skia::{FilterQuality, Pixmap, PixmapPaint, Transform};

use tilestack_core::{Rect, VisibleWindow};

use crate::error::RenderError;
use crate::frame::{LayerDrawable, LayerRefresh, MapRefreshReport};
use crate::layer::{LayerId, RenderLayer};
use crate::raster::{pixel_region, region_mask};
use crate::settings::MapSettings;

#[derive(Debug)]
pub struct LayeredMap {
    pub name: String,
    settings: MapSettings,
    layers: Vec<RenderLayer>,
    next_id: LayerId,
    window: VisibleWindow,
}

impl LayeredMap {
    pub fn new(name: &str, settings: MapSettings) -> Result<Self, RenderError> {
        settings.validate()?;
        let window = VisibleWindow::identity(
            settings.logical_width() as f64,
            settings.logical_height() as f64,
        );
        log::info!(
            "map '{}': {}x{} tiles of {}x{} ({}x{} px)",
            name,
            settings.columns,
            settings.rows,
            settings.tile_width,
            settings.tile_height,
            settings.logical_width(),
            settings.logical_height()
        );
        Ok(Self {
            name: name.to_string(),
            settings,
            layers: Vec::new(),
            next_id: 1,
            window,
        })
    }

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    pub fn width(&self) -> u32 {
        self.settings.logical_width()
    }

    pub fn height(&self) -> u32 {
        self.settings.logical_height()
    }

    // ── Layers ───────────────────────────────────────────────────────

    /// Append a new, empty layer on top of the stack.
    pub fn add_layer(&mut self, name: &str) -> Result<LayerId, RenderError> {
        if self.layers.iter().any(|l| l.name() == name) {
            return Err(RenderError::DuplicateLayer(name.to_string()));
        }
        let id = self.next_id;
        let layer = RenderLayer::new(id, name, self.width(), self.height())?
            .with_background(self.settings.background);
        self.layers.push(layer);
        self.next_id += 1;
        log::debug!("map '{}': added layer '{}' (id {})", self.name, name, id);
        Ok(id)
    }

    pub fn layer(&self, name: &str) -> Result<&RenderLayer, RenderError> {
        self.layers
            .iter()
            .find(|l| l.name() == name)
            .ok_or_else(|| RenderError::UnknownLayer(name.to_string()))
    }

    pub fn layer_mut(&mut self, name: &str) -> Result<&mut RenderLayer, RenderError> {
        self.layers
            .iter_mut()
            .find(|l| l.name() == name)
            .ok_or_else(|| RenderError::UnknownLayer(name.to_string()))
    }

    pub fn layer_by_id(&self, id: LayerId) -> Option<&RenderLayer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    pub fn layer_by_id_mut(&mut self, id: LayerId) -> Option<&mut RenderLayer> {
        self.layers.iter_mut().find(|l| l.id() == id)
    }

    pub fn remove_layer(&mut self, name: &str) -> Result<RenderLayer, RenderError> {
        let index = self.index_of(name)?;
        Ok(self.layers.remove(index))
    }

    /// Move a layer to `index` in the stack (0 is the bottom). Indices past
    /// the top place the layer on top.
    pub fn move_layer(&mut self, name: &str, index: usize) -> Result<(), RenderError> {
        let from = self.index_of(name)?;
        let layer = self.layers.remove(from);
        let to = index.min(self.layers.len());
        self.layers.insert(to, layer);
        Ok(())
    }

    pub fn layers(&self) -> &[RenderLayer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [RenderLayer] {
        &mut self.layers
    }

    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    fn index_of(&self, name: &str) -> Result<usize, RenderError> {
        self.layers
            .iter()
            .position(|l| l.name() == name)
            .ok_or_else(|| RenderError::UnknownLayer(name.to_string()))
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

    // ── Frame ────────────────────────────────────────────────────────

    /// Refresh every layer, bottom to top.
    pub fn refresh(&mut self) -> MapRefreshReport {
        let layers = self
            .layers
            .iter_mut()
            .map(|layer| LayerRefresh {
                layer_id: layer.id(),
                name: layer.name().to_string(),
                outcome: layer.refresh(),
            })
            .collect();
        MapRefreshReport { layers }
    }

    /// Presented buffers of the visible layers, back to front.
    pub fn composite_drawable(&self) -> Vec<LayerDrawable<'_>> {
        self.layers
            .iter()
            .filter(|l| l.visible && l.opacity() > 0.0)
            .map(|l| l.output_drawable())
            .collect()
    }

    /// Draw the visible layers onto `canvas` through the map window.
    ///
    /// The canvas is not cleared first. Pixels outside the window's
    /// footprint are left untouched.
    pub fn composite_into(&self, canvas: &mut Pixmap) {
        let footprint = self.window.footprint();
        let Some(region) = pixel_region(&footprint, canvas.width(), canvas.height()) else {
            log::debug!("map '{}': window footprint {:?} is off the canvas", self.name, footprint);
            return;
        };
        let Some(mask) = region_mask(&region, canvas.width(), canvas.height()) else {
            return;
        };

        let transform = window_transform(&self.window);
        for drawable in self.composite_drawable() {
            let paint = PixmapPaint {
                opacity: drawable.opacity,
                quality: FilterQuality::Nearest,
                ..PixmapPaint::default()
            };
            canvas.draw_pixmap(0, 0, drawable.pixmap.as_ref(), &paint, transform, Some(&mask));
        }
    }

    /// Render the visible layers onto a fresh canvas the size of the map.
    pub fn composite(&self) -> Result<Pixmap, RenderError> {
        let (width, height) = (self.width(), self.height());
        let mut canvas =
            Pixmap::new(width, height).ok_or(RenderError::BufferAllocation { width, height })?;
        self.composite_into(&mut canvas);
        Ok(canvas)
    }
}

/// Logical-to-screen transform of a window: `(p - source.origin) * zoom + origin`.
fn window_transform(window: &VisibleWindow) -> Transform {
    let zoom = window.zoom();
    let Rect { x: sx, y: sy, .. } = window.source;
    Transform::from_row(
        zoom.x as f32,
        0.0,
        0.0,
        zoom.y as f32,
        (window.x - sx * zoom.x) as f32,
        (window.y - sy * zoom.y) as f32,
    )
}
