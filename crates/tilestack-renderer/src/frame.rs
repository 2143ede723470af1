use serde::{Deserialize, Serialize};
use tiny_skia::Pixmap;

use tilestack_core::{Rect, Rgba};

use crate::layer::LayerId;
use crate::raster::pixel_at;

/// What a layer did during one refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Nothing was rendered; the previous buffer is still presented.
    Skipped,
    /// The whole buffer was re-rendered.
    Full,
    /// Only the dirty region was re-rendered.
    Partial,
}

/// Result of refreshing a single layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefreshOutcome {
    pub mode: RenderMode,
    /// Pixel region recomputed by a partial render.
    pub region: Option<Rect>,
    pub sprites_drawn: usize,
    pub sprites_culled: usize,
}

impl RefreshOutcome {
    pub fn skipped() -> Self {
        Self {
            mode: RenderMode::Skipped,
            region: None,
            sprites_drawn: 0,
            sprites_culled: 0,
        }
    }

    pub fn rendered(&self) -> bool {
        self.mode != RenderMode::Skipped
    }
}

/// Refresh results for every layer of a map, in refresh order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapRefreshReport {
    pub layers: Vec<LayerRefresh>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerRefresh {
    pub layer_id: LayerId,
    pub name: String,
    pub outcome: RefreshOutcome,
}

impl MapRefreshReport {
    pub fn rendered_layers(&self) -> usize {
        self.layers.iter().filter(|l| l.outcome.rendered()).count()
    }

    pub fn outcome(&self, name: &str) -> Option<&RefreshOutcome> {
        self.layers.iter().find(|l| l.name == name).map(|l| &l.outcome)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// A layer's presented buffer, ready for composition.
#[derive(Debug, Clone, Copy)]
pub struct LayerDrawable<'a> {
    pub layer_id: LayerId,
    pub name: &'a str,
    pub pixmap: &'a Pixmap,
    pub opacity: f32,
    /// Number of renders the buffer has gone through.
    pub generation: u64,
}

impl LayerDrawable<'_> {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        pixel_at(self.pixmap, x, y)
    }
}
