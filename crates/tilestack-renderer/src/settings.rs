use serde::{Deserialize, Serialize};
use tilestack_core::Rgba;

use crate::error::RenderError;

/// Largest buffer edge accepted, in pixels.
pub const MAX_BUFFER_EDGE: u32 = 16_384;

/// Tile grid metadata for a layered map. Every layer buffer covers the whole grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub tile_width: u32,
    pub tile_height: u32,
    pub columns: u32,
    pub rows: u32,
    /// Color a layer buffer is cleared to before a render.
    pub background: Rgba,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            tile_width: 64,
            tile_height: 64,
            columns: 20,
            rows: 12,
            background: Rgba::TRANSPARENT,
        }
    }
}

impl MapSettings {
    pub fn new(tile_width: u32, tile_height: u32, columns: u32, rows: u32) -> Self {
        Self {
            tile_width,
            tile_height,
            columns,
            rows,
            ..Default::default()
        }
    }

    pub fn with_background(mut self, background: Rgba) -> Self {
        self.background = background;
        self
    }

    /// Logical width in pixels (`columns * tile_width`).
    pub fn logical_width(&self) -> u32 {
        self.columns.saturating_mul(self.tile_width)
    }

    /// Logical height in pixels (`rows * tile_height`).
    pub fn logical_height(&self) -> u32 {
        self.rows.saturating_mul(self.tile_height)
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(RenderError::InvalidSettings(format!(
                "tile size must be positive, got {}x{}",
                self.tile_width, self.tile_height
            )));
        }
        if self.columns == 0 || self.rows == 0 {
            return Err(RenderError::InvalidSettings(format!(
                "grid must have at least one tile, got {}x{}",
                self.columns, self.rows
            )));
        }
        let (w, h) = (self.logical_width(), self.logical_height());
        if w > MAX_BUFFER_EDGE || h > MAX_BUFFER_EDGE {
            return Err(RenderError::InvalidSettings(format!(
                "map is {w}x{h} pixels, larger than {MAX_BUFFER_EDGE} on an edge"
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        let settings: MapSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
