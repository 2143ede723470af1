//! # Tilestack Renderer
//!
//! Off-screen, double-buffered render targets for compound sprites, and the
//! layered map that stacks them.
//!
//! Each [`RenderLayer`] caches its sprites in a [`tiny_skia::Pixmap`] and only
//! re-rasterizes when asked, either fully or within a dirty rectangle. A
//! [`LayeredMap`] refreshes its layers in order and composites the presented
//! buffers through its visible window.

pub mod error;
pub mod frame;
pub mod layer;
pub mod map;
pub mod raster;
pub mod settings;
pub mod target;

pub use error::RenderError;
pub use frame::{LayerDrawable, LayerRefresh, MapRefreshReport, RefreshOutcome, RenderMode};
pub use layer::{LayerId, RenderLayer};
pub use map::LayeredMap;
pub use raster::{RasterSink, RasterStats, TextureCache};
pub use settings::MapSettings;
pub use target::DoubleBuffer;
