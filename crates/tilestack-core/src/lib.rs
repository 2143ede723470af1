//! # Tilestack Core
//!
//! Drawable primitives for the tilestack 2D engine: sprites, text labels,
//! screen-space draw commands, and the compound drawable that groups many
//! independently transformed children behind one visible window.
//!
//! Nothing here touches pixels. Containers emit [`DrawCommand`]s into a
//! [`DrawSink`]; the renderer crate supplies a rasterizing sink.

pub mod color;
pub mod command;
pub mod compound;
pub mod geometry;
pub mod label;
pub mod sprite;
pub mod transform;
pub mod window;

pub use color::{hsv_to_rgb, Rgba};
pub use command::{DrawCommand, DrawSink, LabelCommand, SpriteCommand};
pub use compound::{CompoundSprite, EmitStats};
pub use geometry::{Point, Rect};
pub use label::{Alignment, Label, DEFAULT_FONT};
pub use sprite::{Sprite, DEFAULT_SPRITE_PATH};
pub use transform::{rect_intersects, rotated_bounds, zoom_factor, Zoom};
pub use window::VisibleWindow;
