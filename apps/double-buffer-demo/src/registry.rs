use std::collections::HashMap;

use tilestack_core::{Rgba, Sprite, DEFAULT_SPRITE_PATH};

/// Named sprite prototypes. `construct` hands out fresh copies.
#[derive(Debug, Clone, Default)]
pub struct SpriteRegistry {
    prototypes: HashMap<String, Sprite>,
}

impl SpriteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the `white_1` prototype: a 1×1 white pixel.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(
            "white_1",
            Sprite::new("white_1")
                .with_rect(0.0, 0.0, 1.0, 1.0)
                .with_path(DEFAULT_SPRITE_PATH)
                .with_color(Rgba::WHITE),
        );
        registry
    }

    pub fn register(&mut self, key: &str, prototype: Sprite) -> Option<Sprite> {
        self.prototypes.insert(key.to_string(), prototype)
    }

    pub fn construct(&self, key: &str) -> Option<Sprite> {
        self.prototypes.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }
}
