use serde::{Deserialize, Serialize};

use crate::color::Rgba;

/// Font used when a label has none.
pub const DEFAULT_FONT: &str = "default";

/// Horizontal alignment of a label relative to its anchor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Integer encoding expected by label sinks.
    pub fn as_enum(&self) -> u8 {
        match self {
            Alignment::Left => 0,
            Alignment::Center => 1,
            Alignment::Right => 2,
        }
    }
}

/// A positioned text string.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Label {
    pub x: f64,
    pub y: f64,
    pub text: Option<String>,
    /// Size step relative to the default font size (0 is default, negative is smaller).
    pub size_enum: i32,
    pub alignment: Alignment,
    pub color: Rgba,
    pub font: Option<String>,
}

impl Label {
    pub fn new(x: f64, y: f64, text: &str) -> Self {
        Self {
            x,
            y,
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, size_enum: i32) -> Self {
        self.size_enum = size_enum;
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    pub fn with_font(mut self, font: &str) -> Self {
        self.font = Some(font.to_string());
        self
    }

    pub fn text_or_default(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn font_or_default(&self) -> &str {
        self.font.as_deref().unwrap_or(DEFAULT_FONT)
    }
}
