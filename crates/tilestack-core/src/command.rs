use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::label::{Alignment, Label};
use crate::sprite::Sprite;

/// A destination for draw commands.
///
/// Commands arrive in draw order: later commands are painted on top of
/// earlier ones.
pub trait DrawSink {
    fn draw_sprite(&mut self, cmd: &SpriteCommand);
    fn draw_label(&mut self, cmd: &LabelCommand);
}

/// Screen-space sprite draw record with every optional field resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteCommand {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub path: String,
    pub angle: f64,
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Tile sub-selection. Compound drawables never tile, so this is always `None` from them.
    pub tile: Option<Rect>,
    pub flip_horizontally: bool,
    pub flip_vertically: bool,
    pub anchor_x: f64,
    pub anchor_y: f64,
    /// Texture sub-region, passed through from the sprite unchanged.
    pub source: Option<Rect>,
}

impl SpriteCommand {
    /// Build the record for `sprite` drawn at `screen`.
    ///
    /// Negative screen sizes collapse to zero and anchors clamp into `[0, 1]`.
    pub fn from_sprite(sprite: &Sprite, screen: Rect) -> Self {
        let (anchor_x, anchor_y) = sprite.anchor();
        let color = sprite.color;
        Self {
            x: screen.x,
            y: screen.y,
            w: screen.w.max(0.0),
            h: screen.h.max(0.0),
            path: sprite.path_or_default().to_string(),
            angle: sprite.angle,
            a: color.a,
            r: color.r,
            g: color.g,
            b: color.b,
            tile: None,
            flip_horizontally: sprite.flip_horizontally,
            flip_vertically: sprite.flip_vertically,
            anchor_x: anchor_x.clamp(0.0, 1.0),
            anchor_y: anchor_y.clamp(0.0, 1.0),
            source: sprite.source,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

/// Screen-space label draw record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelCommand {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub size_enum: i32,
    pub alignment: Alignment,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
    pub font: String,
}

impl LabelCommand {
    pub fn from_label(label: &Label, x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            text: label.text_or_default().to_string(),
            size_enum: label.size_enum,
            alignment: label.alignment,
            r: label.color.r,
            g: label.color.g,
            b: label.color.b,
            a: label.color.a,
            font: label.font_or_default().to_string(),
        }
    }
}

/// A single recorded draw command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    Sprite(SpriteCommand),
    Label(LabelCommand),
}

impl DrawCommand {
    pub fn as_sprite(&self) -> Option<&SpriteCommand> {
        match self {
            DrawCommand::Sprite(s) => Some(s),
            DrawCommand::Label(_) => None,
        }
    }

    pub fn as_label(&self) -> Option<&LabelCommand> {
        match self {
            DrawCommand::Label(l) => Some(l),
            DrawCommand::Sprite(_) => None,
        }
    }
}

/// Serialize a recorded command list for inspection.
pub fn commands_to_json(commands: &[DrawCommand]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(commands)
}

// ── Sinks ────────────────────────────────────────────────────────────

/// Recording sink.
impl DrawSink for Vec<DrawCommand> {
    fn draw_sprite(&mut self, cmd: &SpriteCommand) {
        self.push(DrawCommand::Sprite(cmd.clone()));
    }

    fn draw_label(&mut self, cmd: &LabelCommand) {
        self.push(DrawCommand::Label(cmd.clone()));
    }
}

/// Discarding sink.
impl DrawSink for () {
    fn draw_sprite(&mut self, _cmd: &SpriteCommand) {}

    fn draw_label(&mut self, _cmd: &LabelCommand) {}
}

/// Fan-out: every command goes to both sinks, first `A` then `B`.
impl<A: DrawSink, B: DrawSink> DrawSink for (A, B) {
    fn draw_sprite(&mut self, cmd: &SpriteCommand) {
        self.0.draw_sprite(cmd);
        self.1.draw_sprite(cmd);
    }

    fn draw_label(&mut self, cmd: &LabelCommand) {
        self.0.draw_label(cmd);
        self.1.draw_label(cmd);
    }
}

impl<S: DrawSink + ?Sized> DrawSink for &mut S {
    fn draw_sprite(&mut self, cmd: &SpriteCommand) {
        (**self).draw_sprite(cmd);
    }

    fn draw_label(&mut self, cmd: &LabelCommand) {
        (**self).draw_label(cmd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    #[test]
    fn test_sprite_command_resolves_defaults() {
        let sprite = Sprite::new("s")
            .with_rect(0.0, 0.0, 16.0, 16.0)
            .with_color(Rgba::new(1, 2, 3, 4))
            .with_source(Rect::new(0.0, 0.0, 8.0, 8.0));
        let cmd = SpriteCommand::from_sprite(&sprite, Rect::new(10.0, 20.0, -1.0, 32.0));
        assert_eq!(cmd.path, "pixel");
        assert_eq!((cmd.r, cmd.g, cmd.b, cmd.a), (1, 2, 3, 4));
        assert_eq!(cmd.w, 0.0);
        assert_eq!(cmd.h, 32.0);
        assert!(cmd.tile.is_none());
        assert_eq!(cmd.source, Some(Rect::new(0.0, 0.0, 8.0, 8.0)));
    }

    #[test]
    fn test_label_command_resolves_defaults() {
        let label = Label {
            text: None,
            font: None,
            ..Default::default()
        };
        let cmd = LabelCommand::from_label(&label, 3.0, 4.0);
        assert_eq!(cmd.text, "");
        assert_eq!(cmd.font, "default");
        assert_eq!((cmd.x, cmd.y), (3.0, 4.0));
    }

    #[test]
    fn test_fan_out_sink() {
        let mut pair: (Vec<DrawCommand>, Vec<DrawCommand>) = (Vec::new(), Vec::new());
        let label = LabelCommand::from_label(&Label::new(0.0, 0.0, "hi"), 0.0, 0.0);
        pair.draw_label(&label);
        assert_eq!(pair.0.len(), 1);
        assert_eq!(pair.0, pair.1);
    }

    #[test]
    fn test_commands_json_is_tagged() {
        let sprite = Sprite::new("s").with_rect(0.0, 0.0, 1.0, 1.0);
        let cmds = vec![DrawCommand::Sprite(SpriteCommand::from_sprite(&sprite, sprite.rect()))];
        let json = commands_to_json(&cmds).unwrap();
        assert!(json.contains("\"kind\": \"sprite\""));
    }
}
