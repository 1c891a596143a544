//! Dialogue box display surface.
//!
//! A dialogue box entity owns one `Text2d` child per character of the line
//! being revealed. Glyphs are laid out once when the reveal starts; every
//! frame afterwards only their transform and colour change.
//!
//! Layout gives every character the same advance, so the box font must be
//! monospace. The default font is Bevy's built-in FiraMono.

use bevy::prelude::*;
use bevy_kira_audio::AudioSource;

use crate::utils::glyph_layout::ADVANCE_EMS;

/// A surface that dialogue lines are revealed on.
#[derive(Component, Debug, Clone)]
pub struct DialogueBox {
    /// Monospace font the glyphs are drawn with.
    pub font: Handle<Font>,
    /// Advance of one character of `font`, in ems.
    pub advance_ems: f32,
    /// Glyph size; also scales shake and wave offsets.
    pub font_size: f32,
    /// Width after which lines wrap.
    pub max_line_width: f32,
    /// Colour of fully revealed glyphs.
    pub color: Color,
    /// Clip played while characters appear.
    pub typing_sound: Handle<AudioSource>,
}

impl DialogueBox {
    pub fn new(typing_sound: Handle<AudioSource>) -> Self {
        Self {
            font: Handle::default(),
            advance_ems: ADVANCE_EMS,
            font_size: 32.0,
            max_line_width: 900.0,
            color: Color::srgb(0.95, 0.92, 0.85),
            typing_sound,
        }
    }

    /// Draws glyphs with a monospace `font` whose characters advance `advance_ems`.
    pub fn with_font(mut self, font: Handle<Font>, advance_ems: f32) -> Self {
        self.font = font;
        self.advance_ems = advance_ems;
        self
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_max_line_width(mut self, max_line_width: f32) -> Self {
        self.max_line_width = max_line_width;
        self
    }

    /// Colour of a glyph: its box colour when visible, fully transparent otherwise.
    pub fn glyph_color(&self, visible: bool) -> Color {
        if visible {
            self.color
        } else {
            self.color.with_alpha(0.0)
        }
    }
}

/// One character of a dialogue box, spawned as a child of the box.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct DialogueGlyph {
    /// Index of the character in the revealed text.
    pub index: usize,
    /// Laid-out position relative to the box, before any motion.
    pub rest_position: Vec2,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let dialogue_box = DialogueBox::new(Handle::default())
            .with_font_size(20.0)
            .with_max_line_width(400.0);
        assert_eq!(dialogue_box.font_size, 20.0);
        assert_eq!(dialogue_box.max_line_width, 400.0);
        assert_eq!(dialogue_box.advance_ems, ADVANCE_EMS);

        let dialogue_box = dialogue_box.with_font(Handle::default(), 0.5);
        assert_eq!(dialogue_box.advance_ems, 0.5);
    }

    #[test]
    fn test_hidden_glyphs_are_transparent() {
        let dialogue_box = DialogueBox::new(Handle::default());
        assert_eq!(dialogue_box.glyph_color(false).alpha(), 0.0);
        assert_eq!(dialogue_box.glyph_color(true), dialogue_box.color);
    }
}
