pub mod glyph_layout;
pub mod markup;
pub mod text_motion;
