//! Animated dialogue reveal for Bevy.
//!
//! Dialogue lines are authored with inline tags (`<p:short>`, `<sp:40>`,
//! `<anim:wave>...</anim>`). The markup parser strips them into positioned
//! commands, and the reveal engine types the line out character by
//! character, popping glyphs in, shaking or waving tagged ranges and playing
//! typing sounds.

pub mod components;
pub mod events;
pub mod plugins;
pub mod resources;
pub mod systems;
pub mod utils;
