pub mod dialogue_box;
pub mod dialogue_reveal;

pub use dialogue_box::*;
pub use dialogue_reveal::*;
