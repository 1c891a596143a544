pub mod reveal_config;
pub mod typing_sounds;

pub use reveal_config::*;
pub use typing_sounds::*;
