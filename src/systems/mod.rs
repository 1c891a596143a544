pub mod dialogue;

pub use dialogue::*;
