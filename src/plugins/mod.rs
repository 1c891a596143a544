pub mod core;
pub mod input;
pub mod demo_ui;
