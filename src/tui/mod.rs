pub mod actions;
pub mod app;
pub mod commands;
pub mod input;
pub mod keymap;
pub mod layout;
pub mod line_editor;
pub mod render;
pub mod theme;

pub use app::run;
