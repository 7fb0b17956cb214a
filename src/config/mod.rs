pub mod color;
pub mod settings;
