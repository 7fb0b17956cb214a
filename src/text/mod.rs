pub mod fitter;
pub mod font;
pub mod library;
pub mod metrics;
pub mod segment;
