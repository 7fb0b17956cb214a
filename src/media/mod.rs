pub mod discover;
pub mod probe;
