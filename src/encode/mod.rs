pub mod ffmpeg;
pub mod still;
