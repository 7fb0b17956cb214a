use std::path::Path;

use anyhow::Context as _;
use image::{DynamicImage, ImageFormat};

use crate::{
    canvas::raster::Frame,
    foundation::error::{ReelError, ReelResult},
};

pub const JPEG_QUALITY: u8 = 95;

/// Create the parent directory of `path` if needed.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Save a frame as PNG or JPEG, picked by extension. JPEG output drops alpha.
pub fn save_frame(frame: &Frame, path: &Path) -> ReelResult<()> {
    let format = ImageFormat::from_path(path)
        .map_err(|e| ReelError::validation(format!("output '{}': {e}", path.display())))?;
    ensure_parent_dir(path)?;
    let rgba = frame.to_rgba_image()?;

    match format {
        ImageFormat::Png => rgba
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| ReelError::media(format!("write '{}': {e}", path.display())))?,
        ImageFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
            let file = std::fs::File::create(path)
                .with_context(|| format!("create '{}'", path.display()))?;
            let mut writer = std::io::BufWriter::new(file);
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY)
                .encode_image(&rgb)
                .map_err(|e| ReelError::media(format!("encode '{}': {e}", path.display())))?;
        }
        other => {
            return Err(ReelError::validation(format!(
                "unsupported still format {other:?}; use .png or .jpg"
            )));
        }
    }
    tracing::debug!(path = %path.display(), w = frame.width, h = frame.height, "saved still");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/still.rs"]
mod tests;
