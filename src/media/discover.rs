use std::path::{Path, PathBuf};

use crate::foundation::error::ReelResult;

const IMAGE_EXTS: &[&str] = &["jpg", "jpeg", "png", "webp"];
const VIDEO_EXTS: &[&str] = &["mp4", "mov", "avi", "mkv"];
const AUDIO_EXTS: &[&str] = &["mp3", "wav", "m4a", "aac", "ogg", "flac"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKindHint {
    Image,
    Video,
    Audio,
}

impl MediaKindHint {
    /// Classify by extension, case-insensitively.
    pub fn of(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if IMAGE_EXTS.contains(&ext.as_str()) {
            Some(Self::Image)
        } else if VIDEO_EXTS.contains(&ext.as_str()) {
            Some(Self::Video)
        } else if AUDIO_EXTS.contains(&ext.as_str()) {
            Some(Self::Audio)
        } else {
            None
        }
    }
}

/// Files of `kind` directly inside `dir`, sorted. A missing directory has none.
pub fn list_media(dir: &Path, kind: MediaKindHint) -> ReelResult<Vec<PathBuf>> {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::debug!(dir = %dir.display(), "media directory missing");
        return Ok(Vec::new());
    };
    let mut out = Vec::new();
    for entry in rd {
        let path = entry.map_err(anyhow::Error::from)?.path();
        if path.is_file() && MediaKindHint::of(&path) == Some(kind) {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/media/discover.rs"]
mod tests;
