use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::error::{ReelError, ReelResult},
    rotation::ledger::AssetCategory,
};

const METADATA_SUFFIX: &str = "_metadata.json";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Feed,
    Reel,
    QuoteCard,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Metadata written next to every generated artifact.
///
/// Only the asset fields matter to rotation; anything else in the file is preserved
/// in `extra`.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OutputRecord {
    #[serde(default)]
    pub theme: String,
    #[serde(rename = "type", default)]
    pub kind: OutputKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_source: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub video_sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_benefit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    #[serde(
        default,
        alias = "output_image",
        alias = "output_video",
        skip_serializing_if = "Option::is_none"
    )]
    pub output: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl OutputRecord {
    pub fn new(theme: impl Into<String>, kind: OutputKind) -> Self {
        Self {
            theme: theme.into(),
            kind,
            generated_at: Some(chrono::Local::now().to_rfc3339()),
            ..Self::default()
        }
    }

    /// Every `(category, identifier)` pair this output consumed.
    pub fn used_assets(&self) -> Vec<(AssetCategory, String)> {
        let mut out = Vec::new();
        if let Some(s) = &self.image_source {
            out.push((AssetCategory::Image, s.clone()));
        }
        out.extend(
            self.video_sources
                .iter()
                .map(|v| (AssetCategory::Video, v.clone())),
        );
        if let Some(s) = &self.quote {
            out.push((AssetCategory::Quote, s.clone()));
        }
        if let Some(s) = &self.health_benefit {
            out.push((AssetCategory::HealthBenefit, s.clone()));
        }
        if let Some(s) = &self.music_source {
            out.push((AssetCategory::Music, s.clone()));
        }
        out
    }

    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        serde_json::from_str(s).map_err(|e| ReelError::serde(format!("output record: {e}")))
    }

    /// Write as `<dir>/<stem>_metadata.json`.
    pub fn write(&self, dir: &Path, stem: &str) -> ReelResult<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create metadata dir '{}'", dir.display()))?;
        let path = dir.join(format!("{stem}{METADATA_SUFFIX}"));
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ReelError::serde(format!("output record: {e}")))?;
        std::fs::write(&path, json)
            .with_context(|| format!("write metadata '{}'", path.display()))?;
        Ok(path)
    }
}

fn is_metadata_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(METADATA_SUFFIX))
}

/// Read every `*_metadata.json` in `root` and its direct subdirectories.
///
/// A missing root yields no history. Files that fail to parse are skipped with a warning.
pub fn load_history(root: &Path) -> Vec<OutputRecord> {
    let mut files = Vec::new();
    let Ok(rd) = std::fs::read_dir(root) else {
        tracing::debug!(root = %root.display(), "no output history");
        return Vec::new();
    };
    for entry in rd.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if let Ok(sub) = std::fs::read_dir(&path) {
                files.extend(sub.flatten().map(|e| e.path()).filter(|p| is_metadata_file(p)));
            }
        } else if is_metadata_file(&path) {
            files.push(path);
        }
    }
    files.sort();

    let mut records = Vec::with_capacity(files.len());
    for path in files {
        let parsed = std::fs::read_to_string(&path)
            .with_context(|| format!("read metadata '{}'", path.display()))
            .map_err(ReelError::from)
            .and_then(|s| OutputRecord::from_json_str(&s));
        match parsed {
            Ok(r) => records.push(r),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable metadata"),
        }
    }
    tracing::debug!(root = %root.display(), records = records.len(), "loaded output history");
    records
}

#[cfg(test)]
#[path = "../../tests/unit/rotation/history.rs"]
mod tests;
