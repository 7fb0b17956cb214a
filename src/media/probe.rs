use std::path::{Path, PathBuf};

use crate::{
    foundation::error::{ReelError, ReelResult},
    media::discover::MediaKindHint,
    timeline::model::{AudioTrack, MediaSegment},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct VideoInfo {
    pub source_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps_num: u32,
    pub fps_den: u32,
    pub duration_sec: f64,
    pub has_audio: bool,
}

impl VideoInfo {
    pub fn source_fps(&self) -> f64 {
        if self.fps_den == 0 {
            0.0
        } else {
            f64::from(self.fps_num) / f64::from(self.fps_den)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

/// Intrinsic dimensions and durations of source media.
pub trait MediaProbe {
    fn probe_video(&self, path: &Path) -> ReelResult<VideoInfo>;
    fn probe_image(&self, path: &Path) -> ReelResult<ImageInfo>;
    /// Length of the first audio stream (or the container) in seconds.
    fn probe_audio(&self, path: &Path) -> ReelResult<f64>;
}

/// `ffprobe` for time-based media, the `image` crate for stills.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemProbe;

impl SystemProbe {
    fn ffprobe(path: &Path) -> ReelResult<Vec<u8>> {
        let out = std::process::Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
            ])
            .arg(path)
            .output()
            .map_err(|e| ReelError::media(format!("failed to run ffprobe: {e}")))?;
        if !out.status.success() {
            return Err(ReelError::media(format!(
                "ffprobe failed for '{}': {}",
                path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        Ok(out.stdout)
    }
}

impl MediaProbe for SystemProbe {
    fn probe_video(&self, path: &Path) -> ReelResult<VideoInfo> {
        parse_video_probe(path, &Self::ffprobe(path)?)
    }

    fn probe_image(&self, path: &Path) -> ReelResult<ImageInfo> {
        let (width, height) = image::image_dimensions(path)
            .map_err(|e| ReelError::media(format!("read image '{}': {e}", path.display())))?;
        Ok(ImageInfo { width, height })
    }

    fn probe_audio(&self, path: &Path) -> ReelResult<f64> {
        parse_audio_probe(&Self::ffprobe(path)?)
    }
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

impl ProbeOut {
    fn parse(json: &[u8]) -> ReelResult<Self> {
        serde_json::from_slice(json)
            .map_err(|e| ReelError::media(format!("ffprobe json parse failed: {e}")))
    }

    fn stream(&self, kind: &str) -> Option<&ProbeStream> {
        self.streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(kind))
    }

    fn format_duration(&self) -> Option<f64> {
        self.format
            .as_ref()
            .and_then(|f| f.duration.as_deref())
            .and_then(parse_seconds)
    }
}

fn parse_seconds(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|d| d.is_finite() && *d >= 0.0)
}

pub(crate) fn parse_video_probe(path: &Path, json: &[u8]) -> ReelResult<VideoInfo> {
    let parsed = ProbeOut::parse(json)?;
    let video = parsed
        .stream("video")
        .ok_or_else(|| ReelError::media(format!("no video stream in '{}'", path.display())))?;
    let width = video
        .width
        .ok_or_else(|| ReelError::media("missing video width from ffprobe"))?;
    let height = video
        .height
        .ok_or_else(|| ReelError::media("missing video height from ffprobe"))?;
    let (fps_num, fps_den) = parse_ff_ratio(video.r_frame_rate.as_deref().unwrap_or("0/1"))
        .ok_or_else(|| ReelError::media("invalid video r_frame_rate"))?;
    let duration_sec = parsed
        .format_duration()
        .or_else(|| video.duration.as_deref().and_then(parse_seconds))
        .unwrap_or(0.0);

    Ok(VideoInfo {
        source_path: path.to_path_buf(),
        width,
        height,
        fps_num,
        fps_den,
        duration_sec,
        has_audio: parsed.stream("audio").is_some(),
    })
}

pub(crate) fn parse_audio_probe(json: &[u8]) -> ReelResult<f64> {
    let parsed = ProbeOut::parse(json)?;
    let stream = parsed
        .stream("audio")
        .ok_or_else(|| ReelError::media("no audio stream found"))?;
    stream
        .duration
        .as_deref()
        .and_then(parse_seconds)
        .or_else(|| parsed.format_duration())
        .filter(|d| *d > 0.0)
        .ok_or_else(|| ReelError::media("audio duration unavailable"))
}

fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.parse::<u32>().ok()?;
    let b = parts.next()?.parse::<u32>().ok()?;
    if b == 0 {
        return None;
    }
    Some((a, b))
}

/// Probe `path` into a timeline segment identified by its path.
pub fn probe_segment(probe: &dyn MediaProbe, path: &Path) -> ReelResult<MediaSegment> {
    let id = path.to_string_lossy().into_owned();
    match MediaKindHint::of(path) {
        Some(MediaKindHint::Image) => {
            probe.probe_image(path)?;
            Ok(MediaSegment::image(id, path))
        }
        Some(MediaKindHint::Video) => {
            let info = probe.probe_video(path)?;
            Ok(MediaSegment::video(id, path, info.duration_sec))
        }
        _ => Err(ReelError::validation(format!(
            "'{}' is not a supported image or video file",
            path.display()
        ))),
    }
}

pub fn probe_track(probe: &dyn MediaProbe, path: &Path, volume: f32) -> ReelResult<AudioTrack> {
    let duration_sec = probe.probe_audio(path)?;
    let mut track = AudioTrack::new(path, duration_sec);
    track.volume = volume;
    Ok(track)
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
