use std::path::PathBuf;

use crate::{
    foundation::error::{Notice, ReelError, ReelResult},
    text::fitter::{LayoutResult, TextBlock},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Image,
}

/// Window of the source to use, in source seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Trim {
    pub start_sec: f64,
    pub duration_sec: f64,
}

/// A clip or still image as handed to the composer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MediaSegment {
    pub id: String,
    pub source: PathBuf,
    pub kind: MediaKind,
    /// Intrinsic length of a video. Images have none and can hold any duration.
    #[serde(default)]
    pub natural_duration_sec: Option<f64>,
    #[serde(default)]
    pub trim: Option<Trim>,
}

impl MediaSegment {
    pub fn video(id: impl Into<String>, source: impl Into<PathBuf>, duration_sec: f64) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            kind: MediaKind::Video,
            natural_duration_sec: Some(duration_sec),
            trim: None,
        }
    }

    pub fn image(id: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            kind: MediaKind::Image,
            natural_duration_sec: None,
            trim: None,
        }
    }

    pub fn with_trim(mut self, start_sec: f64, duration_sec: f64) -> Self {
        self.trim = Some(Trim {
            start_sec,
            duration_sec,
        });
        self
    }

    pub fn source_start_sec(&self) -> f64 {
        self.trim.map_or(0.0, |t| t.start_sec.max(0.0))
    }

    /// Seconds this segment can contribute (infinite for untrimmed stills).
    pub fn playable_sec(&self) -> f64 {
        let start = self.source_start_sec();
        let natural = match (self.kind, self.natural_duration_sec) {
            (_, Some(d)) if d.is_finite() => (d - start).max(0.0),
            (MediaKind::Image, _) => f64::INFINITY,
            // A video with unknown length is unusable.
            (MediaKind::Video, _) => 0.0,
        };
        match self.trim {
            Some(t) if t.duration_sec.is_finite() => natural.min(t.duration_sec.max(0.0)),
            _ => natural,
        }
    }
}

/// One segment occurrence on the timeline.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct SegmentPlacement {
    pub segment_index: usize,
    /// Which repetition of the sequence this placement belongs to (0 = first pass).
    pub loop_index: u32,
    pub source_start_sec: f64,
    pub timeline_start_sec: f64,
    pub duration_sec: f64,
}

impl SegmentPlacement {
    pub fn timeline_end_sec(&self) -> f64 {
        self.timeline_start_sec + self.duration_sec
    }
}

/// Reading-speed model for overlay durations.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReadingSpeed {
    pub words_per_sec: f64,
    pub chars_per_sec: f64,
    /// Added per wrapped line beyond the first.
    pub extra_line_sec: f64,
    pub floor_sec: f64,
    pub ceiling_sec: f64,
}

impl Default for ReadingSpeed {
    fn default() -> Self {
        Self {
            words_per_sec: 2.5,
            chars_per_sec: 100.0,
            extra_line_sec: 0.5,
            floor_sec: 2.5,
            ceiling_sec: 12.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub min_duration_sec: f64,
    pub max_duration_sec: f64,
    pub segment_cap_sec: f64,
    pub reading: ReadingSpeed,
    /// Start of the introductory overlay as a fraction of the total.
    pub intro_fraction: f64,
    /// Start of the closing overlay as a fraction of the total.
    pub closing_fraction: f64,
    pub attenuation: f32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            min_duration_sec: 15.0,
            max_duration_sec: 90.0,
            segment_cap_sec: 10.0,
            reading: ReadingSpeed::default(),
            intro_fraction: 0.10,
            closing_fraction: 0.50,
            attenuation: 0.3,
        }
    }
}

impl TimelineConfig {
    pub fn validate(&self) -> ReelResult<()> {
        validate_bounds(self.min_duration_sec, self.max_duration_sec)?;
        if !self.segment_cap_sec.is_finite() || self.segment_cap_sec <= 0.0 {
            return Err(ReelError::validation("segment_cap_sec must be finite and > 0"));
        }
        let r = &self.reading;
        if !(r.words_per_sec > 0.0 && r.chars_per_sec > 0.0) {
            return Err(ReelError::validation("reading speeds must be > 0"));
        }
        if !(r.extra_line_sec >= 0.0 && r.floor_sec >= 0.0 && r.floor_sec <= r.ceiling_sec) {
            return Err(ReelError::validation(
                "overlay durations need 0 <= floor <= ceiling and a non-negative line penalty",
            ));
        }
        if !self.attenuation.is_finite() || self.attenuation < 0.0 {
            return Err(ReelError::validation("attenuation must be >= 0"));
        }
        Ok(())
    }
}

/// `0 < min <= max`, both finite.
pub fn validate_bounds(min_sec: f64, max_sec: f64) -> ReelResult<()> {
    if !min_sec.is_finite() || !max_sec.is_finite() {
        return Err(ReelError::invalid_bounds(format!(
            "bounds must be finite (min={min_sec}, max={max_sec})"
        )));
    }
    if min_sec <= 0.0 {
        return Err(ReelError::invalid_bounds(format!(
            "min duration must be > 0 (got {min_sec})"
        )));
    }
    if max_sec < min_sec {
        return Err(ReelError::invalid_bounds(format!(
            "max duration {max_sec} is below min duration {min_sec}"
        )));
    }
    Ok(())
}

/// When an overlay starts.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayStart {
    /// Fraction of the composed total duration, in `[0, 1]`.
    Fraction(f64),
    Seconds(f64),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayRequest {
    pub block: TextBlock,
    pub start: OverlayStart,
    /// Overrides the reading-speed estimate; never below the floor.
    #[serde(default)]
    pub duration_sec: Option<f64>,
}

impl OverlayRequest {
    pub fn new(block: TextBlock, start: OverlayStart) -> Self {
        Self {
            block,
            start,
            duration_sec: None,
        }
    }

    pub fn with_duration(mut self, duration_sec: f64) -> Self {
        self.duration_sec = Some(duration_sec);
        self
    }
}

/// A scheduled overlay. `start_sec + duration_sec` never exceeds the timeline total.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct OverlayEvent {
    pub block: TextBlock,
    pub layout: LayoutResult,
    pub start_sec: f64,
    pub duration_sec: f64,
}

impl OverlayEvent {
    pub fn end_sec(&self) -> f64 {
        self.start_sec + self.duration_sec
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AudioTrack {
    pub source: PathBuf,
    pub duration_sec: f64,
    #[serde(default = "unit_volume")]
    pub volume: f32,
    #[serde(default = "default_looped")]
    pub looped: bool,
}

fn unit_volume() -> f32 {
    1.0
}

fn default_looped() -> bool {
    true
}

impl AudioTrack {
    pub fn new(source: impl Into<PathBuf>, duration_sec: f64) -> Self {
        Self {
            source: source.into(),
            duration_sec,
            volume: 1.0,
            looped: true,
        }
    }
}

/// How the background track is laid under the timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct AudioPlan {
    pub source: PathBuf,
    pub source_duration_sec: f64,
    /// Whole copies concatenated before trimming.
    pub copies: u32,
    /// Audible length; equals the timeline total unless an unlooped track runs out.
    pub play_sec: f64,
    pub gain: f32,
    pub looped: bool,
}

/// Composed timeline. `min_duration_sec <= total_duration_sec <= max_duration_sec`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Timeline {
    pub segments: Vec<MediaSegment>,
    pub placements: Vec<SegmentPlacement>,
    pub min_duration_sec: f64,
    pub max_duration_sec: f64,
    pub total_duration_sec: f64,
    pub overlays: Vec<OverlayEvent>,
    pub audio: Option<AudioPlan>,
    pub notices: Vec<Notice>,
}

impl Timeline {
    pub fn segment_for(&self, placement: &SegmentPlacement) -> Option<&MediaSegment> {
        self.segments.get(placement.segment_index)
    }
}
