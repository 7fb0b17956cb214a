//! reelsmith lays out branded text and media for social feed posts and short vertical reels.
//!
//! Layout is separated from pixels and from IO: text is fitted against a metrics provider,
//! timelines are plain data, and rendering or encoding happens last.
//!
//! # Pipeline overview
//!
//! 1. **Fit**: `text + FontSpec + width -> LayoutResult` ([`TextFitter`]), never wider than the limit
//! 2. **Compose stills**: `image + TextBlock -> Frame` ([`CanvasComposer`]) for posts and quote cards
//! 3. **Compose reels**: `segments + bounds + overlays + music -> Timeline` ([`TimelineComposer`])
//! 4. **Rotate**: pick assets not used by earlier outputs ([`RotationLedger`], fed by [`load_history`])
//! 5. **Output**: PNG/JPEG stills, or an MP4 through the system `ffmpeg` binary ([`encode`])
//!
//! Fonts resolve through [`FontLibrary`]: registered files first, then the installed system
//! fonts, so a requested family always lands on a concrete face when any font is available.
//! Frames are premultiplied RGBA8 throughout. `unsafe` is forbidden in this crate.
#![forbid(unsafe_code)]

pub mod canvas;
pub mod config;
pub mod content;
pub mod encode;
pub mod foundation;
pub mod media;
pub mod rotation;
pub mod text;
pub mod timeline;

pub use canvas::composer::{CanvasComposer, Composition};
pub use canvas::raster::Frame;
pub use config::settings::Settings;
pub use foundation::core::{Anchor, Canvas, Rgb8, Rgba8Premul};
pub use foundation::error::{Notice, ReelError, ReelResult};
pub use rotation::history::{OutputKind, OutputRecord, load_history};
pub use rotation::ledger::{AssetCategory, RotationLedger, Selection, select_unused};
pub use text::fitter::{FitConfig, LayoutResult, Line, TextBlock, TextFitter};
pub use text::font::{FontSpec, FontWeight, Stroke};
pub use text::library::FontLibrary;
pub use text::metrics::{FixedAdvanceMetrics, FontMetrics, TextExtent};
pub use timeline::composer::TimelineComposer;
pub use timeline::model::{
    AudioTrack, MediaKind, MediaSegment, OverlayEvent, OverlayRequest, OverlayStart, Timeline,
    TimelineConfig,
};
