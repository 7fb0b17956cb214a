use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use crate::{
    canvas::composer::CanvasComposer,
    encode::still::{ensure_parent_dir, save_frame},
    foundation::core::Canvas,
    foundation::error::{ReelError, ReelResult},
    timeline::model::{MediaKind, Timeline},
};

#[derive(Clone, Debug, PartialEq)]
pub struct VideoEncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub video_bitrate: String,
    pub out_path: PathBuf,
    pub overwrite: bool,
}

impl VideoEncodeConfig {
    pub fn new(out_path: impl Into<PathBuf>, width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            fps,
            video_bitrate: "8000k".to_owned(),
            out_path: out_path.into(),
            overwrite: true,
        }
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ReelError::validation("encode width/height must be non-zero"));
        }
        if self.fps == 0 {
            return Err(ReelError::validation("encode fps must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "encode width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if self.video_bitrate.trim().is_empty() {
            return Err(ReelError::validation("video bitrate must not be empty"));
        }
        Ok(())
    }
}

/// A pre-rendered transparent overlay shown during `[start_sec, end_sec]`.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayImage {
    pub path: PathBuf,
    pub start_sec: f64,
    pub end_sec: f64,
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Rasterize every scheduled overlay of `timeline` into `dir` as full-frame PNGs.
pub fn render_overlays(
    composer: &mut CanvasComposer<'_>,
    timeline: &Timeline,
    canvas: Canvas,
    dir: &Path,
) -> ReelResult<Vec<OverlayImage>> {
    let mut out = Vec::with_capacity(timeline.overlays.len());
    for (i, event) in timeline.overlays.iter().enumerate() {
        let frame = composer.render_overlay(&event.layout, &event.block, canvas)?;
        let path = dir.join(format!("overlay_{i:02}.png"));
        save_frame(&frame, &path)?;
        out.push(OverlayImage {
            path,
            start_sec: event.start_sec,
            end_sec: event.end_sec(),
        });
    }
    Ok(out)
}

fn secs(v: f64) -> String {
    format!("{v:.3}")
}

/// Full `ffmpeg` argument list that renders `timeline` to `cfg.out_path`.
///
/// Inputs are one per placement, then one per overlay image, then the music track.
/// Each placement is scaled to cover the frame, center-cropped and cut to its slot;
/// the slots are concatenated and the overlays are enabled by time window.
pub fn build_args(
    timeline: &Timeline,
    overlays: &[OverlayImage],
    cfg: &VideoEncodeConfig,
) -> ReelResult<Vec<OsString>> {
    cfg.validate()?;
    if timeline.placements.is_empty() {
        return Err(ReelError::empty_input("timeline has no placements to encode"));
    }

    let overwrite = if cfg.overwrite { "-y" } else { "-n" };
    let mut args: Vec<OsString> = vec![overwrite.into(), "-loglevel".into(), "error".into()];

    for p in &timeline.placements {
        let seg = timeline.segment_for(p).ok_or_else(|| {
            ReelError::validation(format!("placement refers to missing segment {}", p.segment_index))
        })?;
        match seg.kind {
            MediaKind::Video => {
                args.extend(["-ss".into(), secs(p.source_start_sec).into()]);
            }
            MediaKind::Image => {
                args.extend(["-loop".into(), "1".into()]);
            }
        }
        args.extend(["-t".into(), secs(p.duration_sec).into(), "-i".into()]);
        args.push(seg.source.clone().into_os_string());
    }

    let total = timeline.total_duration_sec;
    for o in overlays {
        args.extend(["-loop".into(), "1".into(), "-t".into(), secs(total).into(), "-i".into()]);
        args.push(o.path.clone().into_os_string());
    }

    if let Some(audio) = &timeline.audio {
        if audio.copies > 1 {
            args.extend(["-stream_loop".into(), "-1".into()]);
        }
        args.push("-i".into());
        args.push(audio.source.clone().into_os_string());
    }

    let (w, h, fps) = (cfg.width, cfg.height, cfg.fps);
    let n = timeline.placements.len();
    let mut graph = String::new();
    for (i, p) in timeline.placements.iter().enumerate() {
        graph.push_str(&format!(
            "[{i}:v]scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h},setsar=1,fps={fps},trim=duration={},setpts=PTS-STARTPTS[v{i}];",
            secs(p.duration_sec)
        ));
    }
    for i in 0..n {
        graph.push_str(&format!("[v{i}]"));
    }
    graph.push_str(&format!("concat=n={n}:v=1:a=0[base]"));

    let mut last = "base".to_owned();
    for (k, o) in overlays.iter().enumerate() {
        let label = format!("o{k}");
        graph.push_str(&format!(
            ";[{last}][{}:v]overlay=0:0:enable='between(t,{},{})'[{label}]",
            n + k,
            secs(o.start_sec),
            secs(o.end_sec)
        ));
        last = label;
    }

    let audio_input = n + overlays.len();
    if let Some(audio) = &timeline.audio {
        graph.push_str(&format!(
            ";[{audio_input}:a]atrim=0:{},asetpts=PTS-STARTPTS,volume={:.3}[aout]",
            secs(audio.play_sec),
            audio.gain
        ));
    }

    args.extend(["-filter_complex".into(), graph.into(), "-map".into()]);
    args.push(format!("[{last}]").into());
    if timeline.audio.is_some() {
        args.extend([
            "-map".into(),
            "[aout]".into(),
            "-c:a".into(),
            "aac".into(),
        ]);
    } else {
        args.push("-an".into());
    }
    args.extend(
        [
            "-c:v",
            "libx264",
            "-b:v",
            cfg.video_bitrate.as_str(),
            "-pix_fmt",
            "yuv420p",
            "-r",
        ]
        .map(OsString::from),
    );
    args.push(fps.to_string().into());
    args.extend(["-t".into(), secs(total).into(), "-movflags".into(), "+faststart".into()]);
    args.push(cfg.out_path.clone().into_os_string());
    Ok(args)
}

/// Run `ffmpeg` with `args`, surfacing its stderr on failure.
pub fn run(args: &[OsString]) -> ReelResult<()> {
    if !is_ffmpeg_on_path() {
        return Err(ReelError::media(
            "ffmpeg is required for MP4 encoding, but was not found on PATH",
        ));
    }
    tracing::debug!(args = args.len(), "spawning ffmpeg");
    let output = Command::new("ffmpeg")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| {
            ReelError::media(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ReelError::media(format!(
            "ffmpeg exited with status {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

/// Render overlays to a scratch directory and encode `timeline` as MP4.
#[tracing::instrument(skip_all, fields(out = %cfg.out_path.display(), total = timeline.total_duration_sec))]
pub fn encode_timeline(
    composer: &mut CanvasComposer<'_>,
    timeline: &Timeline,
    canvas: Canvas,
    cfg: &VideoEncodeConfig,
) -> ReelResult<()> {
    if !cfg.overwrite && cfg.out_path.exists() {
        return Err(ReelError::validation(format!(
            "output file '{}' already exists",
            cfg.out_path.display()
        )));
    }
    ensure_parent_dir(&cfg.out_path)?;
    let scratch = tempfile::tempdir()
        .map_err(|e| ReelError::media(format!("create overlay scratch dir: {e}")))?;
    let overlays = render_overlays(composer, timeline, canvas, scratch.path())?;
    let args = build_args(timeline, &overlays, cfg)?;
    run(&args)?;
    tracing::info!(path = %cfg.out_path.display(), "reel encoded");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
