use crate::{
    foundation::core::Canvas,
    foundation::error::ReelResult,
    text::fitter::{FitConfig, TextBlock, TextFitter},
    text::metrics::FontMetrics,
    timeline::allocate,
    timeline::audio,
    timeline::model::{
        AudioTrack, MediaSegment, OverlayEvent, OverlayRequest, OverlayStart, Timeline,
        TimelineConfig, validate_bounds,
    },
    timeline::overlay,
};

/// Places media segments, overlays and background audio on a bounded time axis.
pub struct TimelineComposer<'m> {
    metrics: &'m mut dyn FontMetrics,
    fit: FitConfig,
    config: TimelineConfig,
    canvas: Canvas,
}

impl<'m> TimelineComposer<'m> {
    /// `canvas` is the video frame; overlay text is fitted against it.
    pub fn new(
        metrics: &'m mut dyn FontMetrics,
        fit: FitConfig,
        config: TimelineConfig,
        canvas: Canvas,
    ) -> Self {
        Self {
            metrics,
            fit,
            config,
            canvas,
        }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Overlay starting at the configured introductory fraction.
    pub fn intro(&self, block: TextBlock) -> OverlayRequest {
        OverlayRequest::new(block, OverlayStart::Fraction(self.config.intro_fraction))
    }

    /// Overlay starting at the configured closing fraction.
    pub fn closing(&self, block: TextBlock) -> OverlayRequest {
        OverlayRequest::new(block, OverlayStart::Fraction(self.config.closing_fraction))
    }

    #[tracing::instrument(
        skip(self, segments, overlays, audio),
        fields(segments = segments.len(), overlays = overlays.len())
    )]
    pub fn compose(
        &mut self,
        segments: &[MediaSegment],
        min_sec: f64,
        max_sec: f64,
        overlays: &[OverlayRequest],
        audio: Option<&AudioTrack>,
    ) -> ReelResult<Timeline> {
        validate_bounds(min_sec, max_sec)?;

        let placements = allocate::allocate(segments, max_sec, self.config.segment_cap_sec)?;
        let placements = allocate::loop_to_min(placements, min_sec);
        let placements = allocate::trim_to(placements, max_sec);
        let total = allocate::total_sec(&placements).clamp(min_sec, max_sec);
        tracing::debug!(total, placements = placements.len(), "allocated segments");

        let mut notices = Vec::new();
        let mut events = Vec::with_capacity(overlays.len());
        for req in overlays {
            let layout = TextFitter::new(&mut *self.metrics, self.fit.clone())
                .layout_block(&req.block, self.canvas);
            let reading = &self.config.reading;
            let estimate = match req.duration_sec {
                Some(d) if d.is_finite() => d,
                _ => reading.duration_for(&req.block.text, layout.line_count()),
            };
            let (start_sec, duration_sec) =
                overlay::schedule(req.start, estimate, reading.floor_sec, total)?;
            tracing::debug!(start_sec, duration_sec, lines = layout.line_count(), "scheduled overlay");

            notices.extend(layout.notices.iter().cloned());
            events.push(OverlayEvent {
                block: req.block.clone(),
                layout,
                start_sec,
                duration_sec,
            });
        }

        let audio = audio
            .map(|track| audio::plan(track, total, self.config.attenuation))
            .transpose()?;

        Ok(Timeline {
            segments: segments.to_vec(),
            placements,
            min_duration_sec: min_sec,
            max_duration_sec: max_sec,
            total_duration_sec: total,
            overlays: events,
            audio,
            notices,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/composer.rs"]
mod tests;
