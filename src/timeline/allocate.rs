use crate::{
    foundation::error::{ReelError, ReelResult},
    foundation::math::TIME_EPSILON,
    timeline::model::{MediaSegment, SegmentPlacement},
};

/// Spread the `max_sec` budget over the segments in order.
///
/// Each segment takes `min(remaining / remaining_count, cap, playable)`. Segments with
/// no playable time are skipped. Placements are contiguous from zero.
pub fn allocate(
    segments: &[MediaSegment],
    max_sec: f64,
    cap_sec: f64,
) -> ReelResult<Vec<SegmentPlacement>> {
    if segments.is_empty() {
        return Err(ReelError::empty_input("timeline needs at least one segment"));
    }

    let mut placements = Vec::with_capacity(segments.len());
    let mut cursor = 0.0;

    for (i, seg) in segments.iter().enumerate() {
        let remaining = max_sec - cursor;
        if remaining <= TIME_EPSILON {
            tracing::debug!(index = i, "budget spent, dropping remaining segments");
            break;
        }
        let share = remaining / (segments.len() - i) as f64;
        let available = seg.playable_sec();
        let d = share.min(cap_sec).min(available);
        if d <= TIME_EPSILON {
            tracing::warn!(id = %seg.id, available, "segment has no playable duration, skipping");
            continue;
        }

        placements.push(SegmentPlacement {
            segment_index: i,
            loop_index: 0,
            source_start_sec: seg.source_start_sec(),
            timeline_start_sec: cursor,
            duration_sec: d,
        });
        cursor += d;
    }

    if placements.is_empty() {
        return Err(ReelError::empty_input(
            "no segment has a playable duration",
        ));
    }
    Ok(placements)
}

pub fn total_sec(placements: &[SegmentPlacement]) -> f64 {
    placements.last().map_or(0.0, SegmentPlacement::timeline_end_sec)
}

/// Repeat the sequence as whole units until it reaches `min_sec`, then cut to exactly `min_sec`.
pub fn loop_to_min(placements: Vec<SegmentPlacement>, min_sec: f64) -> Vec<SegmentPlacement> {
    let unit = total_sec(&placements);
    if unit <= 0.0 || unit + TIME_EPSILON >= min_sec {
        return placements;
    }

    let copies = (min_sec / unit).ceil() as u32;
    let mut out = Vec::with_capacity(placements.len() * copies as usize);
    for loop_index in 0..copies {
        let offset = unit * f64::from(loop_index);
        out.extend(placements.iter().map(|p| SegmentPlacement {
            loop_index,
            timeline_start_sec: p.timeline_start_sec + offset,
            ..*p
        }));
    }
    tracing::debug!(unit, copies, min_sec, "looping sequence to minimum duration");
    trim_to(out, min_sec)
}

/// Cut the sequence at `limit_sec` from the start.
pub fn trim_to(placements: Vec<SegmentPlacement>, limit_sec: f64) -> Vec<SegmentPlacement> {
    let mut out = Vec::with_capacity(placements.len());
    for mut p in placements {
        if p.timeline_start_sec + TIME_EPSILON >= limit_sec {
            break;
        }
        if p.timeline_end_sec() > limit_sec {
            p.duration_sec = limit_sec - p.timeline_start_sec;
        }
        out.push(p);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/allocate.rs"]
mod tests;
