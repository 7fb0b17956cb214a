use crate::{
    foundation::error::{ReelError, ReelResult},
    foundation::math::TIME_EPSILON,
    timeline::model::OverlayStart,
};

/// Window `(start, duration)` for an overlay on a timeline of `total_sec`.
///
/// The start resolves against the total and is clamped into it. A window running past
/// the end is shortened; if that leaves less than `floor_sec` the window keeps the floor
/// and is moved back to end on the final frame.
pub fn schedule(
    start: OverlayStart,
    duration_sec: f64,
    floor_sec: f64,
    total_sec: f64,
) -> ReelResult<(f64, f64)> {
    if floor_sec > total_sec + TIME_EPSILON {
        return Err(ReelError::OverlayTooLong {
            floor_sec,
            timeline_sec: total_sec,
        });
    }

    let start_sec = match start {
        OverlayStart::Fraction(f) if f.is_finite() => f.clamp(0.0, 1.0) * total_sec,
        OverlayStart::Seconds(s) if s.is_finite() => s.clamp(0.0, total_sec),
        _ => {
            return Err(ReelError::validation("overlay start must be finite"));
        }
    };

    let mut duration = duration_sec.max(floor_sec);
    let mut start_sec = start_sec;
    if start_sec + duration > total_sec {
        duration = total_sec - start_sec;
        if duration < floor_sec {
            tracing::debug!(start_sec, floor_sec, "overlay shifted back to keep its floor");
            duration = floor_sec;
            start_sec = (total_sec - floor_sec).max(0.0);
        }
    }
    Ok((start_sec, duration.min(total_sec - start_sec)))
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/overlay.rs"]
mod tests;
