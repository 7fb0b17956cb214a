use crate::{
    foundation::error::{ReelError, ReelResult},
    foundation::math::TIME_EPSILON,
    timeline::model::{AudioPlan, AudioTrack},
};

/// Loop or trim `track` to cover `total_sec`, attenuated to sit under the picture.
pub fn plan(track: &AudioTrack, total_sec: f64, attenuation: f32) -> ReelResult<AudioPlan> {
    if !track.duration_sec.is_finite() || track.duration_sec <= 0.0 {
        return Err(ReelError::validation(format!(
            "audio '{}' has no usable duration",
            track.source.display()
        )));
    }
    if !track.volume.is_finite() || track.volume < 0.0 {
        return Err(ReelError::validation("audio volume must be >= 0"));
    }

    let (copies, play_sec) = if track.duration_sec + TIME_EPSILON >= total_sec {
        (1, total_sec)
    } else if track.looped {
        ((total_sec / track.duration_sec).ceil() as u32, total_sec)
    } else {
        (1, track.duration_sec)
    };

    Ok(AudioPlan {
        source: track.source.clone(),
        source_duration_sec: track.duration_sec,
        copies,
        play_sec,
        gain: track.volume * attenuation,
        looped: track.looped,
    })
}

/// Interleaved PCM repeated back to back (no crossfade) and cut to `frames` frames.
pub fn loop_pcm(samples: &[f32], channels: u16, frames: usize) -> Vec<f32> {
    let channels = usize::from(channels.max(1));
    let want = frames * channels;
    let usable = samples.len() - samples.len() % channels;
    if usable == 0 {
        return vec![0.0; want];
    }
    samples[..usable].iter().copied().cycle().take(want).collect()
}

/// Frame count for `secs` at `sample_rate`, rounded to the nearest frame.
pub fn frames_for(secs: f64, sample_rate: u32) -> usize {
    (secs.max(0.0) * f64::from(sample_rate)).round() as usize
}

pub fn apply_gain(samples: &mut [f32], gain: f32) {
    for s in samples {
        *s *= gain;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/audio.rs"]
mod tests;
