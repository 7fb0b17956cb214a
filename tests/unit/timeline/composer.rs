use super::*;
use crate::foundation::core::{Anchor, Rgb8};
use crate::foundation::error::ReelError;
use crate::text::font::FontSpec;
use crate::text::metrics::FixedAdvanceMetrics;

fn reel() -> Canvas {
    Canvas::new(1080, 1920, Rgb8::WHITE).unwrap()
}

fn caption(text: &str) -> TextBlock {
    TextBlock::new(text, FontSpec::new("Arial", 60.0), 980.0).with_anchor(Anchor::Bottom)
}

fn composer(metrics: &mut FixedAdvanceMetrics) -> TimelineComposer<'_> {
    TimelineComposer::new(metrics, FitConfig::default(), TimelineConfig::default(), reel())
}

#[test]
fn two_eight_second_clips_fit_fifteen_to_twenty() {
    let mut m = FixedAdvanceMetrics::default();
    let mut c = composer(&mut m);
    let segs = vec![
        MediaSegment::video("a", "a.mp4", 8.0),
        MediaSegment::video("b", "b.mp4", 8.0),
    ];
    let t = c.compose(&segs, 15.0, 20.0, &[], None).unwrap();
    assert!(t.total_duration_sec >= 15.0 && t.total_duration_sec <= 20.0);
    assert_eq!(t.placements.len(), 2);
    assert!(t.placements[0].timeline_end_sec() <= t.placements[1].timeline_start_sec + 1e-9);
    assert_eq!(t.placements[0].segment_index, 0);
    assert_eq!(t.placements[1].segment_index, 1);
}

#[test]
fn total_duration_respects_bounds_for_many_inputs() {
    let mut m = FixedAdvanceMetrics::default();
    let mut c = composer(&mut m);
    let cases: &[(&[f64], f64, f64)] = &[
        (&[1.0], 15.0, 90.0),
        (&[0.4, 0.7], 15.0, 20.0),
        (&[30.0; 12], 15.0, 90.0),
        (&[5.0, 6.0, 7.0], 30.0, 30.0),
        (&[100.0], 1.0, 3.0),
        (&[2.0, 2.0, 2.0, 2.0], 5.0, 60.0),
    ];
    for (durations, min, max) in cases {
        let segs: Vec<MediaSegment> = durations
            .iter()
            .enumerate()
            .map(|(i, d)| MediaSegment::video(format!("{i}"), format!("{i}.mp4"), *d))
            .collect();
        let t = c.compose(&segs, *min, *max, &[], None).unwrap();
        assert!(
            t.total_duration_sec >= *min - 1e-9 && t.total_duration_sec <= *max + 1e-9,
            "{durations:?} in [{min}, {max}] gave {}",
            t.total_duration_sec
        );
        let end = t.placements.last().unwrap().timeline_end_sec();
        assert!((end - t.total_duration_sec).abs() < 1e-6);
        for pair in t.placements.windows(2) {
            assert!(pair[0].timeline_end_sec() <= pair[1].timeline_start_sec + 1e-9);
        }
    }
}

#[test]
fn overlays_stay_inside_the_timeline() {
    let mut m = FixedAdvanceMetrics::default();
    let mut c = composer(&mut m);
    let segs = vec![MediaSegment::video("a", "a.mp4", 9.0), MediaSegment::video("b", "b.mp4", 9.0)];
    let long = "Kombucha is a fermented tea drink that has been enjoyed for thousands of years \
                and is packed with probiotics, organic acids and antioxidants.";
    let overlays = vec![
        c.intro(caption("Let food be thy medicine.")),
        c.closing(caption(long)),
        OverlayRequest::new(caption(long), OverlayStart::Fraction(0.95)),
    ];
    let t = c.compose(&segs, 15.0, 18.0, &overlays, None).unwrap();
    assert_eq!(t.overlays.len(), 3);
    for ev in &t.overlays {
        assert!(ev.end_sec() <= t.total_duration_sec + 1e-9, "{ev:?}");
        assert!(ev.duration_sec >= 2.5 - 1e-9);
        assert!(!ev.layout.is_empty());
    }
    assert!((t.overlays[0].start_sec - 0.1 * t.total_duration_sec).abs() < 1e-9);
    assert!(t.overlays[1].layout.line_count() > 1);
}

#[test]
fn music_is_planned_against_the_total() {
    let mut m = FixedAdvanceMetrics::default();
    let mut c = composer(&mut m);
    let segs = vec![MediaSegment::video("a", "a.mp4", 8.0), MediaSegment::video("b", "b.mp4", 8.0)];
    let track = AudioTrack::new("music.mp3", 5.0);
    let t = c.compose(&segs, 15.0, 20.0, &[], Some(&track)).unwrap();
    let plan = t.audio.unwrap();
    assert_eq!(plan.play_sec, t.total_duration_sec);
    assert_eq!(plan.copies, 4);
    assert!((plan.gain - 0.3).abs() < 1e-6);
}

#[test]
fn usage_errors_are_raised() {
    let mut m = FixedAdvanceMetrics::default();
    let mut c = composer(&mut m);
    let err = c.compose(&[], 15.0, 90.0, &[], None).unwrap_err();
    assert!(matches!(err, ReelError::EmptyInput(_)));

    let segs = vec![MediaSegment::video("a", "a.mp4", 8.0)];
    for (min, max) in [(20.0, 10.0), (0.0, 10.0), (f64::NAN, 10.0)] {
        let err = c.compose(&segs, min, max, &[], None).unwrap_err();
        assert!(matches!(err, ReelError::InvalidBounds(_)), "{min}/{max}: {err}");
    }

    let mut tight = TimelineConfig::default();
    tight.reading.floor_sec = 5.0;
    tight.reading.ceiling_sec = 12.0;
    let mut m2 = FixedAdvanceMetrics::default();
    let mut c2 = TimelineComposer::new(&mut m2, FitConfig::default(), tight, reel());
    let overlays = vec![OverlayRequest::new(caption("hi"), OverlayStart::Seconds(0.0))];
    let err = c2.compose(&segs, 2.0, 3.0, &overlays, None).unwrap_err();
    assert!(matches!(err, ReelError::OverlayTooLong { .. }));
}

#[test]
fn timeline_serializes_for_plan_output() {
    let mut m = FixedAdvanceMetrics::default();
    let mut c = composer(&mut m);
    let segs = vec![MediaSegment::image("still", "still.png")];
    let t = c
        .compose(&segs, 15.0, 20.0, &[stay_fresh_intro()], Some(&AudioTrack::new("m.mp3", 30.0)))
        .unwrap();
    let json = serde_json::to_value(&t).unwrap();
    assert_eq!(json["total_duration_sec"], 15.0);
    assert_eq!(json["placements"].as_array().unwrap().len(), 2);
    assert_eq!(json["segments"][0]["kind"], "image");
    assert!(json["overlays"][0]["layout"]["lines"].is_array());
}

fn stay_fresh_intro() -> OverlayRequest {
    OverlayRequest::new(caption("Stay fresh."), OverlayStart::Fraction(0.1))
}
