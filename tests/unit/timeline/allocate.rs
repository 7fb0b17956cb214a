use super::*;

fn clips(durations: &[f64]) -> Vec<MediaSegment> {
    durations
        .iter()
        .enumerate()
        .map(|(i, d)| MediaSegment::video(format!("clip{i}"), format!("clip{i}.mp4"), *d))
        .collect()
}

fn assert_contiguous(p: &[SegmentPlacement]) {
    let mut cursor = 0.0;
    for placement in p {
        assert!((placement.timeline_start_sec - cursor).abs() < 1e-9, "{p:?}");
        assert!(placement.duration_sec > 0.0);
        cursor = placement.timeline_end_sec();
    }
}

#[test]
fn empty_segments_are_a_usage_error() {
    let err = allocate(&[], 90.0, 10.0).unwrap_err();
    assert!(matches!(err, ReelError::EmptyInput(_)));
}

#[test]
fn even_share_is_capped_per_segment() {
    let p = allocate(&clips(&[30.0, 30.0, 30.0]), 90.0, 10.0).unwrap();
    let d: Vec<f64> = p.iter().map(|p| p.duration_sec).collect();
    assert_eq!(d, vec![10.0, 10.0, 10.0]);
    assert_contiguous(&p);
}

#[test]
fn short_segments_leave_budget_for_later_ones() {
    // 20s budget: 20/3 each, but the first clip only has 2s.
    let p = allocate(&clips(&[2.0, 30.0, 30.0]), 20.0, 10.0).unwrap();
    assert_eq!(p[0].duration_sec, 2.0);
    assert!((p[1].duration_sec - 9.0).abs() < 1e-9);
    assert!((p[2].duration_sec - 9.0).abs() < 1e-9);
    assert!((total_sec(&p) - 20.0).abs() < 1e-9);
}

#[test]
fn unplayable_segments_are_skipped() {
    let mut segs = clips(&[0.0, 5.0]);
    segs.push(MediaSegment::image("still", "still.png"));
    let p = allocate(&segs, 90.0, 10.0).unwrap();
    assert_eq!(p.len(), 2);
    assert_eq!(p[0].segment_index, 1);
    assert_eq!(p[1].segment_index, 2);
    assert_eq!(p[1].duration_sec, 10.0);

    let err = allocate(&clips(&[0.0, 0.0]), 90.0, 10.0).unwrap_err();
    assert!(matches!(err, ReelError::EmptyInput(_)));
}

#[test]
fn trim_window_limits_and_offsets_source() {
    let seg = MediaSegment::video("c", "c.mp4", 60.0).with_trim(20.0, 4.0);
    let p = allocate(&[seg], 90.0, 10.0).unwrap();
    assert_eq!(p[0].duration_sec, 4.0);
    assert_eq!(p[0].source_start_sec, 20.0);
}

#[test]
fn loop_to_min_repeats_whole_units_then_cuts() {
    let p = allocate(&clips(&[3.0, 4.0]), 90.0, 10.0).unwrap();
    let looped = loop_to_min(p, 15.0);
    assert!((total_sec(&looped) - 15.0).abs() < 1e-9);
    assert_contiguous(&looped);
    // 7s unit: two full passes plus 1s of the third.
    assert_eq!(looped.len(), 5);
    assert_eq!(looped[4].loop_index, 2);
    assert_eq!(looped[4].segment_index, 0);
    assert!((looped[4].duration_sec - 1.0).abs() < 1e-9);
}

#[test]
fn loop_to_min_is_identity_when_long_enough() {
    let p = allocate(&clips(&[8.0, 8.0]), 20.0, 10.0).unwrap();
    assert_eq!(loop_to_min(p.clone(), 15.0), p);
}

#[test]
fn trim_to_cuts_from_the_start() {
    let p = allocate(&clips(&[10.0, 10.0, 10.0]), 90.0, 10.0).unwrap();
    let cut = trim_to(p, 15.0);
    assert_eq!(cut.len(), 2);
    assert_eq!(cut[1].duration_sec, 5.0);
    assert_eq!(total_sec(&cut), 15.0);
}
