use super::*;
use crate::rotation::history::{OutputKind, OutputRecord};
use rand::{SeedableRng, rngs::StdRng};

fn used(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| (*s).to_owned()).collect()
}

#[test]
fn fully_used_pool_falls_back_and_flags_exhaustion() {
    let pool = ["A", "B", "C"];
    let mut rng = StdRng::seed_from_u64(7);
    let s = select_unused(&pool, &used(&["A", "B", "C"]), &mut rng).unwrap();
    assert!(pool.contains(s.item));
    assert!(s.exhausted);
    assert_eq!(s.notice(), Some(Notice::PoolExhausted { pool_size: 3 }));
}

#[test]
fn never_returns_a_used_id_while_fresh_ones_remain() {
    let pool: Vec<String> = (0..10).map(|i| format!("img_{i}.jpg")).collect();
    let taken = used(&["img_0.jpg", "img_3.jpg", "img_4.jpg", "img_9.jpg"]);
    for seed in 0..64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let s = select_unused(&pool, &taken, &mut rng).unwrap();
        assert!(!taken.contains(s.item.as_str()), "seed {seed} picked {}", s.item);
        assert!(!s.exhausted);
        assert_eq!(s.notice(), None);
    }
}

#[test]
fn only_remaining_candidate_is_always_chosen() {
    let pool = ["A", "B", "C"];
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..20 {
        let s = select_unused(&pool, &used(&["A", "C"]), &mut rng).unwrap();
        assert_eq!(*s.item, "B");
    }
}

#[test]
fn empty_pool_is_empty_input() {
    let pool: [&str; 0] = [];
    let mut rng = StdRng::seed_from_u64(0);
    let err = select_unused(&pool, &BTreeSet::new(), &mut rng).unwrap_err();
    assert!(matches!(err, ReelError::EmptyInput(_)));
    let err = select_many(&pool, &BTreeSet::new(), 2, &mut rng).unwrap_err();
    assert!(matches!(err, ReelError::EmptyInput(_)));
}

#[test]
fn select_many_prefers_fresh_then_cycles() {
    let pool = ["a", "b", "c"];
    let mut rng = StdRng::seed_from_u64(3);

    let s = select_many(&pool, &used(&["a"]), 2, &mut rng).unwrap();
    assert!(!s.exhausted);
    let mut got: Vec<&str> = s.item.iter().map(|x| **x).collect();
    got.sort_unstable();
    assert_eq!(got, ["b", "c"]);

    let s = select_many(&pool, &used(&["a"]), 5, &mut rng).unwrap();
    assert!(s.exhausted);
    assert_eq!(s.item.len(), 5);
    assert_eq!(*s.item[3], *s.item[0]);
    assert_eq!(*s.item[4], *s.item[1]);
    assert_eq!(*s.item[2], "a");
}

#[test]
fn paths_are_compared_by_their_string_form() {
    let pool = vec![PathBuf::from("media/a.mp4"), PathBuf::from("media/b.mp4")];
    let mut ledger = RotationLedger::new();
    ledger.record(AssetCategory::Video, "media/a.mp4");
    let mut rng = StdRng::seed_from_u64(11);
    let s = ledger.select(AssetCategory::Video, &pool, &mut rng).unwrap();
    assert_eq!(s.item, &PathBuf::from("media/b.mp4"));
}

#[test]
fn ledger_is_rebuilt_from_records_per_category() {
    let mut feed = OutputRecord::new("gut_health", OutputKind::Feed);
    feed.image_source = Some("img/one.jpg".into());
    feed.quote = Some("Let food be thy medicine".into());
    let mut reel = OutputRecord::new("gut_health", OutputKind::Reel);
    reel.video_sources = vec!["v/1.mp4".into(), "v/2.mp4".into()];
    reel.music_source = Some("m/calm.mp3".into());

    let ledger = RotationLedger::from_records([&feed, &reel]);
    assert_eq!(ledger.len(), 5);
    assert!(ledger.is_used(AssetCategory::Image, "img/one.jpg"));
    assert!(ledger.is_used(AssetCategory::Video, "v/2.mp4"));
    assert!(ledger.is_used(AssetCategory::Music, "m/calm.mp3"));
    assert!(!ledger.is_used(AssetCategory::Image, "v/1.mp4"));
    assert!(ledger.used(AssetCategory::HealthBenefit).is_empty());
}

#[test]
fn categories_parse_loosely() {
    assert_eq!("images".parse::<AssetCategory>().unwrap(), AssetCategory::Image);
    assert_eq!(
        "health-benefit".parse::<AssetCategory>().unwrap(),
        AssetCategory::HealthBenefit
    );
    assert_eq!(" Music ".parse::<AssetCategory>().unwrap(), AssetCategory::Music);
    assert!("sounds".parse::<AssetCategory>().is_err());
}
