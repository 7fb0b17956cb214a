use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::empty_input("x")
            .to_string()
            .contains("empty input:")
    );
    assert!(
        ReelError::invalid_bounds("x")
            .to_string()
            .contains("invalid duration bounds:")
    );
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ReelError::media("x").to_string().contains("media error:"));
    let too_long = ReelError::OverlayTooLong {
        floor_sec: 3.0,
        timeline_sec: 2.0,
    };
    assert!(too_long.to_string().contains("3.00s"));
}

#[test]
fn usage_errors_are_classified() {
    assert!(ReelError::empty_input("x").is_usage_error());
    assert!(ReelError::invalid_bounds("x").is_usage_error());
    assert!(!ReelError::media("x").is_usage_error());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn notices_serialize_with_kind_tag() {
    let n = Notice::PoolExhausted { pool_size: 3 };
    let v = serde_json::to_value(&n).unwrap();
    assert_eq!(v["kind"], "pool_exhausted");
    assert_eq!(v["pool_size"], 3);
}
