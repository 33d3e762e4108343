use chatter_core::post::entity::RawPost;
use chatter_core::post::error::MalformedRecordError;
use chatter_core::testing::post;
use chatter_pipeline::normalizer::{normalize, normalize_all};
use chrono::{TimeZone, Utc};

#[test]
fn test_normalize_derives_time_columns() {
    // 2021-01-28 14:30:00 UTC
    let normalized = normalize(post("a", "GME", "alice", 1_611_844_200, 5, 2)).unwrap();

    assert_eq!(normalized.date, Utc.with_ymd_and_hms(2021, 1, 28, 14, 30, 0).unwrap());
    assert_eq!(normalized.date_hour, Utc.with_ymd_and_hms(2021, 1, 28, 15, 0, 0).unwrap());
    assert_eq!(normalized.date_day, Utc.with_ymd_and_hms(2021, 1, 28, 0, 0, 0).unwrap());
    assert_eq!(normalized.raw.title.as_deref(), Some("GME"));
}

#[test]
fn test_normalize_rejects_missing_timestamp() {
    let raw = RawPost {
        id: Some("x".to_string()),
        ..RawPost::default()
    };

    assert_eq!(
        normalize(raw).unwrap_err(),
        MalformedRecordError::MissingTimestamp {
            id: Some("x".to_string())
        }
    );
}

#[test]
fn test_normalize_rejects_out_of_range_timestamp() {
    let raw = RawPost {
        created_utc: Some(i64::MAX),
        ..RawPost::default()
    };

    assert!(matches!(
        normalize(raw),
        Err(MalformedRecordError::InvalidTimestamp { value: i64::MAX, .. })
    ));
}

/// # Summary
/// 批量归一化时排除坏记录并按时间排序，而不是中止整个批次。
#[test]
fn test_normalize_all_excludes_malformed_and_sorts() {
    let batch = vec![
        post("late", "b", "bob", 2_000, 1, 1),
        RawPost::default(),
        post("early", "a", "alice", 1_000, 1, 1),
    ];

    let normalized = normalize_all(batch);

    let ids: Vec<&str> = normalized.iter().filter_map(|p| p.raw.id.as_deref()).collect();
    assert_eq!(ids, vec!["early", "late"]);
}
