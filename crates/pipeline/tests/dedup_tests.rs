use chatter_core::post::entity::{NormalizedPost, RawPost};
use chatter_core::testing::post;
use chatter_pipeline::dedup::{deduplicate, deduplicate_cleaned};
use chatter_pipeline::normalizer::normalize;
use std::collections::HashSet;

fn normalized(raw: RawPost) -> NormalizedPost {
    normalize(raw).unwrap()
}

fn with_awards(mut raw: RawPost, awards: i64) -> RawPost {
    raw.total_awards_received = Some(awards);
    raw
}

fn sample_stream() -> Vec<NormalizedPost> {
    vec![
        normalized(with_awards(post("d2", "Hold the line", "carol", 3_000, 10, 4), 1)),
        normalized(post("s1", "Just bought", "dave", 1_500, 7, 0)),
        normalized(with_awards(post("d1", "Hold the line", "carol", 2_000, 1, 1), 2)),
        normalized(post("s2", "hold the line", "carol", 2_500, 2, 2)),
        normalized(with_awards(post("d3", "Hold the line", "carol", 4_000, 4, 0), 3)),
        normalized(post("e1", "Hello", "erin", 1_000, 3, 3)),
        normalized(post("e2", "Hello", "frank", 1_200, 3, 3)),
    ]
}

/// # Summary
/// 基本场景：同一作者同一标题的两条帖子合并为一条。
///
/// # Logic
/// 1. ("Hello", "alice", 5 分, 2 评论, t1) 与 ("Hello", "alice", 3 分, 1 评论, t2 > t1)。
/// 2. 断言结果为一条，分数 8，评论 3，时间为 t1。
#[test]
fn test_duplicates_collapse_onto_earliest() {
    let posts = vec![
        normalized(post("first", "Hello", "alice", 1_000, 5, 2)),
        normalized(post("second", "Hello", "alice", 2_000, 3, 1)),
    ];

    let cleaned = deduplicate(&posts);

    assert_eq!(cleaned.len(), 1);
    let only = &cleaned[0];
    assert_eq!(only.post.raw.score, Some(8));
    assert_eq!(only.post.raw.num_comments, Some(3));
    assert_eq!(only.post.date, posts[0].date);
    assert_eq!(only.post.raw.id.as_deref(), Some("first"));
    assert_eq!(only.group_size, 2);
}

#[test]
fn test_representative_is_earliest_even_when_listed_later() {
    let cleaned = deduplicate(&sample_stream());

    let group = cleaned
        .iter()
        .find(|p| p.post.raw.title.as_deref() == Some("Hold the line") && p.is_aggregated())
        .unwrap();
    assert_eq!(group.post.raw.id.as_deref(), Some("d1"));
    assert_eq!(group.post.raw.score, Some(15));
    assert_eq!(group.post.raw.num_comments, Some(5));
    assert_eq!(group.post.raw.total_awards_received, Some(6));
    assert_eq!(group.group_size, 3);
}

#[test]
fn test_key_is_case_sensitive_and_author_scoped() {
    let cleaned = deduplicate(&sample_stream());

    // "hold the line" 与 "Hold the line" 不合并，不同作者的 "Hello" 也不合并
    assert_eq!(cleaned.len(), 5);
    let singles: Vec<&str> = cleaned
        .iter()
        .filter(|p| !p.is_aggregated())
        .filter_map(|p| p.post.raw.id.as_deref())
        .collect();
    assert_eq!(singles, vec!["e1", "e2", "s1", "s2"]);
}

#[test]
fn test_tie_on_date_keeps_first_in_input_order() {
    let posts = vec![
        normalized(post("x", "Same", "zed", 1_000, 1, 0)),
        normalized(post("y", "Same", "zed", 1_000, 2, 0)),
    ];

    let cleaned = deduplicate(&posts);

    assert_eq!(cleaned.len(), 1);
    assert_eq!(cleaned[0].post.raw.id.as_deref(), Some("x"));
    assert_eq!(cleaned[0].post.raw.score, Some(3));
}

#[test]
fn test_aggregation_conserves_totals() {
    let input = sample_stream();
    let cleaned = deduplicate(&input);

    let total = |f: fn(&RawPost) -> Option<i64>, posts: Vec<&RawPost>| -> i64 {
        posts.into_iter().map(|p| f(p).unwrap_or(0)).sum()
    };
    let before: Vec<&RawPost> = input.iter().map(|p| &p.raw).collect();
    let after: Vec<&RawPost> = cleaned.iter().map(|p| &p.post.raw).collect();

    assert_eq!(total(|p| p.score, before.clone()), total(|p| p.score, after.clone()));
    assert_eq!(
        total(|p| p.num_comments, before.clone()),
        total(|p| p.num_comments, after.clone())
    );
    assert_eq!(
        total(|p| p.total_awards_received, before),
        total(|p| p.total_awards_received, after)
    );
}

#[test]
fn test_partition_and_unique_keys() {
    let input = sample_stream();
    let cleaned = deduplicate(&input);

    let contributions: usize = cleaned.iter().map(|p| p.group_size).sum();
    assert_eq!(contributions, input.len());

    let keys: HashSet<_> = cleaned.iter().map(|p| p.key()).collect();
    assert_eq!(keys.len(), cleaned.len());
}

#[test]
fn test_output_sorted_by_date() {
    let cleaned = deduplicate(&sample_stream());
    assert!(cleaned.windows(2).all(|w| w[0].post.date <= w[1].post.date));
}

#[test]
fn test_deduplicate_is_idempotent() {
    let once = deduplicate(&sample_stream());
    let twice = deduplicate_cleaned(&once);
    assert_eq!(once, twice);
}

#[test]
fn test_missing_numbers_count_as_zero() {
    let mut blank = post("b", "Null score", "gina", 2_000, 0, 0);
    blank.score = None;
    blank.num_comments = None;
    let posts = vec![
        normalized(post("a", "Null score", "gina", 1_000, 4, 1)),
        normalized(blank),
    ];

    let cleaned = deduplicate(&posts);

    assert_eq!(cleaned[0].post.raw.score, Some(4));
    assert_eq!(cleaned[0].post.raw.num_comments, Some(1));
}

#[test]
fn test_singletons_pass_through_unchanged() {
    let mut lonely = post("l", "Alone", "hank", 1_000, 0, 0);
    lonely.score = None;
    let posts = vec![normalized(lonely)];

    let cleaned = deduplicate(&posts);

    assert_eq!(cleaned[0].post, posts[0]);
    assert_eq!(cleaned[0].group_size, 1);
    assert!(deduplicate(&[]).is_empty());
}
