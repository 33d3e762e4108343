use chatter_core::common::time::from_unix;
use chatter_core::post::entity::RawPost;
use chatter_core::post::error::{CollectError, FetchError};
use chatter_core::post::port::PostSource;
use chatter_core::testing::{ScriptedSource, post};
use chatter_feed::collector::{Collector, StopReason};
use chatter_feed::retry::RetryPolicy;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn at(secs: i64) -> DateTime<Utc> {
    from_unix(secs).unwrap()
}

fn page(times: &[i64]) -> Vec<RawPost> {
    times
        .iter()
        .map(|t| post(&format!("p{t}"), &format!("title {t}"), "author", *t, 1, 0))
        .collect()
}

fn collector(source: Arc<ScriptedSource>, attempts: u32) -> Collector {
    let source: Arc<dyn PostSource> = source;
    Collector::new(
        source,
        RetryPolicy::new(attempts, Duration::ZERO, Duration::ZERO, false),
    )
    .with_request_delay(Duration::ZERO)
}

/// # Summary
/// 向后分页直到游标越过窗口下界。
///
/// # Logic
/// 1. 四页数据，第三页起出现早于 `after` 的记录，第四页不再有窗口内记录。
/// 2. 断言游标严格递减，窗口外记录被排除，结果按时间升序。
#[tokio::test]
async fn test_collect_paginates_until_window_exhausted() {
    let source = Arc::new(ScriptedSource::with_pages(vec![
        page(&[900, 800, 700]),
        page(&[600, 500]),
        page(&[150, 90, 50]),
        page(&[80, 60]),
    ]));

    let result = collector(source.clone(), 3)
        .collect("wallstreetbets", at(1_000), at(100))
        .await
        .unwrap();

    let befores: Vec<i64> = source.queries().await.iter().map(|q| q.before).collect();
    assert_eq!(befores, vec![1_000, 700, 500, 150]);
    assert!(befores.windows(2).all(|w| w[1] < w[0]));

    let times: Vec<i64> = result.posts.iter().filter_map(|p| p.created_utc).collect();
    assert_eq!(times, vec![150, 500, 600, 700, 800, 900]);
    assert!(times.iter().all(|t| *t > 100 && *t <= 1_000));

    assert_eq!(result.stats.pages, 4);
    assert_eq!(result.stats.out_of_window, 4);
    assert_eq!(result.stats.stop, StopReason::Exhausted);

    let queries = source.queries().await;
    assert!(queries.iter().all(|q| q.size == 500 && q.subreddit == "wallstreetbets"));
}

/// # Summary
/// 时间戳异常偏早的记录不推进游标，窗口内更早的页面仍会被抓取。
#[tokio::test]
async fn test_outlier_timestamp_does_not_skip_window() {
    let source = Arc::new(ScriptedSource::with_pages(vec![
        page(&[900, 800, 5]),
        page(&[600, 400]),
        page(&[50]),
    ]));

    let result = collector(source.clone(), 3)
        .collect("wallstreetbets", at(1_000), at(100))
        .await
        .unwrap();

    let befores: Vec<i64> = source.queries().await.iter().map(|q| q.before).collect();
    assert_eq!(befores, vec![1_000, 800, 400]);
    let times: Vec<i64> = result.posts.iter().filter_map(|p| p.created_utc).collect();
    assert_eq!(times, vec![400, 600, 800, 900]);
    assert_eq!(result.stats.out_of_window, 2);
    assert_eq!(result.stats.stop, StopReason::Exhausted);
}

#[tokio::test]
async fn test_collect_stops_on_empty_page() {
    let source = Arc::new(ScriptedSource::with_pages(vec![page(&[900]), vec![]]));

    let result = collector(source.clone(), 3)
        .collect("wallstreetbets", at(1_000), at(100))
        .await
        .unwrap();

    assert_eq!(result.posts.len(), 1);
    assert_eq!(result.stats.pages, 2);
    assert_eq!(result.stats.stop, StopReason::EmptyPage);
}

#[tokio::test]
async fn test_empty_window_is_not_an_error() {
    let source = Arc::new(ScriptedSource::with_pages(vec![]));

    let result = collector(source, 3)
        .collect("wallstreetbets", at(1_000), at(100))
        .await
        .unwrap();

    assert!(result.posts.is_empty());
    assert_eq!(result.stats.stop, StopReason::EmptyPage);
}

/// # Summary
/// 页面没有早于游标的记录时必须终止，而不是反复请求同一页。
#[tokio::test]
async fn test_collect_stops_when_cursor_stalls() {
    let source = Arc::new(ScriptedSource::with_pages(vec![
        page(&[900, 800]),
        page(&[850, 800]),
        page(&[300]),
    ]));

    let result = collector(source.clone(), 3)
        .collect("wallstreetbets", at(1_000), at(100))
        .await
        .unwrap();

    assert_eq!(source.queries().await.len(), 2);
    assert_eq!(result.posts.len(), 2);
    assert_eq!(result.stats.stop, StopReason::Stalled);
}

#[tokio::test]
async fn test_records_without_timestamp_are_excluded() {
    let mut first = page(&[900, 700]);
    first.push(RawPost {
        id: Some("broken".to_string()),
        title: Some("no time".to_string()),
        ..RawPost::default()
    });
    let source = Arc::new(ScriptedSource::with_pages(vec![first, vec![]]));

    let result = collector(source, 3)
        .collect("wallstreetbets", at(1_000), at(100))
        .await
        .unwrap();

    assert_eq!(result.posts.len(), 2);
    assert_eq!(result.stats.malformed, 1);
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let source = Arc::new(ScriptedSource::new(vec![
        Err(FetchError::Status(503)),
        Err(FetchError::Transport("connection reset".to_string())),
        Ok(page(&[500])),
        Ok(vec![]),
    ]));

    let result = collector(source.clone(), 3)
        .collect("wallstreetbets", at(1_000), at(100))
        .await
        .unwrap();

    assert_eq!(result.posts.len(), 1);
    assert_eq!(result.stats.retries, 2);
    // 同一游标被请求了三次
    let befores: Vec<i64> = source.queries().await.iter().map(|q| q.before).collect();
    assert_eq!(befores, vec![1_000, 1_000, 1_000, 500]);
}

#[tokio::test]
async fn test_retry_budget_exhaustion_surfaces_error() {
    let source = Arc::new(ScriptedSource::new(vec![
        Err(FetchError::Status(500)),
        Err(FetchError::Status(500)),
        Err(FetchError::Status(500)),
        Ok(page(&[500])),
    ]));

    let err = collector(source.clone(), 3)
        .collect("wallstreetbets", at(1_000), at(100))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CollectError::TransientFetch {
            attempts: 3,
            source: FetchError::Status(500)
        }
    ));
    assert_eq!(source.queries().await.len(), 3);
}

#[tokio::test]
async fn test_decode_errors_are_not_retried() {
    let source = Arc::new(ScriptedSource::new(vec![Err(FetchError::Decode(
        "missing field `data`".to_string(),
    ))]));

    let err = collector(source.clone(), 5)
        .collect("wallstreetbets", at(1_000), at(100))
        .await
        .unwrap_err();

    assert!(matches!(err, CollectError::Fetch(FetchError::Decode(_))));
    assert_eq!(source.queries().await.len(), 1);
}

#[tokio::test]
async fn test_invalid_window_is_rejected() {
    let source = Arc::new(ScriptedSource::with_pages(vec![]));

    let err = collector(source.clone(), 3)
        .collect("wallstreetbets", at(100), at(100))
        .await
        .unwrap_err();

    assert!(matches!(err, CollectError::InvalidWindow { .. }));
    assert!(source.queries().await.is_empty());
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let source = Arc::new(ScriptedSource::with_pages(vec![page(&[900])]));
    let token = CancellationToken::new();
    token.cancel();

    let err = collector(source.clone(), 3)
        .with_cancellation(token)
        .collect("wallstreetbets", at(1_000), at(100))
        .await
        .unwrap_err();

    assert!(matches!(err, CollectError::Cancelled));
    assert!(source.queries().await.is_empty());
}

/// # Summary
/// 在请求间隔的等待期间取消，抓取应立即返回。
#[tokio::test]
async fn test_cancel_interrupts_request_delay() {
    let source = Arc::new(ScriptedSource::with_pages(vec![page(&[900]), page(&[800])]));
    let token = CancellationToken::new();
    let collector = collector(source.clone(), 3)
        .with_request_delay(Duration::from_secs(3_600))
        .with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        collector.collect("wallstreetbets", at(1_000), at(100)),
    )
    .await
    .unwrap();

    canceller.await.unwrap();
    assert!(matches!(result, Err(CollectError::Cancelled)));
    assert_eq!(source.queries().await.len(), 1);
}
