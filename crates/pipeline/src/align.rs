use chatter_core::common::Granularity;
use chatter_core::merge::entity::{BucketStats, MergedRow, PostMetric};
use chatter_core::post::entity::CleanedPost;
use chatter_core::price::entity::PriceSample;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::debug;

/// 一个均值字段的累加器，计数用浮点累加以避免整数到浮点的转换。
#[derive(Default)]
struct Mean {
    sum: f64,
    count: f64,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.count += 1.0;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0.0).then(|| self.sum / self.count)
    }
}

#[derive(Default)]
struct BucketAccumulator {
    posts: usize,
    metric: i64,
    score: i64,
    num_comments: i64,
    num_crossposts: i64,
    total_awards_received: i64,
    upvote_ratio: Mean,
    polarity: Mean,
    subjectivity: Mean,
}

impl BucketAccumulator {
    fn push(&mut self, post: &CleanedPost, metric: PostMetric) {
        let raw = &post.post.raw;
        self.posts += 1;
        self.metric = self.metric.saturating_add(metric.value(post));
        self.score = self.score.saturating_add(raw.score.unwrap_or(0));
        self.num_comments = self.num_comments.saturating_add(raw.num_comments.unwrap_or(0));
        self.num_crossposts = self
            .num_crossposts
            .saturating_add(raw.num_crossposts.unwrap_or(0));
        self.total_awards_received = self
            .total_awards_received
            .saturating_add(raw.total_awards_received.unwrap_or(0));
        self.upvote_ratio.push(raw.upvote_ratio);
        self.polarity.push(post.sentiment.map(|s| s.polarity));
        self.subjectivity.push(post.sentiment.map(|s| s.subjectivity));
    }

    fn finish(self) -> BucketStats {
        BucketStats {
            posts: self.posts,
            metric: self.metric,
            score: self.score,
            num_comments: self.num_comments,
            num_crossposts: self.num_crossposts,
            total_awards_received: self.total_awards_received,
            upvote_ratio: self.upvote_ratio.value(),
            sentiment_polarity: self.polarity.value(),
            sentiment_subjectivity: self.subjectivity.value(),
        }
    }
}

/// 帖子所属的时间桶，直接取归一化阶段派生的列。
fn post_bucket(post: &CleanedPost, granularity: Granularity) -> DateTime<Utc> {
    match granularity {
        Granularity::Hour => post.post.date_hour,
        Granularity::Day => post.post.date_day,
    }
}

/// # Summary
/// 按时间桶汇总帖子流。
///
/// # Logic
/// 1. 以 `date_hour` 或 `date_day` 作为桶键。
/// 2. 所选计数列与各互动列求和，点赞率与情感取均值。
///
/// # Returns
/// 以桶键排序的汇总表。
pub fn bucket_posts(
    posts: &[CleanedPost],
    granularity: Granularity,
    metric: PostMetric,
) -> BTreeMap<DateTime<Utc>, BucketStats> {
    let mut buckets: BTreeMap<DateTime<Utc>, BucketAccumulator> = BTreeMap::new();
    for post in posts {
        buckets
            .entry(post_bucket(post, granularity))
            .or_default()
            .push(post, metric);
    }

    buckets
        .into_iter()
        .map(|(bucket, acc)| (bucket, acc.finish()))
        .collect()
}

/// # Summary
/// 以价格序列为骨架，左连接同桶的帖子汇总。
///
/// # Logic
/// 1. 帖子流按粒度分桶汇总。
/// 2. 价格采样点按 `Granularity::price_bucket` 计算连接键：按小时时取采样时间本身，
///    不在整点上的采样点不会匹配任何帖子桶。
/// 3. 每个价格采样点恰好输出一行，顺序与输入一致；没有匹配帖子的行 `stats` 为 None。
/// 4. 没有价格采样点的帖子桶被丢弃。
///
/// # Arguments
/// * `posts`: 去重后的帖子流。
/// * `prices`: 已过滤到单一资产的价格序列。
/// * `granularity`: 对齐粒度。
/// * `metric`: 桶内求和的计数列。
///
/// # Returns
/// 与 `prices` 等长的合并结果。
pub fn align_and_merge(
    posts: &[CleanedPost],
    prices: &[PriceSample],
    granularity: Granularity,
    metric: PostMetric,
) -> Vec<MergedRow> {
    let buckets = bucket_posts(posts, granularity, metric);

    let rows: Vec<MergedRow> = prices
        .iter()
        .map(|sample| {
            let bucket = granularity.price_bucket(sample.time);
            MergedRow {
                sample: sample.clone(),
                bucket,
                stats: buckets.get(&bucket).cloned(),
            }
        })
        .collect();

    debug!(
        granularity = %granularity,
        metric = %metric,
        prices = prices.len(),
        post_buckets = buckets.len(),
        matched = rows.iter().filter(|row| row.stats.is_some()).count(),
        "Aligned posts with price series"
    );

    rows
}
