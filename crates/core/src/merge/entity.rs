use crate::post::entity::CleanedPost;
use crate::price::entity::PriceSample;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// # Summary
/// 按桶求和时选用的计数列。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PostMetric {
    // 每条帖子计 1，即桶内帖子数 (配合关键词过滤即为“提及次数”)
    Posts,
    Score,
    NumComments,
    NumCrossposts,
    TotalAwards,
}

impl PostMetric {
    /// 单条帖子对该指标的贡献，缺失值计 0。
    pub fn value(self, post: &CleanedPost) -> i64 {
        let raw = &post.post.raw;
        match self {
            PostMetric::Posts => 1,
            PostMetric::Score => raw.score.unwrap_or(0),
            PostMetric::NumComments => raw.num_comments.unwrap_or(0),
            PostMetric::NumCrossposts => raw.num_crossposts.unwrap_or(0),
            PostMetric::TotalAwards => raw.total_awards_received.unwrap_or(0),
        }
    }
}

impl FromStr for PostMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "posts" | "count" | "mentions" => Ok(PostMetric::Posts),
            "score" => Ok(PostMetric::Score),
            "comments" | "num_comments" => Ok(PostMetric::NumComments),
            "crossposts" | "num_crossposts" => Ok(PostMetric::NumCrossposts),
            "awards" | "total_awards_received" => Ok(PostMetric::TotalAwards),
            _ => Err(format!("Unknown PostMetric: {}", s)),
        }
    }
}

impl std::fmt::Display for PostMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostMetric::Posts => write!(f, "posts"),
            PostMetric::Score => write!(f, "score"),
            PostMetric::NumComments => write!(f, "num_comments"),
            PostMetric::NumCrossposts => write!(f, "num_crossposts"),
            PostMetric::TotalAwards => write!(f, "total_awards_received"),
        }
    }
}

/// # Summary
/// 单个时间桶内帖子的汇总统计。
///
/// # Invariants
/// - `posts >= 1`，空桶不会产生 `BucketStats`。
/// - 均值字段在桶内没有任何可用值时为 None。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketStats {
    // 桶内帖子数
    pub posts: usize,
    // 所选计数列之和
    pub metric: i64,
    pub score: i64,
    pub num_comments: i64,
    pub num_crossposts: i64,
    pub total_awards_received: i64,
    // 平均点赞率
    pub upvote_ratio: Option<f64>,
    // 平均情感极性
    pub sentiment_polarity: Option<f64>,
    // 平均主观程度
    pub sentiment_subjectivity: Option<f64>,
}

/// # Summary
/// 合并结果行：一个价格采样点加上同桶帖子的汇总 (左连接)。
///
/// # Invariants
/// - 与价格序列一一对应，顺序一致。
/// - 同桶没有帖子时 `stats` 为 None，而不是丢弃该行。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    // 价格采样点
    pub sample: PriceSample,
    // 连接键
    pub bucket: DateTime<Utc>,
    // 同桶帖子的汇总
    pub stats: Option<BucketStats>,
}
