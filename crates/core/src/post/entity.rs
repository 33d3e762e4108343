use crate::common::loose;
use crate::common::time::{ceil_hour, floor_day};
use crate::sentiment::entity::Sentiment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// API 返回的单条原始帖子记录，已投影到固定列集合上。
///
/// # Invariants
/// - 抓取后不可变。
/// - 未知字段在反序列化时被丢弃，缺失的已知字段为 `None`。
/// - 数值、布尔列通过 `loose` 宽松解析，无法识别的形态视为缺失。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    #[serde(default)]
    pub subreddit: Option<String>,
    #[serde(default)]
    pub subreddit_id: Option<String>,
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub subreddit_subscribers: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "is_original_content", deserialize_with = "loose::opt_bool")]
    pub is_original_data: Option<bool>,
    // 发帖时间 (UNIX 秒)，分页游标与全部时间列都由它派生
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub created_utc: Option<i64>,
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub retrieved_on: Option<i64>,
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub score: Option<i64>,
    #[serde(default, deserialize_with = "loose::opt_f64")]
    pub upvote_ratio: Option<f64>,
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub num_comments: Option<i64>,
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub num_crossposts: Option<i64>,
    #[serde(default, alias = "is_crosspostable", deserialize_with = "loose::opt_bool")]
    pub cross_postable: Option<bool>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub full_link: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub author_fullname: Option<String>,
    #[serde(default, deserialize_with = "loose::opt_bool")]
    pub author_premium: Option<bool>,
    #[serde(default, deserialize_with = "loose::opt_bool")]
    pub no_follow: Option<bool>,
    // API 中为数组，这里保留其 JSON 文本
    #[serde(default, deserialize_with = "loose::opt_text")]
    pub all_awardings: Option<String>,
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub total_awards_received: Option<i64>,
    #[serde(default, deserialize_with = "loose::opt_bool")]
    pub is_video: Option<bool>,
    #[serde(default, deserialize_with = "loose::opt_text")]
    pub id: Option<String>,
    #[serde(default)]
    pub link_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default, deserialize_with = "loose::opt_bool")]
    pub stickied: Option<bool>,
}

/// # Summary
/// 去重分组键 `(title, author)`。
///
/// # Invariants
/// - 精确匹配，大小写敏感，不做空白或标点归一化。
/// - 缺失值自成一类，两个缺失值彼此相等。
pub type PostKey<'a> = (Option<&'a str>, Option<&'a str>);

/// # Summary
/// 经过归一化的帖子：原始记录加上派生的时间列。
///
/// # Invariants
/// - 与 `RawPost` 一一对应。
/// - `date_hour` 是 `date` 向上取整到整点，`date_day` 是向下取整到零点。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPost {
    // 原始记录
    pub raw: RawPost,
    // 由 created_utc 换算的绝对时间 (秒精度)
    pub date: DateTime<Utc>,
    // 小时桶
    pub date_hour: DateTime<Utc>,
    // 日桶
    pub date_day: DateTime<Utc>,
}

impl NormalizedPost {
    /// 以给定的发帖时间构造，并派生两个时间桶列。
    pub fn at(raw: RawPost, date: DateTime<Utc>) -> Self {
        Self {
            raw,
            date,
            date_hour: ceil_hour(date),
            date_day: floor_day(date),
        }
    }

    /// 去重分组键。
    pub fn key(&self) -> PostKey<'_> {
        (self.raw.title.as_deref(), self.raw.author.as_deref())
    }
}

/// # Summary
/// 去重后的帖子：要么是某个重复组的代表记录，要么是从未参与分组的单例。
///
/// # Invariants
/// - `group_size == 1` 表示单例，原样透传。
/// - `group_size >= 2` 表示聚合记录：非数值列取自组内最早的一条，
///   `score`、`num_comments`、`total_awards_received` 为全组之和。
/// - 一个去重结果中任意两条记录的 `(title, author)` 互不相同。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedPost {
    // 代表记录 (聚合后的数值已写回)
    pub post: NormalizedPost,
    // 贡献到本记录的原始帖子数量
    pub group_size: usize,
    // 情感打分，未打分或标题缺失时为 None
    pub sentiment: Option<Sentiment>,
}

impl CleanedPost {
    /// 以单例身份包装一条归一化帖子。
    pub fn singleton(post: NormalizedPost) -> Self {
        Self {
            post,
            group_size: 1,
            sentiment: None,
        }
    }

    /// 去重分组键。
    pub fn key(&self) -> PostKey<'_> {
        self.post.key()
    }

    pub fn is_aggregated(&self) -> bool {
        self.group_size > 1
    }
}
