pub mod loose;
pub mod time;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// # Summary
/// 时间对齐粒度，决定帖子流与价格序列按哪一种时间桶进行合并。
///
/// # Invariants
/// - 帖子侧用 `bucket` 计算桶键，价格侧用 `price_bucket`。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Granularity {
    // 小时桶，向上取整到整点 (date_hour)
    Hour,
    // 日桶，向下取整到零点 (date_day)
    Day,
}

impl Granularity {
    /// # Summary
    /// 计算给定时间所属的时间桶。
    ///
    /// # Logic
    /// 1. `Hour` 向上取整到下一个整点，恰好落在整点上的时间保持不变。
    /// 2. `Day` 向下取整到当日零点。
    ///
    /// # Arguments
    /// * `time`: 待分桶的 UTC 时间。
    ///
    /// # Returns
    /// 桶的起始标记时间。
    pub fn bucket(self, time: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Granularity::Hour => time::ceil_hour(time),
            Granularity::Day => time::floor_day(time),
        }
    }

    /// # Summary
    /// 价格采样点的连接键。
    ///
    /// # Logic
    /// 1. `Hour` 直接使用采样时间本身，不做取整；只有恰好落在整点的采样点能匹配到帖子桶。
    /// 2. `Day` 与帖子侧相同，向下取整到当日零点。
    pub fn price_bucket(self, time: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Granularity::Hour => time,
            Granularity::Day => time::floor_day(time),
        }
    }

    /// 对应的派生列名。
    pub fn column(self) -> &'static str {
        match self {
            Granularity::Hour => "date_hour",
            Granularity::Day => "date_day",
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1h" | "hour" | "hourly" | "date_hour" => Ok(Granularity::Hour),
            "1d" | "day" | "daily" | "date_day" => Ok(Granularity::Day),
            _ => Err(format!("Unknown Granularity: {}", s)),
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::Hour => write!(f, "hour"),
            Granularity::Day => write!(f, "day"),
        }
    }
}
