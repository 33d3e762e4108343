use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};

const SECS_PER_HOUR: i64 = 3_600;
const SECS_PER_DAY: i64 = 86_400;

// 价格表与命令行中接受的无时区时间格式，一律按 UTC 解释
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// # Summary
/// 将 UNIX 秒级时间戳转换为 UTC 时间。
///
/// # Returns
/// 超出 chrono 可表示范围时返回 None。
pub fn from_unix(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

fn floor_to(time: DateTime<Utc>, width: i64) -> DateTime<Utc> {
    let rem = time.timestamp().rem_euclid(width);
    time - TimeDelta::seconds(rem) - TimeDelta::nanoseconds(i64::from(time.timestamp_subsec_nanos()))
}

/// 向下取整到整点。
pub fn floor_hour(time: DateTime<Utc>) -> DateTime<Utc> {
    floor_to(time, SECS_PER_HOUR)
}

/// # Summary
/// 向上取整到整点。
///
/// # Logic
/// 1. 先向下取整。
/// 2. 若原时间不在整点上，则再加一小时；恰好在整点上的时间保持不变。
pub fn ceil_hour(time: DateTime<Utc>) -> DateTime<Utc> {
    let floored = floor_hour(time);
    if floored == time {
        time
    } else {
        floored + TimeDelta::hours(1)
    }
}

/// 向下取整到当日零点。
pub fn floor_day(time: DateTime<Utc>) -> DateTime<Utc> {
    floor_to(time, SECS_PER_DAY)
}

/// # Summary
/// 解析价格表或命令行中的时间文本。
///
/// # Logic
/// 1. 纯整数按 UNIX 秒解释。
/// 2. 尝试 RFC3339 (`2021-01-28T14:00:00Z`)。
/// 3. 去掉 `T`/`Z` 后按无时区格式解析，视为 UTC。
/// 4. 最后尝试纯日期，取当日零点。
///
/// # Arguments
/// * `text`: 原始文本。
///
/// # Returns
/// 解析失败返回 None。
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(secs) = text.parse::<i64>() {
        return from_unix(secs);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    let naive = text.trim_end_matches('Z').replace('T', " ");
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&naive, format) {
            return Some(parsed.and_utc());
        }
    }

    NaiveDate::parse_from_str(&naive, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
}
