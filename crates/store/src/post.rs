use crate::config::{resolve, resolve_output};
use crate::table::{self, CLEANED_COLUMNS, RAW_COLUMNS, Table, csv_error};
use chatter_core::common::loose;
use chatter_core::common::time::{from_unix, parse_timestamp};
use chatter_core::post::entity::{CleanedPost, NormalizedPost, RawPost};
use chatter_core::sentiment::entity::Sentiment;
use chatter_core::store::error::StoreError;
use chatter_core::store::port::PostStore;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const RAW_TABLE: &str = "raw posts";
const RAW_REQUIRED: [&str; 3] = ["title", "author", "created_utc"];
const CLEANED_TABLE: &str = "cleaned posts";
const CLEANED_REQUIRED: [&str; 3] = ["title", "author", "date"];

/// 去重表中不属于原始记录的附加列。
#[derive(Deserialize)]
struct CleanedExtras {
    #[serde(default, deserialize_with = "loose::opt_i64")]
    group_size: Option<i64>,
    #[serde(default, deserialize_with = "loose::opt_f64")]
    sentiment_polarity: Option<f64>,
    #[serde(default, deserialize_with = "loose::opt_f64")]
    sentiment_subjectivity: Option<f64>,
}

/// PostStore 的 CSV 实现。
///
/// # Summary
/// 原始表与去重表各自使用固定列顺序，布尔列写作 `True`/`False`，时间列写作
/// `YYYY-MM-DD HH:MM:SS`，空值写作空单元格。
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvPostStore;

impl CsvPostStore {
    pub fn new() -> Self {
        Self
    }
}

fn raw_record(post: &NormalizedPost) -> Vec<String> {
    let raw = &post.raw;
    vec![
        table::text(raw.subreddit.as_deref()),
        table::text(raw.subreddit_id.as_deref()),
        table::number(raw.subreddit_subscribers),
        table::text(raw.title.as_deref()),
        table::flag(raw.is_original_data),
        table::stamp(post.date),
        table::number(raw.created_utc),
        table::number(raw.retrieved_on),
        table::number(raw.score),
        table::number(raw.upvote_ratio),
        table::number(raw.num_comments),
        table::number(raw.num_crossposts),
        table::flag(raw.cross_postable),
        table::text(raw.domain.as_deref()),
        table::text(raw.full_link.as_deref()),
        table::text(raw.author.as_deref()),
        table::text(raw.author_fullname.as_deref()),
        table::flag(raw.author_premium),
        table::flag(raw.no_follow),
        table::text(raw.all_awardings.as_deref()),
        table::number(raw.total_awards_received),
        table::flag(raw.is_video),
        table::text(raw.id.as_deref()),
        table::text(raw.link_id.as_deref()),
        table::text(raw.url.as_deref()),
        table::text(raw.permalink.as_deref()),
        table::flag(raw.stickied),
    ]
}

fn cleaned_record(cleaned: &CleanedPost) -> Vec<String> {
    let raw = &cleaned.post.raw;
    vec![
        table::text(raw.title.as_deref()),
        table::flag(raw.stickied),
        table::stamp(cleaned.post.date),
        table::number(raw.score),
        table::number(raw.upvote_ratio),
        table::number(raw.num_comments),
        table::number(raw.num_crossposts),
        table::number(raw.subreddit_subscribers),
        table::text(raw.author.as_deref()),
        table::text(raw.author_fullname.as_deref()),
        table::flag(raw.author_premium),
        table::flag(raw.no_follow),
        table::text(raw.all_awardings.as_deref()),
        table::number(raw.total_awards_received),
        table::flag(raw.is_video),
        table::text(raw.id.as_deref()),
        cleaned.group_size.to_string(),
        table::number(cleaned.sentiment.map(|s| s.polarity)),
        table::number(cleaned.sentiment.map(|s| s.subjectivity)),
    ]
}

fn write_rows<I>(path: &Path, columns: &[&str], records: I) -> Result<PathBuf, StoreError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let path = resolve_output(path);
    let mut writer = table::writer(&path, columns)?;
    let mut rows = 0usize;
    for record in records {
        writer.write_record(&record).map_err(csv_error)?;
        rows += 1;
    }
    writer.flush()?;
    info!(path = %path.display(), rows, "Saved table");
    Ok(path)
}

impl PostStore for CsvPostStore {
    fn save_raw(&self, path: &Path, posts: &[NormalizedPost]) -> Result<PathBuf, StoreError> {
        write_rows(path, &RAW_COLUMNS, posts.iter().map(raw_record))
    }

    /// # Summary
    /// 读取原始帖子表。
    ///
    /// # Logic
    /// 1. 校验 `title`、`author`、`created_utc` 三列存在。
    /// 2. 每行按列名宽松解析为 `RawPost`，缺失列为空值。
    /// 3. 由 `created_utc` 重新派生时间列；时间戳缺失或越界的行记录告警后排除。
    fn load_raw(&self, path: &Path) -> Result<Vec<NormalizedPost>, StoreError> {
        let path = resolve(path);
        let table = Table::read(&path, RAW_TABLE, &RAW_REQUIRED)?;

        let mut posts = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            let raw: RawPost = table.decode(row)?;
            match raw.created_utc.and_then(from_unix) {
                Some(date) => posts.push(NormalizedPost::at(raw, date)),
                None => warn!(line = row.line, id = ?raw.id, "Skipping row without usable created_utc"),
            }
        }

        info!(path = %path.display(), rows = table.rows.len(), loaded = posts.len(), "Loaded raw posts");
        Ok(posts)
    }

    fn save_cleaned(&self, path: &Path, posts: &[CleanedPost]) -> Result<PathBuf, StoreError> {
        write_rows(path, &CLEANED_COLUMNS, posts.iter().map(cleaned_record))
    }

    /// # Summary
    /// 读取去重后的帖子表。
    ///
    /// # Logic
    /// 1. 校验 `title`、`author`、`date` 三列存在。
    /// 2. `date` 无法解析时返回 `StoreError::Parse`。
    /// 3. 表中没有 `created_utc`，由 `date` 回填。
    /// 4. `group_size` 缺失或小于 1 时按单例处理；情感两列同时存在才视为已打分。
    fn load_cleaned(&self, path: &Path) -> Result<Vec<CleanedPost>, StoreError> {
        let path = resolve(path);
        let table = Table::read(&path, CLEANED_TABLE, &CLEANED_REQUIRED)?;

        let mut posts = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            let cell = table.cell(row, "date").unwrap_or_default();
            let date = parse_timestamp(cell).ok_or_else(|| StoreError::Parse {
                line: row.line,
                message: format!("invalid date `{cell}`"),
            })?;

            let mut raw: RawPost = table.decode(row)?;
            raw.created_utc = raw.created_utc.or(Some(date.timestamp()));
            let extras: CleanedExtras = table.decode(row)?;

            let sentiment = match (extras.sentiment_polarity, extras.sentiment_subjectivity) {
                (Some(polarity), Some(subjectivity)) => Some(Sentiment::clamped(polarity, subjectivity)),
                _ => None,
            };
            posts.push(CleanedPost {
                post: NormalizedPost::at(raw, date),
                group_size: extras
                    .group_size
                    .and_then(|n| usize::try_from(n).ok())
                    .filter(|n| *n >= 1)
                    .unwrap_or(1),
                sentiment,
            });
        }

        info!(path = %path.display(), loaded = posts.len(), "Loaded cleaned posts");
        Ok(posts)
    }
}
