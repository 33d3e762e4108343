//! 表格文件的通用读写：表头索引、必需列校验与单元格格式化。

use chatter_core::store::error::StoreError;
use chrono::{DateTime, Utc};
use csv::StringRecord;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

pub(crate) const RAW_COLUMNS: [&str; 27] = [
    "subreddit",
    "subreddit_id",
    "subreddit_subscribers",
    "title",
    "is_original_data",
    "date",
    "created_utc",
    "retrieved_on",
    "score",
    "upvote_ratio",
    "num_comments",
    "num_crossposts",
    "cross_postable",
    "domain",
    "full_link",
    "author",
    "author_fullname",
    "author_premium",
    "no_follow",
    "all_awardings",
    "total_awards_received",
    "is_video",
    "id",
    "link_id",
    "url",
    "permalink",
    "stickied",
];

pub(crate) const CLEANED_COLUMNS: [&str; 19] = [
    "title",
    "stickied",
    "date",
    "score",
    "upvote_ratio",
    "num_comments",
    "num_crossposts",
    "subreddit_subscribers",
    "author",
    "author_fullname",
    "author_premium",
    "no_follow",
    "all_awardings",
    "total_awards_received",
    "is_video",
    "id",
    "group_size",
    "sentiment_polarity",
    "sentiment_subjectivity",
];

pub(crate) const MERGED_COLUMNS: [&str; 14] = [
    "symbol",
    "time",
    "bucket",
    "price",
    "volume",
    "posts",
    "metric",
    "score",
    "num_comments",
    "num_crossposts",
    "total_awards_received",
    "upvote_ratio",
    "sentiment_polarity",
    "sentiment_subjectivity",
];

/// 时间列统一写成 `YYYY-MM-DD HH:MM:SS`。
const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn csv_error(e: csv::Error) -> StoreError {
    StoreError::Csv(e.to_string())
}

/// 表格中的一行，带有它在文件中的行号。
pub(crate) struct Row {
    pub line: u64,
    record: StringRecord,
}

/// # Summary
/// 一次性读入内存的表格。
///
/// # Invariants
/// - 构造成功即意味着所有必需列都存在。
/// - 只去掉表头两端空白；单元格文本原样保留，`title`、`author` 按字节精确往返。
/// - 空单元格视为缺失。
pub(crate) struct Table {
    index: HashMap<String, usize>,
    pub rows: Vec<Row>,
}

impl Table {
    /// # Summary
    /// 读取表格并校验必需列。
    ///
    /// # Logic
    /// 1. 读取表头，建立列名到下标的索引。
    /// 2. 缺少任一必需列时返回 `SchemaMismatch`，列出全部缺失列。
    /// 3. 逐行读取记录，行号取自 CSV 解析位置。
    pub fn read(path: &Path, table: &str, required: &[&str]) -> Result<Self, StoreError> {
        let file = File::open(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(file);

        let headers = reader.headers().map_err(csv_error)?.clone();
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i))
            .collect();

        let missing: Vec<String> = required
            .iter()
            .filter(|column| !index.contains_key(**column))
            .map(|column| column.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::SchemaMismatch {
                table: table.to_string(),
                missing,
            });
        }

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result.map_err(csv_error)?;
            // 表头占第 1 行
            let fallback = u64::try_from(idx).map_or(u64::MAX, |i| i.saturating_add(2));
            let line = record.position().map_or(fallback, |p| p.line());
            rows.push(Row { line, record });
        }

        Ok(Self { index, rows })
    }

    /// 指定行某一列的单元格，列不存在或为空时返回 None。
    pub fn cell<'r>(&self, row: &'r Row, column: &str) -> Option<&'r str> {
        self.index
            .get(column)
            .and_then(|i| row.record.get(*i))
            .filter(|value| !value.is_empty())
    }

    /// # Summary
    /// 将一行按列名反序列化为结构体。
    ///
    /// # Logic
    /// 非空单元格以文本形式放入 JSON 对象，缺失列与空单元格不出现，
    /// 由目标类型的 `#[serde(default)]` 与宽松反序列化器决定最终取值。
    pub fn decode<T: DeserializeOwned>(&self, row: &Row) -> Result<T, StoreError> {
        let object: Map<String, Value> = self
            .index
            .iter()
            .filter_map(|(name, i)| {
                row.record
                    .get(*i)
                    .filter(|value| !value.is_empty())
                    .map(|value| (name.clone(), Value::String(value.to_string())))
            })
            .collect();

        serde_json::from_value(Value::Object(object)).map_err(|e| StoreError::Parse {
            line: row.line,
            message: e.to_string(),
        })
    }
}

/// 以固定表头创建写出文件，必要时创建父目录。
pub(crate) fn writer(path: &Path, columns: &[&str]) -> Result<csv::Writer<File>, StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    writer.write_record(columns).map_err(csv_error)?;
    Ok(writer)
}

pub(crate) fn text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

pub(crate) fn number<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub(crate) fn flag(value: Option<bool>) -> String {
    match value {
        Some(true) => "True".to_string(),
        Some(false) => "False".to_string(),
        None => String::new(),
    }
}

pub(crate) fn stamp(time: DateTime<Utc>) -> String {
    time.format(STAMP_FORMAT).to_string()
}
