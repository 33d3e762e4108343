use crate::config::resolve_output;
use crate::table::{self, MERGED_COLUMNS, csv_error};
use chatter_core::merge::entity::MergedRow;
use chatter_core::store::error::StoreError;
use chatter_core::store::port::MergedStore;
use std::path::{Path, PathBuf};
use tracing::info;

/// MergedStore 的 CSV 实现。没有匹配帖子的价格行，其汇总列写作空单元格。
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvMergedStore;

impl CsvMergedStore {
    pub fn new() -> Self {
        Self
    }
}

fn merged_record(row: &MergedRow) -> Vec<String> {
    let sample = &row.sample;
    let stats = row.stats.as_ref();
    vec![
        sample.symbol.clone(),
        table::stamp(sample.time),
        table::stamp(row.bucket),
        sample.price.to_string(),
        table::number(sample.volume),
        table::number(stats.map(|s| s.posts)),
        table::number(stats.map(|s| s.metric)),
        table::number(stats.map(|s| s.score)),
        table::number(stats.map(|s| s.num_comments)),
        table::number(stats.map(|s| s.num_crossposts)),
        table::number(stats.map(|s| s.total_awards_received)),
        table::number(stats.and_then(|s| s.upvote_ratio)),
        table::number(stats.and_then(|s| s.sentiment_polarity)),
        table::number(stats.and_then(|s| s.sentiment_subjectivity)),
    ]
}

impl MergedStore for CsvMergedStore {
    fn save_merged(&self, path: &Path, rows: &[MergedRow]) -> Result<PathBuf, StoreError> {
        let path = resolve_output(path);
        let mut writer = table::writer(&path, &MERGED_COLUMNS)?;
        for row in rows {
            writer.write_record(merged_record(row)).map_err(csv_error)?;
        }
        writer.flush()?;

        let matched = rows.iter().filter(|row| row.stats.is_some()).count();
        info!(path = %path.display(), rows = rows.len(), matched, "Saved merged table");
        Ok(path)
    }
}
