use crate::cli::{CollectArgs, DedupArgs, MergeArgs, RunArgs, SelectionArgs, WindowArgs};
use anyhow::Context;
use chatter_core::common::Granularity;
use chatter_core::config::AppConfig;
use chatter_core::post::port::PostSource;
use chatter_core::sentiment::port::SentimentScorer;
use chatter_core::store::port::{MergedStore, PostStore, PriceStore};
use chatter_feed::collector::Collector;
use chatter_pipeline::align::align_and_merge;
use chatter_pipeline::dedup::deduplicate;
use chatter_pipeline::mentions::filter_mentions;
use chatter_pipeline::normalizer::normalize_all;
use chatter_pipeline::sentiment::annotate_sentiment;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// # Summary
/// 命令编排器，持有所有注入的端口实现。
///
/// # Invariants
/// * 各阶段之间只通过表格文件传递数据，每个阶段都可以单独重跑。
pub struct Pipeline {
    pub config: AppConfig,
    pub source: Arc<dyn PostSource>,
    pub posts: Arc<dyn PostStore>,
    pub prices: Arc<dyn PriceStore>,
    pub merged: Arc<dyn MergedStore>,
    pub scorer: Arc<dyn SentimentScorer>,
    pub cancel: CancellationToken,
}

fn raw_table_name(subreddit: &str) -> PathBuf {
    PathBuf::from(format!("{subreddit}_raw.csv"))
}

fn cleaned_table_name(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("posts")
        .trim_end_matches("_raw");
    input.with_file_name(format!("{stem}_clean.csv"))
}

fn merged_table_name(symbol: &str, granularity: Granularity) -> PathBuf {
    PathBuf::from(format!("{symbol}_merged_{}.csv", granularity.column()))
}

impl Pipeline {
    /// # Summary
    /// 抓取窗口内的帖子，归一化后写出原始表。
    pub async fn collect(&self, window: &WindowArgs, out: Option<&Path>) -> anyhow::Result<PathBuf> {
        let subreddit = window
            .subreddit
            .as_deref()
            .unwrap_or(&self.config.collector.subreddit);

        let collector = Collector::from_config(
            self.source.clone(),
            &self.config.collector,
            &self.config.retry,
        )
        .with_cancellation(self.cancel.clone());

        let collection = collector
            .collect(subreddit, window.before, window.after)
            .await
            .with_context(|| format!("collecting r/{subreddit}"))?;
        let posts = normalize_all(collection.posts);
        info!(subreddit, stop = ?collection.stats.stop, normalized = posts.len(), "Collection normalized");
        let target = out.map_or_else(|| raw_table_name(subreddit), Path::to_path_buf);
        let path = self.posts.save_raw(&target, &posts)?;
        Ok(path)
    }

    /// # Summary
    /// 读取原始表，去重并打情感分后写出去重表。
    pub fn dedup(&self, input: &Path, out: Option<&Path>, no_sentiment: bool) -> anyhow::Result<PathBuf> {
        let posts = self
            .posts
            .load_raw(input)
            .with_context(|| format!("loading {}", input.display()))?;

        let mut cleaned = deduplicate(&posts);
        if self.config.sentiment.enabled && !no_sentiment {
            cleaned = annotate_sentiment(&cleaned, self.scorer.as_ref());
        }
        info!(
            input = posts.len(),
            output = cleaned.len(),
            aggregated = cleaned.iter().filter(|p| p.is_aggregated()).count(),
            "Duplicates collapsed"
        );

        let target = out.map_or_else(|| cleaned_table_name(input), Path::to_path_buf);
        Ok(self.posts.save_cleaned(&target, &cleaned)?)
    }

    /// # Summary
    /// 读取去重表与价格表，按粒度左连接后写出合并表。
    ///
    /// # Logic
    /// 1. 按关键词过滤帖子 (未给关键词时保留全部)。
    /// 2. 价格表过滤到目标资产。
    /// 3. 每个价格采样点输出一行。
    pub fn merge(
        &self,
        posts: &Path,
        prices: &Path,
        granularity: Granularity,
        selection: &SelectionArgs,
        out: Option<&Path>,
    ) -> anyhow::Result<PathBuf> {
        let symbol = selection
            .symbol
            .as_deref()
            .unwrap_or(&self.config.merge.symbol);

        let cleaned = self
            .posts
            .load_cleaned(posts)
            .with_context(|| format!("loading {}", posts.display()))?;
        let mentioned = filter_mentions(&cleaned, &selection.keywords, selection.case_sensitive);
        let series = self
            .prices
            .load_prices(prices, symbol)
            .with_context(|| format!("loading {}", prices.display()))?;

        let rows = align_and_merge(&mentioned, &series, granularity, selection.metric);
        let target = out.map_or_else(|| merged_table_name(symbol, granularity), Path::to_path_buf);
        Ok(self.merged.save_merged(&target, &rows)?)
    }

    pub async fn run_collect(&self, args: &CollectArgs) -> anyhow::Result<PathBuf> {
        self.collect(&args.window, args.out.as_deref()).await
    }

    pub fn run_dedup(&self, args: &DedupArgs) -> anyhow::Result<PathBuf> {
        self.dedup(&args.input, args.out.as_deref(), args.no_sentiment)
    }

    pub fn run_merge(&self, args: &MergeArgs) -> anyhow::Result<PathBuf> {
        self.merge(
            &args.posts,
            &args.prices,
            args.granularity,
            &args.selection,
            args.out.as_deref(),
        )
    }

    /// # Summary
    /// 端到端执行：抓取 ⇒ 去重 ⇒ 按小时与按天各合并一次。
    pub async fn run_all(&self, args: &RunArgs) -> anyhow::Result<Vec<PathBuf>> {
        let raw = self.collect(&args.window, None).await?;
        let cleaned = self.dedup(&raw, None, args.no_sentiment)?;

        let mut outputs = vec![raw, cleaned.clone()];
        for granularity in [Granularity::Hour, Granularity::Day] {
            outputs.push(self.merge(&cleaned, &args.prices, granularity, &args.selection, None)?);
        }
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_names() {
        assert_eq!(raw_table_name("wallstreetbets"), PathBuf::from("wallstreetbets_raw.csv"));
        assert_eq!(
            cleaned_table_name(Path::new("/data/wallstreetbets_raw.csv")),
            PathBuf::from("/data/wallstreetbets_clean.csv")
        );
        assert_eq!(
            merged_table_name("GME", Granularity::Day),
            PathBuf::from("GME_merged_date_day.csv")
        );
    }
}
