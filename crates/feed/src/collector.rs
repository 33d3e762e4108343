use crate::retry::RetryPolicy;
use chatter_core::common::time::from_unix;
use chatter_core::config::{CollectorConfig, RetryConfig};
use chatter_core::post::entity::RawPost;
use chatter_core::post::error::CollectError;
use chatter_core::post::port::{PageQuery, PostSource};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// 抓取循环的结束原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    // 本页已出现不晚于窗口下界的记录，且没有窗口内的记录
    Exhausted,
    // 数据源返回空页
    EmptyPage,
    // 本页没有早于游标的记录，游标无法推进
    Stalled,
}

/// # Summary
/// 一次抓取的统计信息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectStats {
    // 成功取得的页数
    pub pages: u32,
    // 最终保留的记录数
    pub records: usize,
    // 缺少时间戳而被排除的记录数
    pub malformed: usize,
    // 落在窗口之外或不早于游标而被排除的记录数
    pub out_of_window: usize,
    // 因瞬时错误发起的重试次数
    pub retries: u32,
    pub stop: StopReason,
}

/// 抓取结果：窗口内的记录 (按 created_utc 升序) 与统计。
#[derive(Debug, Clone)]
pub struct Collection {
    pub posts: Vec<RawPost>,
    pub stats: CollectStats,
}

/// # Summary
/// 向后分页抓取器。
///
/// # Invariants
/// - 同一时刻最多只有一个请求在途。
/// - 游标在迭代间严格递减，否则立即终止循环。
/// - 取消令牌在每轮迭代、每次重试以及所有等待期间都会被检查。
pub struct Collector {
    // 原始数据源
    source: Arc<dyn PostSource>,
    // 单页请求的重试策略
    retry: RetryPolicy,
    // 单页上限
    page_size: u32,
    // 成功请求后的固定间隔
    request_delay: Duration,
    // 外部取消信号
    cancel: CancellationToken,
}

impl Collector {
    /// # Summary
    /// 使用默认页大小 (500) 与默认请求间隔 (3 秒) 创建抓取器。
    pub fn new(source: Arc<dyn PostSource>, retry: RetryPolicy) -> Self {
        let defaults = CollectorConfig::default();
        Self {
            source,
            retry,
            page_size: defaults.page_size,
            request_delay: defaults.request_delay(),
            cancel: CancellationToken::new(),
        }
    }

    /// 按配置创建抓取器。
    pub fn from_config(
        source: Arc<dyn PostSource>,
        collector: &CollectorConfig,
        retry: &RetryConfig,
    ) -> Self {
        Self::new(source, RetryPolicy::from_config(retry))
            .with_page_size(collector.page_size)
            .with_request_delay(collector.request_delay())
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// # Summary
    /// 抓取 `(after, before]` 窗口内的全部记录。
    ///
    /// # Logic
    /// 1. 游标从 `before` 开始，每轮请求早于游标的一页。
    /// 2. 排除缺少时间戳的记录，以及不在窗口内或不早于游标的记录。
    /// 3. 游标推进到本页窗口内记录的最小时间戳；空页或本页没有早于游标的记录时终止，防止死循环。
    /// 4. 本页没有窗口内记录但出现了不晚于 `after` 的记录时，窗口已抓完，正常结束。
    /// 5. 每次成功请求后固定等待 `request_delay`，以遵守接口限流。
    ///
    /// # Arguments
    /// * `subreddit`: 板块名称。
    /// * `before`: 窗口上界 (包含)。
    /// * `after`: 窗口下界 (不包含)，必须早于 `before`。
    ///
    /// # Returns
    /// 成功返回按时间升序排列的记录；空窗口返回空结果。
    pub async fn collect(
        &self,
        subreddit: &str,
        before: DateTime<Utc>,
        after: DateTime<Utc>,
    ) -> Result<Collection, CollectError> {
        let (before, after) = (before.timestamp(), after.timestamp());
        if after >= before {
            return Err(CollectError::InvalidWindow { before, after });
        }

        let mut cursor = before;
        let mut posts = Vec::new();
        let mut stats = CollectStats {
            pages: 0,
            records: 0,
            malformed: 0,
            out_of_window: 0,
            retries: 0,
            stop: StopReason::Exhausted,
        };

        let stop = loop {
            if cursor <= after {
                break StopReason::Exhausted;
            }
            if self.cancel.is_cancelled() {
                return Err(CollectError::Cancelled);
            }

            info!(subreddit, before = %format_cursor(cursor), "Collecting entries");
            let query = PageQuery {
                subreddit: subreddit.to_string(),
                size: self.page_size,
                before: cursor,
            };
            let page = self.fetch_with_retry(&query, &mut stats).await?;
            stats.pages += 1;

            if page.is_empty() {
                info!(pages = stats.pages, "Empty page, nothing older to collect");
                break StopReason::EmptyPage;
            }

            // 游标只由窗口内的记录推进
            let mut page_min: Option<i64> = None;
            let mut reached_after = false;
            let page_len = page.len();
            for post in page {
                let Some(created) = post.created_utc else {
                    stats.malformed += 1;
                    warn!(id = ?post.id, "Dropping record without created_utc");
                    continue;
                };

                if created <= after {
                    reached_after = true;
                    stats.out_of_window += 1;
                    continue;
                }
                if created >= cursor {
                    stats.out_of_window += 1;
                    continue;
                }
                page_min = Some(page_min.map_or(created, |min| min.min(created)));
                posts.push(post);
            }

            info!(
                pages = stats.pages,
                page_records = page_len,
                total = posts.len(),
                "Page collected"
            );

            match page_min {
                Some(next) => cursor = next,
                None if reached_after => break StopReason::Exhausted,
                None => {
                    warn!(cursor, "Page held no records older than the cursor, stopping");
                    break StopReason::Stalled;
                }
            }

            self.pause(self.request_delay).await?;
        };

        posts.sort_by_key(|post| post.created_utc);
        stats.records = posts.len();
        stats.stop = stop;

        info!(
            subreddit,
            records = stats.records,
            pages = stats.pages,
            malformed = stats.malformed,
            out_of_window = stats.out_of_window,
            retries = stats.retries,
            stop = ?stats.stop,
            "Collection finished"
        );

        Ok(Collection { posts, stats })
    }

    /// # Summary
    /// 按重试策略请求单页。
    ///
    /// # Logic
    /// 1. 每次尝试前检查取消信号，请求本身也可被取消打断。
    /// 2. 不可重试的错误立即上抛。
    /// 3. 瞬时错误按退避等待后重试，预算耗尽时返回 `TransientFetch`。
    async fn fetch_with_retry(
        &self,
        query: &PageQuery,
        stats: &mut CollectStats,
    ) -> Result<Vec<RawPost>, CollectError> {
        let mut attempt = 0u32;
        loop {
            if self.cancel.is_cancelled() {
                return Err(CollectError::Cancelled);
            }
            attempt += 1;

            let result = tokio::select! {
                () = self.cancel.cancelled() => return Err(CollectError::Cancelled),
                result = self.source.fetch_page(query) => result,
            };

            match result {
                Ok(page) => return Ok(page),
                Err(e) if !e.is_transient() => {
                    error!(before = query.before, error = %e, "Page request failed permanently");
                    return Err(CollectError::Fetch(e));
                }
                Err(e) if attempt >= self.retry.max_attempts() => {
                    error!(
                        before = query.before,
                        attempts = attempt,
                        error = %e,
                        "Retry budget exhausted"
                    );
                    return Err(CollectError::TransientFetch {
                        attempts: attempt,
                        source: e,
                    });
                }
                Err(e) => {
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        attempt,
                        max_attempts = self.retry.max_attempts(),
                        error = %e,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Page request failed, retrying"
                    );
                    stats.retries += 1;
                    self.pause(delay).await?;
                }
            }
        }
    }

    async fn pause(&self, delay: Duration) -> Result<(), CollectError> {
        tokio::select! {
            () = self.cancel.cancelled() => Err(CollectError::Cancelled),
            () = tokio::time::sleep(delay) => Ok(()),
        }
    }
}

fn format_cursor(cursor: i64) -> String {
    from_unix(cursor)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| cursor.to_string())
}
