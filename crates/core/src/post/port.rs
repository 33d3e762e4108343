use crate::post::entity::RawPost;
use crate::post::error::FetchError;
use async_trait::async_trait;

/// # Summary
/// 一次分页请求的参数。
///
/// # Invariants
/// - `before` 为 UNIX 秒，返回的记录必须严格早于它。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    // 板块名称
    pub subreddit: String,
    // 单页上限
    pub size: u32,
    // 游标：只请求早于该时间的记录
    pub before: i64,
}

/// # Summary
/// 帖子数据源接口 (原始数据提供者)。
///
/// # Invariants
/// - 单次调用只发出一个请求，不在内部重试；重试由调用方的策略决定。
#[async_trait]
pub trait PostSource: Send + Sync {
    /// # Summary
    /// 拉取早于游标的一页记录。
    ///
    /// # Logic
    /// 1. 构建带有 subreddit、size、before 参数的请求。
    /// 2. 执行请求并解析响应中的 `data` 数组。
    ///
    /// # Arguments
    /// * `query`: 分页参数。
    ///
    /// # Returns
    /// 成功返回该页记录 (可能为空)，失败返回 `FetchError`。
    async fn fetch_page(&self, query: &PageQuery) -> Result<Vec<RawPost>, FetchError>;
}
