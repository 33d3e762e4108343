//! 测试辅助：可编排的内存数据源与帖子构造器。

use crate::post::entity::RawPost;
use crate::post::error::FetchError;
use crate::post::port::{PageQuery, PostSource};
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

/// # Summary
/// 按预设脚本依次返回结果的数据源。
///
/// # Invariants
/// - 每次 `fetch_page` 消费脚本中的一项；脚本耗尽后返回空页。
/// - 记录收到的所有请求，便于断言游标轨迹。
#[derive(Default)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<Vec<RawPost>, FetchError>>>,
    queries: Mutex<Vec<PageQuery>>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<Vec<RawPost>, FetchError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// 只包含成功页面的脚本。
    pub fn with_pages(pages: Vec<Vec<RawPost>>) -> Self {
        Self::new(pages.into_iter().map(Ok).collect())
    }

    /// 迄今收到的请求。
    pub async fn queries(&self) -> Vec<PageQuery> {
        self.queries.lock().await.clone()
    }
}

#[async_trait]
impl PostSource for ScriptedSource {
    async fn fetch_page(&self, query: &PageQuery) -> Result<Vec<RawPost>, FetchError> {
        self.queries.lock().await.push(query.clone());
        self.script.lock().await.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// 构造一条只带分组键、时间与互动数据的帖子。
pub fn post(id: &str, title: &str, author: &str, created_utc: i64, score: i64, num_comments: i64) -> RawPost {
    RawPost {
        id: Some(id.to_string()),
        title: Some(title.to_string()),
        author: Some(author.to_string()),
        created_utc: Some(created_utc),
        score: Some(score),
        num_comments: Some(num_comments),
        total_awards_received: Some(0),
        ..RawPost::default()
    }
}
