use async_trait::async_trait;
use chatter_core::config::CollectorConfig;
use chatter_core::post::entity::RawPost;
use chatter_core::post::error::FetchError;
use chatter_core::post::port::{PageQuery, PostSource};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// # Summary
/// pushshift 搜索接口的数据源实现。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯。
/// - 每次 `fetch_page` 只发出一个请求，不在内部重试。
#[derive(Clone)]
pub struct PushshiftSource {
    // 内部使用的 HTTP 客户端
    client: Client,
    // 完整的搜索接口地址 (submission 或 comment)
    endpoint: String,
}

impl PushshiftSource {
    /// # Summary
    /// 创建一个新的 PushshiftSource 实例。
    ///
    /// # Logic
    /// 1. 配置请求超时与 User-Agent。
    /// 2. 初始化 reqwest 客户端。
    ///
    /// # Arguments
    /// * `endpoint`: 搜索接口地址。
    /// * `timeout`: 单次请求超时。
    /// * `user_agent`: 请求头中的客户端标识。
    ///
    /// # Returns
    /// 客户端构建失败时返回 `FetchError::Transport`。
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// 按抓取配置创建实例。
    pub fn from_config(config: &CollectorConfig) -> Result<Self, FetchError> {
        Self::new(config.endpoint.clone(), config.timeout(), &config.user_agent)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// # Summary
/// pushshift 响应顶层结构。
///
/// # Invariants
/// - 记录先保留为原始 JSON，逐条解码，单条失败不影响整页。
#[derive(Deserialize, Debug)]
struct PushshiftResponse {
    data: Vec<serde_json::Value>,
}

#[async_trait]
impl PostSource for PushshiftSource {
    /// # Summary
    /// 拉取早于游标的一页帖子。
    ///
    /// # Logic
    /// 1. 以 subreddit、size、before 为查询参数发起 GET 请求。
    /// 2. 非成功状态码映射为 `FetchError::Status`，交由调用方决定是否重试。
    /// 3. 读取完整响应体，读取中断映射为 `FetchError::Transport`。
    /// 4. 解析 `data` 数组，逐条解码为 `RawPost`；无法解码的记录记录告警后跳过。
    ///
    /// # Arguments
    /// * `query`: 分页参数。
    ///
    /// # Returns
    /// 成功返回该页记录。
    async fn fetch_page(&self, query: &PageQuery) -> Result<Vec<RawPost>, FetchError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("subreddit", query.subreddit.as_str()),
                ("size", &query.size.to_string()),
                ("before", &query.before.to_string()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // 读取响应体失败 (连接中断、超时) 属于传输错误，只有内容本身无法解析才是解码错误
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let body: PushshiftResponse =
            serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))?;

        let mut posts = Vec::with_capacity(body.data.len());
        for value in body.data {
            match serde_json::from_value::<RawPost>(value) {
                Ok(post) => posts.push(post),
                Err(e) => warn!(error = %e, "Skipping undecodable record"),
            }
        }

        debug!(before = query.before, records = posts.len(), "Fetched page");
        Ok(posts)
    }
}
