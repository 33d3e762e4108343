use thiserror::Error;

/// # Summary
/// 单次分页请求的失败原因。
///
/// # Invariants
/// - `Transport` 与 `Status` 属于瞬时错误，可以重试。
/// - `Decode` 表示响应体结构不符合约定，重试无意义。
#[derive(Error, Debug)]
pub enum FetchError {
    // 网络层错误 (连接失败、超时等)
    #[error("Transport error: {0}")]
    Transport(String),
    // 非成功的 HTTP 状态码
    #[error("HTTP status {0}")]
    Status(u16),
    // 响应体无法解析为 `{ "data": [...] }`
    #[error("Decode error: {0}")]
    Decode(String),
}

impl FetchError {
    /// 是否值得按重试策略再次尝试。
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Status(_))
    }
}

/// # Summary
/// 分页抓取整体失败的原因。
///
/// # Invariants
/// - 空时间窗口不是错误，返回空结果。
#[derive(Error, Debug)]
pub enum CollectError {
    // 时间窗口非法 (after 必须严格早于 before)
    #[error("Invalid window: after ({after}) must be earlier than before ({before})")]
    InvalidWindow { before: i64, after: i64 },
    // 重试预算耗尽仍未取得页面
    #[error("Giving up after {attempts} attempts: {source}")]
    TransientFetch {
        attempts: u32,
        #[source]
        source: FetchError,
    },
    // 不可重试的抓取错误
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),
    // 外部取消
    #[error("Collection cancelled")]
    Cancelled,
}

/// # Summary
/// 记录缺少可用时间戳时的归一化错误。
///
/// # Invariants
/// - 批量处理中应排除该记录，而不是中止整个批次。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedRecordError {
    #[error("Record {id:?} has no created_utc")]
    MissingTimestamp { id: Option<String> },
    #[error("Record {id:?} has an out-of-range created_utc: {value}")]
    InvalidTimestamp { id: Option<String>, value: i64 },
}
