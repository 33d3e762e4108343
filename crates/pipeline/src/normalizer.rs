use chatter_core::common::time::from_unix;
use chatter_core::post::entity::{NormalizedPost, RawPost};
use chatter_core::post::error::MalformedRecordError;
use tracing::{debug, warn};

/// # Summary
/// 将原始记录归一化，派生三列时间。
///
/// # Logic
/// 1. 读取 `created_utc`，缺失时返回 `MissingTimestamp`。
/// 2. 换算为 UTC 时间，超出可表示范围时返回 `InvalidTimestamp`。
/// 3. `date_hour` 向上取整到整点，`date_day` 向下取整到零点。
///
/// # Arguments
/// * `raw`: 原始记录。
///
/// # Returns
/// 归一化后的帖子。
pub fn normalize(raw: RawPost) -> Result<NormalizedPost, MalformedRecordError> {
    let secs = raw
        .created_utc
        .ok_or_else(|| MalformedRecordError::MissingTimestamp { id: raw.id.clone() })?;
    let date = from_unix(secs).ok_or_else(|| MalformedRecordError::InvalidTimestamp {
        id: raw.id.clone(),
        value: secs,
    })?;

    Ok(NormalizedPost::at(raw, date))
}

/// # Summary
/// 批量归一化，排除时间戳不可用的记录。
///
/// # Logic
/// 1. 逐条调用 `normalize`，失败的记录记录告警后跳过。
/// 2. 结果按 `date` 升序稳定排序。
pub fn normalize_all<I>(raws: I) -> Vec<NormalizedPost>
where
    I: IntoIterator<Item = RawPost>,
{
    let mut skipped = 0usize;
    let mut posts: Vec<NormalizedPost> = raws
        .into_iter()
        .filter_map(|raw| match normalize(raw) {
            Ok(post) => Some(post),
            Err(e) => {
                skipped += 1;
                warn!(error = %e, "Excluding malformed record");
                None
            }
        })
        .collect();

    posts.sort_by_key(|post| post.date);
    debug!(normalized = posts.len(), skipped, "Normalized batch");
    posts
}
