use chatter_core::post::entity::CleanedPost;
use tracing::debug;

/// # Summary
/// 保留标题中提及任意关键词的帖子。
///
/// # Logic
/// 1. 子串匹配；大小写不敏感时双方都转为小写再比较。
/// 2. 标题缺失的帖子不会命中。
/// 3. 关键词列表为空时不做过滤。
///
/// # Arguments
/// * `posts`: 帖子流。
/// * `buzz_words`: 关键词，命中任意一个即可。
/// * `case_sensitive`: 是否区分大小写。
///
/// # Returns
/// 命中的帖子，保持输入顺序。配合 `PostMetric::Posts` 即为每桶提及次数。
pub fn filter_mentions(
    posts: &[CleanedPost],
    buzz_words: &[String],
    case_sensitive: bool,
) -> Vec<CleanedPost> {
    if buzz_words.is_empty() {
        return posts.to_vec();
    }

    let needles: Vec<String> = buzz_words
        .iter()
        .filter(|word| !word.is_empty())
        .map(|word| if case_sensitive { word.clone() } else { word.to_lowercase() })
        .collect();

    let matched: Vec<CleanedPost> = posts
        .iter()
        .filter(|post| {
            post.post.raw.title.as_deref().is_some_and(|title| {
                let haystack = if case_sensitive {
                    title.to_string()
                } else {
                    title.to_lowercase()
                };
                needles.iter().any(|needle| haystack.contains(needle.as_str()))
            })
        })
        .cloned()
        .collect();

    debug!(
        posts = posts.len(),
        matched = matched.len(),
        buzz_words = ?buzz_words,
        "Filtered keyword mentions"
    );
    matched
}
