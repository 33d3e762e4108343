use crate::sentiment::entity::Sentiment;

/// # Summary
/// 外部情感打分器接口，视为黑盒纯函数。
///
/// # Invariants
/// - 对同一文本必须返回相同结果。
/// - 返回值分量必须位于 `Sentiment` 约定的区间内。
pub trait SentimentScorer: Send + Sync {
    /// 对一段非空文本打分。
    fn score(&self, text: &str) -> Sentiment;
}
