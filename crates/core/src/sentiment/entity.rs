use serde::{Deserialize, Serialize};

/// # Summary
/// 文本情感打分结果。
///
/// # Invariants
/// - `polarity` 位于 [-1, 1]，`subjectivity` 位于 [0, 1]。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    // 情感极性，负值偏消极
    pub polarity: f64,
    // 主观程度
    pub subjectivity: f64,
}

impl Sentiment {
    /// 构造并将两个分量夹到合法区间内。
    pub fn clamped(polarity: f64, subjectivity: f64) -> Self {
        Self {
            polarity: polarity.clamp(-1.0, 1.0),
            subjectivity: subjectivity.clamp(0.0, 1.0),
        }
    }
}
