use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// 外部价格序列中的单个采样点，是合并结果的时间骨架。
///
/// # Invariants
/// - 生命周期独立于帖子流，由外部数据源提供。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    // 资产代码 (例如: GME)
    pub symbol: String,
    // 采样时间
    pub time: DateTime<Utc>,
    // 价格
    pub price: f64,
    // 成交量 (价格表中可能缺失)
    pub volume: Option<f64>,
}
