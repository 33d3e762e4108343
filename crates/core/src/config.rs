use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 全局应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub collector: CollectorConfig,
    pub retry: RetryConfig,
    pub storage: StorageConfig,
    pub merge: MergeConfig,
    pub sentiment: SentimentConfig,
}

/// 分页抓取配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub endpoint: String,
    pub subreddit: String,
    pub page_size: u32,
    // 两次成功请求之间的固定间隔，用于遵守接口限流
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl CollectorConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.pushshift.io/reddit/search/submission".to_string(),
            subreddit: "wallstreetbets".to_string(),
            page_size: 500,
            request_delay_ms: 3_000,
            timeout_secs: 30,
            user_agent: concat!("chatter/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// 单页请求的重试预算
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    // 含首次请求在内的最大尝试次数
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            base_delay_ms: 5_000,
            max_delay_ms: 120_000,
            jitter: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

/// 价格表的列映射与目标资产
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub symbol: String,
    pub symbol_column: String,
    pub time_column: String,
    pub price_column: String,
    // 可选的成交量列，缺失时忽略
    pub volume_column: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            symbol: "GME".to_string(),
            symbol_column: "symbol".to_string(),
            time_column: "date".to_string(),
            price_column: "close".to_string(),
            volume_column: "volume".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    pub enabled: bool,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.collector.page_size, 500);
        assert_eq!(config.collector.request_delay(), Duration::from_secs(3));
        assert_eq!(config.retry.max_attempts, 8);
        assert_eq!(config.storage.data_dir, "data");
        assert_eq!(config.merge.symbol, "GME");
        assert!(config.sentiment.enabled);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"collector": {"subreddit": "stocks"}, "retry": {"max_attempts": 2}}"#)
                .unwrap();
        assert_eq!(config.collector.subreddit, "stocks");
        assert_eq!(config.collector.page_size, 500);
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.base_delay_ms, 5_000);
    }
}
