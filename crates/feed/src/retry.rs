use chatter_core::config::RetryConfig;
use rand::Rng;
use std::time::Duration;

// 指数上限，避免 2^n 溢出；配合 max_delay 截断后已无实际意义
const MAX_EXPONENT: u32 = 20;

/// # Summary
/// 有界的指数退避重试策略。
///
/// # Invariants
/// - `max_attempts >= 1`，包含首次请求。
/// - 第 n 次失败后的等待时间为 `base * 2^(n-1)`，不超过 `max_delay`。
/// - 开启抖动时，实际等待落在 `[d/2, d]` 区间内。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter: bool,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration, jitter: bool) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            jitter,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
            config.jitter,
        )
    }

    /// 不重试：失败立即上抛。
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO, false)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// # Summary
    /// 计算第 `attempt` 次尝试失败后的等待时间。
    ///
    /// # Logic
    /// 1. 以 `base * 2^(attempt-1)` 计算名义退避，并截断到 `max_delay`。
    /// 2. 开启抖动时保留一半固定等待，另一半随机，避免多个客户端同步重试。
    ///
    /// # Arguments
    /// * `attempt`: 刚刚失败的尝试序号，从 1 开始。
    ///
    /// # Returns
    /// 下一次尝试前应等待的时长。
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(MAX_EXPONENT);
        let nominal = self
            .base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay);

        if !self.jitter || nominal.is_zero() {
            return nominal;
        }

        let half = nominal / 2;
        let spread_ms = u64::try_from(half.as_millis()).unwrap_or(u64::MAX);
        let extra = rand::thread_rng().gen_range(0..=spread_ms);
        half + Duration::from_millis(extra)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
