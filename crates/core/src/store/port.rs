use super::error::StoreError;
use crate::merge::entity::MergedRow;
use crate::post::entity::{CleanedPost, NormalizedPost};
use crate::price::entity::PriceSample;
use std::path::{Path, PathBuf};

/// # Summary
/// 帖子表的持久化接口。
///
/// # Invariants
/// - 列顺序固定，写出的表可以被同一实现重新读回。
/// - 读取时缺失的非必需列填充为空值；缺失必需列返回 `StoreError::SchemaMismatch`。
pub trait PostStore: Send + Sync {
    /// # Summary
    /// 保存归一化后的原始帖子表。
    ///
    /// # Arguments
    /// * `path`: 目标文件，相对路径基于数据根目录。
    /// * `posts`: 待写出的帖子。
    ///
    /// # Returns
    /// 成功返回实际写入的文件路径。
    fn save_raw(&self, path: &Path, posts: &[NormalizedPost]) -> Result<PathBuf, StoreError>;

    /// # Summary
    /// 读取原始帖子表。
    ///
    /// # Logic
    /// 1. 校验必需列 (`title`、`author`、`created_utc`)。
    /// 2. 逐行解析并重新派生时间列；时间戳缺失的行被排除。
    ///
    /// # Returns
    /// 成功返回归一化帖子列表。
    fn load_raw(&self, path: &Path) -> Result<Vec<NormalizedPost>, StoreError>;

    /// 保存去重后的帖子表。
    fn save_cleaned(&self, path: &Path, posts: &[CleanedPost]) -> Result<PathBuf, StoreError>;

    /// 读取去重后的帖子表，必需列为 `title`、`author`、`date`。
    fn load_cleaned(&self, path: &Path) -> Result<Vec<CleanedPost>, StoreError>;
}

/// # Summary
/// 价格序列的读取接口。
pub trait PriceStore: Send + Sync {
    /// # Summary
    /// 读取价格表并只保留指定资产。
    ///
    /// # Arguments
    /// * `path`: 价格表文件。
    /// * `symbol`: 资产代码。
    ///
    /// # Returns
    /// 按文件原始顺序返回该资产的采样点。
    fn load_prices(&self, path: &Path, symbol: &str) -> Result<Vec<PriceSample>, StoreError>;
}

/// 合并结果的写出接口。
pub trait MergedStore: Send + Sync {
    fn save_merged(&self, path: &Path, rows: &[MergedRow]) -> Result<PathBuf, StoreError>;
}
