//! 纯函数处理管线：归一化、去重聚合、情感标注、关键词过滤与时间对齐合并。
//!
//! 每个阶段只读取上一阶段的完整输出，并返回全新的序列。

pub mod align;
pub mod dedup;
pub mod mentions;
pub mod normalizer;
pub mod sentiment;
