//! chatter 的核心领域层：实体、端口 (Port) 与错误定义。
//!
//! 其余 crate 只依赖这里声明的抽象，具体的网络、存储实现由适配层提供。

pub mod common;
pub mod config;
pub mod merge;
pub mod post;
pub mod price;
pub mod sentiment;
pub mod store;

#[cfg(feature = "test-utils")]
pub mod testing;
