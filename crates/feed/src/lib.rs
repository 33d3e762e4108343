//! 帖子数据源适配层：pushshift HTTP 客户端、重试策略与向后分页抓取器。

pub mod collector;
pub mod pushshift;
pub mod retry;
