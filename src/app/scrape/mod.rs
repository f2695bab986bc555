//! 抓取功能模块
//!
//! 单次请求的完整管线：浏览器提取 → 规范化 → 持久化 → 响应。
//! 全程顺序执行，没有并行抓取，没有队列，没有自动重试。

pub mod extractor;
pub mod handler;
pub mod model;
pub mod normalizer;
pub mod selectors;
pub mod service;
