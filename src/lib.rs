//! # 商品价格追踪服务
//!
//! 通过 WebDriver 驱动无头浏览器加载商品页面，按 CSS 选择器提取
//! 标题/价格/主图，可选持久化到 SQLite，并通过 REST API 和 CLI 暴露。
//!
//! 模块划分：
//! - `app::scrape`：提取器（反检测浏览器会话 + 多级回退选择器）、
//!   规范化（规范 URL / 价格解析）、抓取门面
//! - `app::product`：Product / PriceHistory 存储与查询（`database` feature，默认开启）
//! - `core`：错误类型与中间件
//! - `infrastructure`：配置、日志、浏览器会话、数据库连接池

pub mod app;
pub mod core;
pub mod infrastructure;

pub use crate::core::error::CoreError;
