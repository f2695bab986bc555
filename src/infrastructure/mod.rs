//! 基础设施模块：配置、日志、浏览器会话、数据库

pub mod browser;
pub mod config;
#[cfg(feature = "database")]
pub mod database;
pub mod logger;
