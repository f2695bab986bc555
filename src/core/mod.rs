//! 核心模块：错误处理与中间件

pub mod error;
pub mod middleware;
