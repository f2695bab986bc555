//! 日志基础设施

use tracing_subscriber::EnvFilter;

pub struct Logger;

impl Logger {
    /// 初始化全局日志订阅器
    ///
    /// RUST_LOG 环境变量优先于配置文件中的级别。
    pub fn init(level: &str) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
