//! 浏览器会话基础设施
//!
//! 通过 fantoccini 连接 WebDriver，取回渲染后的页面源码。
//! 会话是请求级的临时资源：获取 → 导航 → 读取 → 释放，
//! 任何退出路径（包括导航失败）都会释放会话。

use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use tracing::{debug, warn};

use super::config::BrowserConfig;

/// 导航后注入的反检测脚本
///
/// WebDriver 协议没有 add_init_script，只能在导航完成后补打补丁；
/// `--disable-blink-features=AutomationControlled` 启动参数覆盖了
/// 导航前的检测窗口。
const MASK_SCRIPT: &str = r#"
    Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
    Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });
    window.chrome = window.chrome || { runtime: {} };
"#;

/// 浏览器会话错误
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("WebDriver session could not be established: {0}")]
    Session(#[from] fantoccini::error::NewSessionError),
    #[error("browser command failed: {0}")]
    Command(#[from] fantoccini::error::CmdError),
}

/// 请求级浏览器会话
pub struct BrowserSession {
    client: Client,
    settle_delay_ms: u64,
}

impl BrowserSession {
    /// 建立新会话并应用反检测配置包
    pub async fn connect(config: &BrowserConfig) -> Result<Self, BrowserError> {
        let client = ClientBuilder::native()
            .capabilities(build_capabilities(config))
            .connect(&config.webdriver_url)
            .await?;

        debug!("browser session established");
        Ok(Self {
            client,
            settle_delay_ms: config.settle_delay_ms,
        })
    }

    /// 导航到目标 URL 并返回渲染后的页面源码
    ///
    /// 导航完成后注入反检测脚本，再等待一段固定时间让动态内容加载
    /// （对 networkidle 的近似）。
    pub async fn fetch_page_source(&self, url: &str) -> Result<String, BrowserError> {
        self.client.goto(url).await?;

        if let Err(e) = self.client.execute(MASK_SCRIPT, vec![]).await {
            // 脚本注入失败不影响抓取本身
            warn!("failed to apply anti-detection script: {}", e);
        }

        tokio::time::sleep(std::time::Duration::from_millis(self.settle_delay_ms)).await;

        let source = self.client.source().await?;
        Ok(source)
    }

    /// 关闭会话
    ///
    /// 释放失败只记日志：WebDriver 端的会话超时最终会回收它。
    pub async fn close(self) {
        if let Err(e) = self.client.close().await {
            warn!("failed to close browser session: {}", e);
        }
    }
}

/// 构造 WebDriver capabilities
///
/// 反检测配置包：真实视口、User-Agent、语言，以及屏蔽自动化标记的
/// Chrome 启动参数。每个会话应用一次。
fn build_capabilities(config: &BrowserConfig) -> serde_json::map::Map<String, serde_json::Value> {
    let mut args = vec![
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
        format!(
            "--window-size={},{}",
            config.viewport_width, config.viewport_height
        ),
        format!("--user-agent={}", config.user_agent),
        format!("--lang={}", config.lang),
    ];
    if config.headless {
        args.push("--headless=new".to_string());
    }

    let mut caps = serde_json::map::Map::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({
            "args": args,
            "excludeSwitches": ["enable-automation"],
        }),
    );
    caps.insert(
        "timeouts".to_string(),
        json!({
            "pageLoad": config.page_load_timeout_ms,
            "script": 30_000,
        }),
    );
    caps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_carry_anti_detection_bundle() {
        let config = BrowserConfig::default();
        let caps = build_capabilities(&config);

        let chrome_opts = caps.get("goog:chromeOptions").expect("chrome options");
        let args: Vec<String> = chrome_opts["args"]
            .as_array()
            .expect("args array")
            .iter()
            .map(|v| v.as_str().unwrap_or_default().to_string())
            .collect();

        assert!(args.iter().any(|a| a == "--disable-blink-features=AutomationControlled"));
        assert!(args.iter().any(|a| a.starts_with("--user-agent=Mozilla/5.0")));
        assert!(args.iter().any(|a| a == "--headless=new"));
        assert_eq!(caps["timeouts"]["pageLoad"], 45_000);
    }

    #[test]
    fn headful_config_omits_headless_arg() {
        let config = BrowserConfig {
            headless: false,
            ..BrowserConfig::default()
        };
        let caps = build_capabilities(&config);
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();

        assert!(!args.iter().any(|v| v.as_str() == Some("--headless=new")));
    }
}
