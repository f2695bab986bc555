//! 字段提取器
//!
//! 提取分两层：浏览器会话负责拿到渲染后的页面源码（异步、易失败），
//! 字段提取是对 HTML 字符串的纯函数（同步、可离线测试）。三个字段
//! 互相独立，任何一个缺失都不影响其余字段的提取。

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, info};
use url::Url;

use super::selectors::{self, SelectorStrategy};
use crate::infrastructure::browser::{BrowserError, BrowserSession};
use crate::infrastructure::config::BrowserConfig;

/// 提取结果，三个字段独立可空
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub title: Option<String>,
    pub price_text: Option<String>,
    pub image_url: Option<String>,
}

impl ExtractedFields {
    /// 至少提取到一个字段才算整体成功
    pub fn has_data(&self) -> bool {
        self.title.is_some() || self.price_text.is_some() || self.image_url.is_some()
    }
}

/// 提取错误
///
/// 两类都属于"连接错误"：与内容错误（页面加载成功但无数据）区分开，
/// 后者不是 Err 而是一个全空的 [`ExtractedFields`]。
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to reach the browser: {0}")]
    Connection(String),
    #[error("page load failed: {0}")]
    Navigation(String),
}

impl From<BrowserError> for ExtractError {
    fn from(err: BrowserError) -> Self {
        match err {
            BrowserError::Session(e) => ExtractError::Connection(e.to_string()),
            BrowserError::Command(e) => ExtractError::Navigation(e.to_string()),
        }
    }
}

/// 提取器接口
///
/// 门面只依赖这个接口，测试里用桩实现替换真实浏览器。
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, url: &Url) -> Result<ExtractedFields, ExtractError>;
}

/// 基于 WebDriver 的提取器实现
pub struct BrowserExtractor {
    config: BrowserConfig,
}

impl BrowserExtractor {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Extractor for BrowserExtractor {
    async fn extract(&self, url: &Url) -> Result<ExtractedFields, ExtractError> {
        let strategy = selectors::strategy_for_url(url).unwrap_or(&selectors::AMAZON);

        info!(url = %url, store = strategy.store_name, "loading product page");
        let session = BrowserSession::connect(&self.config).await.map_err(|e| {
            ExtractError::Connection(e.to_string())
        })?;

        // 无论导航成败都要释放会话
        let result = session.fetch_page_source(url.as_str()).await;
        session.close().await;
        let html = result?;

        let fields = extract_fields(&html, strategy);
        debug!(
            title = fields.title.is_some(),
            price = fields.price_text.is_some(),
            image = fields.image_url.is_some(),
            "field extraction finished"
        );
        Ok(fields)
    }
}

/// 对页面源码执行选择器策略，返回三个独立可空的字段
pub fn extract_fields(html: &str, strategy: &SelectorStrategy) -> ExtractedFields {
    let doc = Html::parse_document(html);

    ExtractedFields {
        title: first_text(&doc, strategy.title),
        price_text: first_text(&doc, strategy.price),
        image_url: first_image_url(&doc, strategy.image),
    }
}

/// 按优先级尝试选择器，返回第一个非空文本（空白折叠）
fn first_text(doc: &Html, selector_list: &[&str]) -> Option<String> {
    for sel_str in selector_list {
        if let Ok(selector) = Selector::parse(sel_str) {
            if let Some(element) = doc.select(&selector).next() {
                let text: String = element.text().collect::<Vec<_>>().join(" ");
                let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
                if !cleaned.is_empty() {
                    return Some(cleaned);
                }
            }
        }
    }
    None
}

/// 按优先级尝试选择器，返回第一个可用的图片地址
///
/// src 是 data: URI 时换用高清属性 data-old-hires /
/// data-a-dynamic-image；后者是 "URL → 尺寸" 的 JSON 映射，取第一个键。
fn first_image_url(doc: &Html, selector_list: &[&str]) -> Option<String> {
    for sel_str in selector_list {
        if let Ok(selector) = Selector::parse(sel_str) {
            for element in doc.select(&selector) {
                let src = element
                    .value()
                    .attr("src")
                    .filter(|s| !s.is_empty() && !s.starts_with("data:"));

                let candidate = src
                    .or_else(|| element.value().attr("data-old-hires"))
                    .or_else(|| element.value().attr("data-a-dynamic-image"))
                    .or_else(|| element.value().attr("data-src"))
                    .or_else(|| element.value().attr("data-zoom"));

                if let Some(raw) = candidate {
                    if raw.starts_with("data:") || raw.is_empty() {
                        continue;
                    }
                    if raw.starts_with('{') {
                        if let Some(url) = first_key_of_json_map(raw) {
                            return Some(url);
                        }
                        continue;
                    }
                    return Some(raw.to_string());
                }
            }
        }
    }
    None
}

fn first_key_of_json_map(raw: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    value
        .as_object()
        .and_then(|map| map.keys().next().cloned())
}
