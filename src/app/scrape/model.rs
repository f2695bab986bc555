//! 抓取请求/响应模型

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 抓取请求
#[derive(Debug, Deserialize, Validate)]
pub struct ScrapeRequest {
    #[validate(length(min = 1, message = "url must not be empty"))]
    pub url: String,
}

/// 抓取到的商品数据
///
/// 三个提取字段独立可空；price 原样返回页面上的价格文本，
/// 数值化的价格只进数据库。
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScrapeData {
    pub title: Option<String>,
    pub price: Option<String>,
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_to_database: Option<bool>,
}

/// 抓取响应信封
#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub success: bool,
    pub url: String,
    pub data: Option<ScrapeData>,
    pub error: Option<String>,
}

impl ScrapeResponse {
    pub fn success(url: String, data: ScrapeData) -> Self {
        Self {
            success: true,
            url,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(url: String, data: Option<ScrapeData>, error: String) -> Self {
        Self {
            success: false,
            url,
            data,
            error: Some(error),
        }
    }
}
