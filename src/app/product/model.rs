//! 商品数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 商品，身份键是去除跟踪参数后的规范 URL
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub base_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 价格历史记录，只追加，正常操作下从不修改或删除
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PriceHistoryEntry {
    pub id: i64,
    pub product_id: i64,
    pub store_name: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

/// 商品及其价格历史（新记录在前）
#[derive(Debug, Serialize)]
pub struct ProductWithHistory {
    #[serde(flatten)]
    pub product: Product,
    pub price_history: Vec<PriceHistoryEntry>,
}

/// 由价格历史派生的统计值，历史为空时各值为 null
#[derive(Debug, Serialize)]
pub struct PriceStats {
    pub product_id: i64,
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
}

/// 一次抓取落库的结果
#[derive(Debug)]
pub struct RecordOutcome {
    pub product_id: i64,
    /// 价格缺失时没有历史记录
    pub entry_id: Option<i64>,
}
