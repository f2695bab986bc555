//! 抓取业务服务
//!
//! 单次请求的状态机：Received → Extracting → (Normalizing →
//! Persisting → Succeeded) | Failed。
//!
//! 两条关键策略（与上游行为保持一致）：
//! - 部分成功即成功：至少提取到一个字段就返回 success=true，
//!   缺失字段置空；三个字段全空才算内容错误。
//! - 持久化失败不使请求失败：提取到的数据照常返回，
//!   saved_to_database 置 false。

use std::sync::Arc;

use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use super::extractor::Extractor;
use super::model::{ScrapeData, ScrapeResponse};
use super::normalizer;
use super::selectors;
use crate::core::error::CoreError;

#[cfg(feature = "database")]
use crate::app::product::service::ProductService;

/// 全部字段为空时返回的内容错误信息
const NO_DATA_ERROR: &str =
    "No data could be extracted from the page. The page might be blocked or the URL is invalid.";

/// 商品标题缺失时持久化用的占位名
#[cfg(feature = "database")]
const UNKNOWN_PRODUCT_NAME: &str = "Unknown Product";

pub struct ScrapeService {
    extractor: Arc<dyn Extractor>,
    #[cfg(feature = "database")]
    products: ProductService,
}

impl ScrapeService {
    #[cfg(feature = "database")]
    pub fn new(extractor: Arc<dyn Extractor>, products: ProductService) -> Self {
        Self {
            extractor,
            products,
        }
    }

    #[cfg(not(feature = "database"))]
    pub fn new(extractor: Arc<dyn Extractor>) -> Self {
        Self { extractor }
    }

    /// 执行一次完整的抓取请求
    ///
    /// 返回 Err 仅限请求本身不合法（无法解析的 URL、不支持的站点）；
    /// 连接错误和内容错误都进响应信封，由调用方展示。
    pub async fn scrape(&self, raw_url: &str) -> Result<ScrapeResponse, CoreError> {
        let url = Url::parse(raw_url).map_err(|e| {
            CoreError::BadRequest(format!("invalid url {:?}: {}", raw_url, e))
        })?;

        let strategy = selectors::strategy_for_url(&url).ok_or_else(|| {
            CoreError::BadRequest(format!(
                "Invalid URL. Please provide a product URL from a supported store: {}",
                selectors::supported_stores().join(", ")
            ))
        })?;

        let scrape_id = Uuid::new_v4();
        info!(%scrape_id, url = %url, store = strategy.store_name, "scrape started");

        // Extracting：浏览器/网络不可达在这里快速失败
        let fields = match self.extractor.extract(&url).await {
            Ok(fields) => fields,
            Err(e) => {
                warn!(%scrape_id, "extraction failed: {}", e);
                return Ok(ScrapeResponse::failure(
                    raw_url.to_string(),
                    None,
                    format!("Scraping failed: {}", e),
                ));
            }
        };

        if !fields.has_data() {
            info!(%scrape_id, "no data extracted");
            return Ok(ScrapeResponse::failure(
                raw_url.to_string(),
                Some(ScrapeData::default()),
                NO_DATA_ERROR.to_string(),
            ));
        }

        // Normalizing：价格解析失败只置空字段，不中断请求
        let canonical_url = normalizer::canonicalize(raw_url)
            .map_err(|e| CoreError::BadRequest(format!("invalid url {:?}: {}", raw_url, e)))?;

        let price = match fields.price_text.as_deref() {
            Some(text) => match normalizer::parse_price(text) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(%scrape_id, "price text not parseable: {}", e);
                    None
                }
            },
            None => None,
        };

        // Persisting：一次 upsert + 至多一条历史记录，同一事务提交
        #[cfg(feature = "database")]
        let (product_id, saved_to_database) = {
            let name = fields
                .title
                .clone()
                .unwrap_or_else(|| UNKNOWN_PRODUCT_NAME.to_string());

            match self
                .products
                .record_scrape(
                    &canonical_url,
                    &name,
                    strategy.store_name,
                    price,
                    chrono::Utc::now(),
                )
                .await
            {
                Ok(outcome) => {
                    info!(
                        %scrape_id,
                        product_id = outcome.product_id,
                        entry_id = ?outcome.entry_id,
                        "scrape persisted"
                    );
                    (Some(outcome.product_id), Some(true))
                }
                Err(e) => {
                    warn!(%scrape_id, "failed to persist scrape: {}", e);
                    (None, Some(false))
                }
            }
        };

        #[cfg(not(feature = "database"))]
        let (product_id, saved_to_database) = {
            let _ = &canonical_url;
            (None, None)
        };

        Ok(ScrapeResponse::success(
            raw_url.to_string(),
            ScrapeData {
                title: fields.title,
                price: fields.price_text,
                image_url: fields.image_url,
                product_id,
                saved_to_database,
            },
        ))
    }
}
