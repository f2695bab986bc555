//! 集成测试
//!
//! 用内存 SQLite 和桩提取器覆盖从抓取门面到存储的完整链路，
//! 不依赖真实浏览器。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use url::Url;

use price_tracker::app::product::service::ProductService;
use price_tracker::app::scrape::extractor::{ExtractError, ExtractedFields, Extractor};
use price_tracker::app::scrape::normalizer;
use price_tracker::app::scrape::service::ScrapeService;
use price_tracker::infrastructure::database::DatabaseManager;
use price_tracker::CoreError;

/// 返回固定字段或固定错误的桩提取器
struct StubExtractor {
    result: Result<ExtractedFields, String>,
}

impl StubExtractor {
    fn fields(fields: ExtractedFields) -> Arc<Self> {
        Arc::new(Self { result: Ok(fields) })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(message.to_string()),
        })
    }
}

#[async_trait]
impl Extractor for StubExtractor {
    async fn extract(&self, _url: &Url) -> Result<ExtractedFields, ExtractError> {
        match &self.result {
            Ok(fields) => Ok(fields.clone()),
            Err(message) => Err(ExtractError::Connection(message.clone())),
        }
    }
}

async fn product_service() -> ProductService {
    let db = DatabaseManager::new_in_memory().await.unwrap();
    ProductService::new(db.pool().clone())
}

fn full_fields() -> ExtractedFields {
    ExtractedFields {
        title: Some("Logitech MX Master 3S".to_string()),
        price_text: Some("$99.99".to_string()),
        image_url: Some("https://m.media-amazon.com/images/I/abc.jpg".to_string()),
    }
}

#[tokio::test]
async fn repeated_scrapes_reuse_the_same_product() {
    let products = product_service().await;
    let service = ScrapeService::new(StubExtractor::fields(full_fields()), products.clone());

    let first = service
        .scrape("https://www.amazon.com/dp/B0ABC?tag=x&th=1")
        .await
        .unwrap();
    let second = service
        .scrape("https://www.amazon.com/dp/B0ABC?ref_=nav&utm_source=mail")
        .await
        .unwrap();

    assert!(first.success);
    assert!(second.success);

    let first_id = first.data.unwrap().product_id.unwrap();
    let second_id = second.data.unwrap().product_id.unwrap();
    assert_eq!(first_id, second_id);

    let product = products.get_product_with_history(first_id).await.unwrap();
    assert_eq!(
        product.product.base_url,
        "https://www.amazon.com/dp/B0ABC"
    );
    assert_eq!(product.price_history.len(), 2);
}

#[tokio::test]
async fn partial_extraction_still_succeeds() {
    let products = product_service().await;
    let fields = ExtractedFields {
        title: Some("Some Gadget".to_string()),
        price_text: None,
        image_url: Some("https://m.media-amazon.com/images/I/img.jpg".to_string()),
    };
    let service = ScrapeService::new(StubExtractor::fields(fields), products.clone());

    let response = service
        .scrape("https://www.amazon.com/dp/B0PARTIAL")
        .await
        .unwrap();

    assert!(response.success);
    let data = response.data.unwrap();
    assert_eq!(data.title.as_deref(), Some("Some Gadget"));
    assert!(data.price.is_none());
    assert_eq!(data.saved_to_database, Some(true));

    // 没有价格就没有历史记录，但商品本身照常落库
    let product = products
        .get_product_with_history(data.product_id.unwrap())
        .await
        .unwrap();
    assert!(product.price_history.is_empty());
}

#[tokio::test]
async fn empty_extraction_is_a_content_error() {
    let products = product_service().await;
    let service = ScrapeService::new(
        StubExtractor::fields(ExtractedFields::default()),
        products,
    );

    let response = service
        .scrape("https://www.amazon.com/dp/B0EMPTY")
        .await
        .unwrap();

    assert!(!response.success);
    assert!(response.error.unwrap().contains("No data could be extracted"));
    let data = response.data.unwrap();
    assert!(data.title.is_none());
    assert!(data.price.is_none());
    assert!(data.image_url.is_none());
}

#[tokio::test]
async fn extractor_failure_goes_into_the_envelope() {
    let products = product_service().await;
    let service = ScrapeService::new(StubExtractor::failing("connection refused"), products);

    let response = service
        .scrape("https://www.amazon.com/dp/B0DOWN")
        .await
        .unwrap();

    assert!(!response.success);
    assert!(response.error.unwrap().contains("Scraping failed"));
}

#[tokio::test]
async fn unsupported_store_is_rejected_up_front() {
    let products = product_service().await;
    let service = ScrapeService::new(StubExtractor::fields(full_fields()), products);

    let err = service
        .scrape("https://www.ebay.com/itm/123")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::BadRequest(_)));

    let err = service.scrape("not a url").await.unwrap_err();
    assert!(matches!(err, CoreError::BadRequest(_)));
}

#[tokio::test]
async fn mercadolibre_urls_are_supported() {
    let products = product_service().await;
    let service = ScrapeService::new(StubExtractor::fields(full_fields()), products);

    let response = service
        .scrape("https://articulo.mercadolibre.com.mx/MLM-12345-producto")
        .await
        .unwrap();
    assert!(response.success);
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let products = product_service().await;

    let err = products.get_product_with_history(9999).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));

    let err = products.price_stats(9999).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[tokio::test]
async fn price_history_is_newest_first() {
    let products = product_service().await;
    let id = products
        .upsert_product("https://www.amazon.com/dp/B0ORDER", "Ordered Product")
        .await
        .unwrap();

    let base = Utc::now();
    for (offset, price) in [(0, 10.0), (1, 12.0), (2, 11.0)] {
        products
            .append_price_entry(id, "Amazon", price, base + Duration::seconds(offset))
            .await
            .unwrap();
    }

    let product = products.get_product_with_history(id).await.unwrap();
    let prices: Vec<f64> = product.price_history.iter().map(|e| e.price).collect();
    assert_eq!(prices, vec![11.0, 12.0, 10.0]);
}

#[tokio::test]
async fn stats_reflect_the_recorded_history() {
    let products = product_service().await;
    let id = products
        .upsert_product("https://www.amazon.com/dp/B0STATS", "Stat Product")
        .await
        .unwrap();

    let empty = products.price_stats(id).await.unwrap();
    assert_eq!(empty.count, 0);
    assert!(empty.min.is_none());

    let base = Utc::now();
    for (offset, price) in [(0, 10.0), (1, 30.0), (2, 20.0)] {
        products
            .append_price_entry(id, "Amazon", price, base + Duration::seconds(offset))
            .await
            .unwrap();
    }

    let stats = products.price_stats(id).await.unwrap();
    assert_eq!(stats.count, 3);
    assert_eq!(stats.min, Some(10.0));
    assert_eq!(stats.max, Some(30.0));
    assert_eq!(stats.avg, Some(20.0));
}

#[tokio::test]
async fn invalid_prices_are_rejected_by_the_store() {
    let products = product_service().await;
    let id = products
        .upsert_product("https://www.amazon.com/dp/B0NEG", "Negative")
        .await
        .unwrap();

    let err = products
        .append_price_entry(id, "Amazon", -1.0, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidPrice(_)));

    let err = products
        .append_price_entry(9999, "Amazon", 1.0, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[tokio::test]
async fn upsert_updates_name_but_keeps_identity() {
    let products = product_service().await;

    let first = products
        .upsert_product("https://www.amazon.com/dp/B0NAME", "Old Name")
        .await
        .unwrap();
    let second = products
        .upsert_product("https://www.amazon.com/dp/B0NAME", "New Name")
        .await
        .unwrap();
    assert_eq!(first, second);

    let product = products.get_product_with_history(first).await.unwrap();
    assert_eq!(product.product.name, "New Name");
}

#[test]
fn canonical_urls_strip_tracking_noise_only() {
    let canonical =
        normalizer::canonicalize("https://www.amazon.com/dp/B0X?tag=aff&keywords=mouse&th=1#reviews")
            .unwrap();
    assert_eq!(canonical, "https://www.amazon.com/dp/B0X?keywords=mouse");

    // 规范化是幂等的
    assert_eq!(normalizer::canonicalize(&canonical).unwrap(), canonical);
}
