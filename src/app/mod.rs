//! 应用功能模块

#[cfg(feature = "database")]
pub mod product;
pub mod scrape;

use std::sync::Arc;

use crate::app::scrape::service::ScrapeService;

#[cfg(feature = "database")]
use crate::app::product::service::ProductService;

/// 应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub scrape_service: Arc<ScrapeService>,
    #[cfg(feature = "database")]
    pub product_service: ProductService,
}
