//! 价格追踪服务器
//!
//! 对外提供 REST API：抓取商品页面、查询商品与价格历史。

use std::sync::Arc;
use std::time::Duration;

use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use price_tracker::app::scrape::extractor::BrowserExtractor;
use price_tracker::app::scrape::handler::scrape_product;
use price_tracker::app::scrape::selectors::supported_stores;
use price_tracker::app::scrape::service::ScrapeService;
use price_tracker::app::AppState;
use price_tracker::core::middleware::request_logging_middleware;
use price_tracker::infrastructure::config::{get_config, init_config};
use price_tracker::infrastructure::logger::Logger;

#[cfg(feature = "database")]
use price_tracker::app::product::handler::{get_product, get_product_stats};
#[cfg(feature = "database")]
use price_tracker::app::product::service::ProductService;
#[cfg(feature = "database")]
use price_tracker::infrastructure::database::DatabaseManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置并初始化日志
    init_config()?;
    let config = get_config();
    Logger::init(&config.logging.level);

    info!("启动价格追踪服务器...");

    // 构建服务
    let extractor = Arc::new(BrowserExtractor::new(config.browser.clone()));

    #[cfg(feature = "database")]
    let state = {
        let db = DatabaseManager::new(&config.database.path).await?;
        info!("数据库就绪: {}", config.database.path);

        let product_service = ProductService::new(db.pool().clone());
        let scrape_service = Arc::new(ScrapeService::new(extractor, product_service.clone()));
        AppState {
            scrape_service,
            product_service,
        }
    };

    #[cfg(not(feature = "database"))]
    let state = AppState {
        scrape_service: Arc::new(ScrapeService::new(extractor)),
    };

    // 创建路由
    let router = Router::new()
        .route("/", get(api_info))
        .route("/health", get(health_check))
        .route("/api/scrape", post(scrape_product));

    #[cfg(feature = "database")]
    let router = router
        .route("/api/product/:id", get(get_product))
        .route("/api/product/:id/stats", get(get_product_stats));

    let app = router
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_logging_middleware))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.http.timeout_seconds,
        )))
        .with_state(state);

    // 绑定地址
    let addr = format!("{}:{}", config.http.bind_address, config.http.port);
    let listener = TcpListener::bind(&addr).await?;

    info!("🚀 价格追踪服务器运行在 http://{}", addr);
    info!("📖 API 端点:");
    info!("   GET  /                      - API 信息");
    info!("   GET  /health                - 健康检查");
    info!("   POST /api/scrape            - 抓取商品页面");
    #[cfg(feature = "database")]
    {
        info!("   GET  /api/product/:id       - 商品及价格历史");
        info!("   GET  /api/product/:id/stats - 价格统计");
    }

    // 启动服务器
    axum::serve(listener, app).await?;
    Ok(())
}

/// API 信息
async fn api_info() -> Json<serde_json::Value> {
    Json(json!({
        "name": "Price Tracker API",
        "version": env!("CARGO_PKG_VERSION"),
        "supported_stores": supported_stores(),
        "endpoints": {
            "scrape": "POST /api/scrape",
            "product": "GET /api/product/:id",
            "stats": "GET /api/product/:id/stats",
            "health": "GET /health"
        }
    }))
}

/// 健康检查
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
