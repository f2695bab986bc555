//! 抓取命令行工具
//!
//! 单次抓取一个商品页面并打印提取结果，不经过 HTTP 层。
//! 用法: scrape-cli run <url>

use std::env;
use std::sync::Arc;

use price_tracker::app::scrape::extractor::{BrowserExtractor, Extractor};
use price_tracker::app::scrape::{normalizer, selectors};
use price_tracker::infrastructure::config::{get_config, init_config};
use price_tracker::infrastructure::logger::Logger;
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    Logger::init(&config.logging.level);

    // 检查命令行参数
    let args: Vec<String> = env::args().collect();

    if args.len() > 2 && args[1] == "run" {
        scrape_once(&args[2]).await?;
    } else {
        print_usage();
    }

    Ok(())
}

async fn scrape_once(raw_url: &str) -> anyhow::Result<()> {
    let url = Url::parse(raw_url)?;

    let strategy = match selectors::strategy_for_url(&url) {
        Some(strategy) => strategy,
        None => {
            eprintln!(
                "不支持的站点，支持的商店: {}",
                selectors::supported_stores().join(", ")
            );
            std::process::exit(1);
        }
    };

    let config = get_config();
    let extractor = Arc::new(BrowserExtractor::new(config.browser.clone()));

    println!("🔍 抓取 {} ({})", url, strategy.store_name);
    let fields = extractor.extract(&url).await?;

    print_field("标题", fields.title.as_deref());
    print_field("价格", fields.price_text.as_deref());
    print_field("图片", fields.image_url.as_deref());

    if let Some(text) = fields.price_text.as_deref() {
        match normalizer::parse_price(text) {
            Ok(value) => println!("  解析后价格: {}", value),
            Err(e) => println!("  价格无法解析: {}", e),
        }
    }

    println!("  规范 URL: {}", normalizer::canonicalize(raw_url)?);

    if !fields.has_data() {
        eprintln!("❌ 没有提取到任何字段");
        std::process::exit(1);
    }

    Ok(())
}

fn print_field(label: &str, value: Option<&str>) {
    match value {
        Some(v) => println!("  {}: {}", label, v),
        None => println!("  {}: NOT FOUND", label),
    }
}

fn print_usage() {
    println!("用法: scrape-cli run <url>");
    println!();
    println!("示例:");
    println!("  scrape-cli run https://www.amazon.com/dp/B0EXAMPLE");
    println!("  scrape-cli run https://articulo.mercadolibre.com.mx/MLM-123456");
}
