//! 选择器策略
//!
//! 站点 DOM 结构是整个系统最脆弱的外部依赖，因此按"字段 → 有序
//! 回退选择器列表"建模为可替换的策略值，而不是散落在提取逻辑里。
//! 站点改版时只需要改这里。

use url::Url;

/// 一个站点的字段选择器集合
#[derive(Debug)]
pub struct SelectorStrategy {
    /// 持久化时记录的店铺名
    pub store_name: &'static str,
    /// 标题选择器，按优先级排列
    pub title: &'static [&'static str],
    /// 价格文本选择器，按优先级排列
    pub price: &'static [&'static str],
    /// 主图选择器，按优先级排列
    pub image: &'static [&'static str],
}

/// Amazon 商品页选择器
pub static AMAZON: SelectorStrategy = SelectorStrategy {
    store_name: "Amazon",
    title: &[
        "#productTitle",
        "h1#title",
        "h1.product-title",
        "span#productTitle",
    ],
    price: &[
        "span.a-price.aok-align-center.reinventPricePriceToPayMargin.priceToPay span.a-offscreen",
        "span.a-price span.a-offscreen",
        "#priceblock_ourprice",
        "#priceblock_dealprice",
        "#price_inside_buybox",
        ".a-price .a-offscreen",
        r#"span[data-a-color="price"] span.a-offscreen"#,
    ],
    image: &[
        "#landingImage",
        "#imgBlkFront",
        "#main-image",
        "img.a-dynamic-image",
        "#imageBlock img",
    ],
};

/// MercadoLibre 商品页选择器
pub static MERCADOLIBRE: SelectorStrategy = SelectorStrategy {
    store_name: "MercadoLibre",
    title: &[
        "h1.ui-pdp-title",
        ".ui-pdp-title",
        r#"h1[class*="title"]"#,
        "h1.item-title",
        ".item-title__primary",
    ],
    price: &[
        ".andes-money-amount__fraction",
        ".price-tag-fraction",
        "span.andes-money-amount__fraction",
        ".andes-money-amount--cents-superscript .andes-money-amount__fraction",
        r#"span[class*="price-tag-fraction"]"#,
        ".price-tag-amount",
    ],
    image: &[
        "figure.ui-pdp-gallery__figure img",
        ".ui-pdp-image",
        "img.ui-pdp-gallery__figure__image",
        ".ui-pdp-gallery__figure img[src]",
        "figure img[data-zoom]",
        ".gallery-image img",
        r#"img[class*="gallery"]"#,
    ],
};

/// 根据 URL 域名选择站点策略，不支持的站点返回 None
pub fn strategy_for_url(url: &Url) -> Option<&'static SelectorStrategy> {
    let host = url.host_str()?.to_lowercase();
    let domain = host.strip_prefix("www.").unwrap_or(&host);

    if domain.contains("amazon.") || domain == "amazon" {
        Some(&AMAZON)
    } else if domain.contains("mercadolibre.") || domain.contains("mercadolivre.") {
        Some(&MERCADOLIBRE)
    } else {
        None
    }
}

/// 当前支持的店铺列表
pub fn supported_stores() -> Vec<&'static str> {
    vec![AMAZON.store_name, MERCADOLIBRE.store_name]
}
