//! 商品处理器

use axum::{
    extract::{Path, State},
    response::Json,
};

use super::model::{PriceStats, ProductWithHistory};
use crate::app::AppState;
use crate::core::error::CoreError;

/// GET /api/product/:id
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductWithHistory>, CoreError> {
    let product = state.product_service.get_product_with_history(id).await?;
    Ok(Json(product))
}

/// GET /api/product/:id/stats
pub async fn get_product_stats(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PriceStats>, CoreError> {
    let stats = state.product_service.price_stats(id).await?;
    Ok(Json(stats))
}
