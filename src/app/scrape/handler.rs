//! 抓取处理器

use axum::{extract::State, response::Json};
use validator::Validate;

use super::model::{ScrapeRequest, ScrapeResponse};
use crate::app::AppState;
use crate::core::error::CoreError;

/// POST /api/scrape
pub async fn scrape_product(
    State(state): State<AppState>,
    Json(payload): Json<ScrapeRequest>,
) -> Result<Json<ScrapeResponse>, CoreError> {
    payload.validate()?;

    let response = state.scrape_service.scrape(&payload.url).await?;
    Ok(Json(response))
}
