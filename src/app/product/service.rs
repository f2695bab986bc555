//! 商品业务服务
//!
//! 存储操作全部以规范 URL 为商品身份：重复抓取同一 URL 更新
//! 名称与时间戳而不产生重复行。一次抓取的 upsert 与历史追加在
//! 同一事务内提交，不会出现只有商品没有历史的半提交。

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use super::model::{PriceHistoryEntry, PriceStats, Product, ProductWithHistory, RecordOutcome};
use crate::core::error::CoreError;

#[derive(Clone)]
pub struct ProductService {
    pool: SqlitePool,
}

impl ProductService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 按规范 URL 插入或更新商品，返回商品 id
    ///
    /// 同一 URL 重复调用返回同一 id，base_url 上的唯一约束保证不会
    /// 产生重复商品。
    pub async fn upsert_product(&self, base_url: &str, name: &str) -> Result<i64, CoreError> {
        let mut conn = self.pool.acquire().await?;
        let id = Self::upsert_in(&mut conn, base_url, name, Utc::now()).await?;
        Ok(id)
    }

    /// 追加一条不可变的价格记录，返回记录 id
    pub async fn append_price_entry(
        &self,
        product_id: i64,
        store_name: &str,
        price: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<i64, CoreError> {
        validate_price(price)?;

        let mut conn = self.pool.acquire().await?;
        Self::ensure_product_exists(&mut conn, product_id).await?;
        let id = Self::append_in(&mut conn, product_id, store_name, price, timestamp).await?;
        Ok(id)
    }

    /// 一次抓取落库：upsert 商品 + 至多一条价格记录，单事务
    pub async fn record_scrape(
        &self,
        base_url: &str,
        name: &str,
        store_name: &str,
        price: Option<f64>,
        timestamp: DateTime<Utc>,
    ) -> Result<RecordOutcome, CoreError> {
        if let Some(value) = price {
            validate_price(value)?;
        }

        let mut tx = self.pool.begin().await?;

        let product_id = Self::upsert_in(&mut tx, base_url, name, timestamp).await?;
        let entry_id = match price {
            Some(value) => {
                Some(Self::append_in(&mut tx, product_id, store_name, value, timestamp).await?)
            }
            None => None,
        };

        tx.commit().await?;

        Ok(RecordOutcome {
            product_id,
            entry_id,
        })
    }

    /// 读取商品及其价格历史，新记录在前
    pub async fn get_product_with_history(&self, id: i64) -> Result<ProductWithHistory, CoreError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, base_url, created_at, updated_at FROM product WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("product {} not found", id)))?;

        let price_history = sqlx::query_as::<_, PriceHistoryEntry>(
            r#"
            SELECT id, product_id, store_name, price, timestamp
            FROM price_history
            WHERE product_id = ?
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ProductWithHistory {
            product,
            price_history,
        })
    }

    /// 价格历史的派生统计：min/max/avg/count
    pub async fn price_stats(&self, id: i64) -> Result<PriceStats, CoreError> {
        let with_history = self.get_product_with_history(id).await?;
        Ok(compute_stats(id, &with_history.price_history))
    }

    async fn upsert_in(
        conn: &mut SqliteConnection,
        base_url: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO product (name, base_url, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(base_url) DO UPDATE
                SET name = excluded.name, updated_at = excluded.updated_at
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(base_url)
        .bind(now)
        .bind(now)
        .fetch_one(conn)
        .await
    }

    async fn append_in(
        conn: &mut SqliteConnection,
        product_id: i64,
        store_name: &str,
        price: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO price_history (product_id, store_name, price, timestamp)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(product_id)
        .bind(store_name)
        .bind(price)
        .bind(timestamp)
        .fetch_one(conn)
        .await
    }

    async fn ensure_product_exists(
        conn: &mut SqliteConnection,
        product_id: i64,
    ) -> Result<(), CoreError> {
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM product WHERE id = ?")
            .bind(product_id)
            .fetch_one(conn)
            .await?;

        if exists == 0 {
            return Err(CoreError::NotFound(format!(
                "product {} not found",
                product_id
            )));
        }
        Ok(())
    }
}

fn validate_price(price: f64) -> Result<(), CoreError> {
    if !price.is_finite() || price < 0.0 {
        return Err(CoreError::InvalidPrice(format!(
            "price must be a non-negative finite number, got {}",
            price
        )));
    }
    Ok(())
}

fn compute_stats(product_id: i64, history: &[PriceHistoryEntry]) -> PriceStats {
    if history.is_empty() {
        return PriceStats {
            product_id,
            count: 0,
            min: None,
            max: None,
            avg: None,
        };
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for entry in history {
        min = min.min(entry.price);
        max = max.max(entry.price);
        sum += entry.price;
    }

    PriceStats {
        product_id,
        count: history.len(),
        min: Some(min),
        max: Some(max),
        avg: Some(sum / history.len() as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(price: f64) -> PriceHistoryEntry {
        PriceHistoryEntry {
            id: 0,
            product_id: 1,
            store_name: "Amazon".to_string(),
            price,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn stats_over_empty_history() {
        let stats = compute_stats(1, &[]);
        assert_eq!(stats.count, 0);
        assert!(stats.min.is_none());
        assert!(stats.max.is_none());
        assert!(stats.avg.is_none());
    }

    #[test]
    fn stats_over_history() {
        let stats = compute_stats(1, &[entry(10.0), entry(20.0), entry(15.0)]);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, Some(10.0));
        assert_eq!(stats.max, Some(20.0));
        assert_eq!(stats.avg, Some(15.0));
    }

    #[test]
    fn negative_and_non_finite_prices_rejected() {
        assert!(validate_price(-0.01).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(f64::INFINITY).is_err());
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(14.98).is_ok());
    }
}
