//! # Stats Aggregator
//!
//! Read-only rollup over the inventory table for the reporting surface.
//! One aggregate scan; no mutation.

use sqlx::{Row, SqlitePool};
use tracing::debug;

use stockwell_core::{InventoryRecord, StockSummary};

use crate::error::DbResult;

/// Read-only stock statistics.
#[derive(Debug, Clone)]
pub struct StockStats {
    pool: SqlitePool,
}

impl StockStats {
    /// Creates a new StockStats.
    pub fn new(pool: SqlitePool) -> Self {
        StockStats { pool }
    }

    /// Counts in-stock / low-stock / out-of-stock products in one scan.
    ///
    /// - in-stock: `stock > reorder_point`
    /// - low-stock: `0 < stock <= reorder_point`
    /// - out-of-stock: `stock == 0`
    pub async fn summary(&self) -> DbResult<StockSummary> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total,
                COALESCE(SUM(CASE WHEN stock > reorder_point THEN 1 ELSE 0 END), 0) AS in_stock,
                COALESCE(SUM(CASE WHEN stock > 0 AND stock <= reorder_point THEN 1 ELSE 0 END), 0) AS low_stock,
                COALESCE(SUM(CASE WHEN stock = 0 THEN 1 ELSE 0 END), 0) AS out_of_stock
            FROM inventory
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let summary = StockSummary {
            in_stock: row.try_get("in_stock")?,
            low_stock: row.try_get("low_stock")?,
            out_of_stock: row.try_get("out_of_stock")?,
            total: row.try_get("total")?,
        };

        debug!(?summary, "Computed stock summary");
        Ok(summary)
    }

    /// Lists records at or below their reorder point, lowest stock first,
    /// for the reorder report.
    pub async fn low_stock_records(&self, limit: u32) -> DbResult<Vec<InventoryRecord>> {
        let records = sqlx::query_as::<_, InventoryRecord>(
            r#"
            SELECT
                id, product_id, stock, reorder_point, supplier_id,
                last_restock_date, created_at, updated_at
            FROM inventory
            WHERE stock <= reorder_point
            ORDER BY stock ASC, product_id
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
