//! # Product Catalog Read Surface
//!
//! The product catalog (names, prices, categories) is owned by an external
//! collaborator; this engine only consumes two facts about a product: does it
//! exist, and are its units individually serialized.
//!
//! Catalog mutation has no API here.

use sqlx::{Sqlite, Transaction};
use tracing::debug;

use stockwell_core::CoreError;

use crate::error::{DbResult, LedgerResult};

/// Read-only lookups against the catalog's `products` table.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog;

impl ProductCatalog {
    /// Creates a new ProductCatalog.
    pub fn new() -> Self {
        ProductCatalog
    }

    /// Whether an active product with this id exists.
    pub async fn product_exists(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        product_id: &str,
    ) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE id = ?1 AND is_active = 1",
        )
        .bind(product_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(count > 0)
    }

    /// Whether units of this product must be individually serialized.
    ///
    /// Fails with `ProductNotFound` for an unknown or inactive product.
    pub async fn requires_serial(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        product_id: &str,
    ) -> LedgerResult<bool> {
        let row: Option<bool> = sqlx::query_scalar(
            "SELECT requires_serial FROM products WHERE id = ?1 AND is_active = 1",
        )
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(crate::error::DbError::from)?;

        debug!(product_id = %product_id, requires_serial = ?row, "Catalog lookup");

        row.ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()).into())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
