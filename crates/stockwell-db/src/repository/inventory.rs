//! # Stock Ledger
//!
//! The single owner of `inventory` mutation. Higher-level workflows never
//! write the table directly - they route through [`StockLedger::adjust`] or,
//! for the supplier-return path only, [`StockLedger::deduct_guarded`].
//!
//! ## The Two Write Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  adjust(delta)           new stock = max(0, stock + delta)      │
//! │                          clamps, never fails on underflow,      │
//! │                          always emits one audit row             │
//! │                                                                 │
//! │  deduct_guarded(qty)     requires stock >= qty, hard failure    │
//! │                          otherwise; emits nothing - the return  │
//! │                          workflow records its own audit row     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An over-deducting sale settles at zero through `adjust`; a supplier
//! return must never silently zero real stock, so `deduct_guarded` refuses
//! instead of clamping.

use chrono::Utc;
use sqlx::{Sqlite, Transaction};
use tracing::debug;
use uuid::Uuid;

use stockwell_core::{
    AdjustOptions, CoreError, InventoryRecord, InventoryTransaction, NewTransaction,
    TransactionType, DEFAULT_REORDER_POINT,
};

use crate::catalog::ProductCatalog;
use crate::error::{DbError, DbResult, LedgerResult};
use crate::repository::transaction::TransactionRecorder;

/// Repository owning the aggregate per-product stock count.
#[derive(Debug, Clone, Default)]
pub struct StockLedger {
    catalog: ProductCatalog,
    recorder: TransactionRecorder,
}

impl StockLedger {
    /// Creates a new StockLedger.
    pub fn new() -> Self {
        StockLedger {
            catalog: ProductCatalog::new(),
            recorder: TransactionRecorder::new(),
        }
    }

    /// Gets the inventory record for a product, if it was ever stocked.
    pub async fn get(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        product_id: &str,
    ) -> DbResult<Option<InventoryRecord>> {
        let record = sqlx::query_as::<_, InventoryRecord>(
            r#"
            SELECT
                id, product_id, stock, reorder_point, supplier_id,
                last_restock_date, created_at, updated_at
            FROM inventory
            WHERE product_id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(record)
    }

    /// Adjusts a product's stock by `delta` and records the movement.
    ///
    /// ## Behavior
    /// - Fails with `ProductNotFound` if the catalog doesn't know the product
    /// - Creates the inventory record lazily on first movement
    /// - New stock = `max(0, stock + delta)` - a clamp, not a failure
    /// - `reorder_point` overwrites the stored value only when supplied
    /// - `options.supplier_id` / `options.transaction_date` update the
    ///   record's supplier and `last_restock_date`; without an explicit date,
    ///   positive deltas stamp the current time
    /// - Always emits exactly one audit row: type `in` if `delta > 0`,
    ///   else `out`, with magnitude `abs(delta)`
    pub async fn adjust(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        product_id: &str,
        delta: i64,
        reorder_point: Option<i64>,
        options: AdjustOptions,
    ) -> LedgerResult<(InventoryRecord, InventoryTransaction)> {
        if !self.catalog.product_exists(tx, product_id).await? {
            return Err(CoreError::ProductNotFound(product_id.to_string()).into());
        }

        let now = Utc::now();
        let mut record = match self.get(tx, product_id).await? {
            Some(record) => record,
            None => self.create_record(tx, product_id, now).await?,
        };

        let new_stock = (record.stock + delta).max(0);
        let new_reorder_point = reorder_point.unwrap_or(record.reorder_point);

        if let Some(supplier_id) = &options.supplier_id {
            record.supplier_id = Some(supplier_id.clone());
        }
        if let Some(date) = options.transaction_date {
            record.last_restock_date = Some(date);
        } else if delta > 0 {
            record.last_restock_date = Some(now);
        }

        debug!(
            product_id = %product_id,
            delta = delta,
            stock = new_stock,
            "Adjusting stock"
        );

        let result = sqlx::query(
            r#"
            UPDATE inventory SET
                stock = ?2,
                reorder_point = ?3,
                supplier_id = ?4,
                last_restock_date = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&record.id)
        .bind(new_stock)
        .bind(new_reorder_point)
        .bind(&record.supplier_id)
        .bind(record.last_restock_date)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Inventory", product_id).into());
        }

        record.stock = new_stock;
        record.reorder_point = new_reorder_point;
        record.updated_at = now;

        let transaction_type = if delta > 0 {
            TransactionType::In
        } else {
            TransactionType::Out
        };

        let transaction = self
            .recorder
            .append(
                tx,
                NewTransaction {
                    inventory_id: record.id.clone(),
                    product_id: product_id.to_string(),
                    transaction_type,
                    quantity: delta.abs(),
                    serial_numbers: options.serial_numbers,
                    supplier_id: options.supplier_id,
                    batch_ref: options.batch_ref,
                    notes: options.notes,
                    transaction_date: options.transaction_date.unwrap_or(now),
                    created_by: options.created_by,
                },
            )
            .await?;

        Ok((record, transaction))
    }

    /// Subtracts `quantity` with a hard floor at the current stock level.
    ///
    /// Fails with `InsufficientStock` when the record is missing or short;
    /// the SQL predicate re-checks the guard so a concurrent writer cannot
    /// slip the stock below it between read and write.
    ///
    /// Does NOT emit an audit row - the supplier-return workflow records its
    /// own `return_to_supplier` transaction with the true deducted quantity.
    pub async fn deduct_guarded(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        product_id: &str,
        quantity: i64,
    ) -> LedgerResult<InventoryRecord> {
        let mut record =
            self.get(tx, product_id)
                .await?
                .ok_or_else(|| CoreError::InsufficientStock {
                    product_id: product_id.to_string(),
                    available: 0,
                    requested: quantity,
                })?;

        if record.stock < quantity {
            return Err(CoreError::InsufficientStock {
                product_id: product_id.to_string(),
                available: record.stock,
                requested: quantity,
            }
            .into());
        }

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE inventory SET
                stock = stock - ?2,
                updated_at = ?3
            WHERE product_id = ?1 AND stock >= ?2
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::InsufficientStock {
                product_id: product_id.to_string(),
                available: record.stock,
                requested: quantity,
            }
            .into());
        }

        record.stock -= quantity;
        record.updated_at = now;

        debug!(
            product_id = %product_id,
            deducted = quantity,
            stock = record.stock,
            "Guarded stock deduction"
        );

        Ok(record)
    }

    /// Gets an existing record or creates one with zero stock, for write
    /// paths that must reference an inventory id before any quantity change
    /// (an all-defective return line deducts nothing but still needs the
    /// record for its audit row).
    pub async fn get_or_create(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        product_id: &str,
    ) -> LedgerResult<InventoryRecord> {
        if !self.catalog.product_exists(tx, product_id).await? {
            return Err(CoreError::ProductNotFound(product_id.to_string()).into());
        }

        match self.get(tx, product_id).await? {
            Some(record) => Ok(record),
            None => Ok(self.create_record(tx, product_id, Utc::now()).await?),
        }
    }

    /// Inserts the lazily created record for a product's first movement.
    async fn create_record(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        product_id: &str,
        now: chrono::DateTime<Utc>,
    ) -> DbResult<InventoryRecord> {
        let record = InventoryRecord {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            stock: 0,
            reorder_point: DEFAULT_REORDER_POINT,
            supplier_id: None,
            last_restock_date: None,
            created_at: now,
            updated_at: now,
        };

        debug!(product_id = %product_id, id = %record.id, "Creating inventory record");

        sqlx::query(
            r#"
            INSERT INTO inventory (
                id, product_id, stock, reorder_point, supplier_id,
                last_restock_date, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&record.id)
        .bind(&record.product_id)
        .bind(record.stock)
        .bind(record.reorder_point)
        .bind(&record.supplier_id)
        .bind(record.last_restock_date)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&mut **tx)
        .await?;

        Ok(record)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
