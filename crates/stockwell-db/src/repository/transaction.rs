//! # Transaction Recorder
//!
//! Append-only audit trail. Every stock-affecting operation lands here as
//! exactly one row per line item; rows are never updated or deleted.

use chrono::Utc;
use sqlx::{Sqlite, Transaction};
use tracing::debug;
use uuid::Uuid;

use stockwell_core::{InventoryTransaction, NewTransaction};

use crate::error::DbResult;

/// The only write path into `inventory_transactions`.
#[derive(Debug, Clone, Default)]
pub struct TransactionRecorder;

impl TransactionRecorder {
    /// Creates a new TransactionRecorder.
    pub fn new() -> Self {
        TransactionRecorder
    }

    /// Appends one audit row inside the caller's transaction.
    ///
    /// The serial list is persisted as a JSON array; `notes` carries the
    /// caller's display text.
    pub async fn append(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        new: NewTransaction,
    ) -> DbResult<InventoryTransaction> {
        let id = generate_transaction_id();
        let now = Utc::now();

        debug!(
            id = %id,
            product_id = %new.product_id,
            transaction_type = ?new.transaction_type,
            quantity = new.quantity,
            "Recording inventory transaction"
        );

        let serials_json = serde_json::to_string(&new.serial_numbers)
            .map_err(|e| crate::error::DbError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO inventory_transactions (
                id, inventory_id, product_id, transaction_type, quantity,
                serial_numbers, supplier_id, batch_ref, notes,
                transaction_date, created_by, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11, ?12
            )
            "#,
        )
        .bind(&id)
        .bind(&new.inventory_id)
        .bind(&new.product_id)
        .bind(new.transaction_type)
        .bind(new.quantity)
        .bind(&serials_json)
        .bind(&new.supplier_id)
        .bind(&new.batch_ref)
        .bind(&new.notes)
        .bind(new.transaction_date)
        .bind(&new.created_by)
        .bind(now)
        .execute(&mut **tx)
        .await?;

        Ok(InventoryTransaction {
            id,
            inventory_id: new.inventory_id,
            product_id: new.product_id,
            transaction_type: new.transaction_type,
            quantity: new.quantity,
            serial_numbers: new.serial_numbers,
            supplier_id: new.supplier_id,
            batch_ref: new.batch_ref,
            notes: new.notes,
            transaction_date: new.transaction_date,
            created_by: new.created_by,
            created_at: now,
        })
    }

    /// Lists a product's audit rows, newest first.
    pub async fn history(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        product_id: &str,
        limit: u32,
    ) -> DbResult<Vec<InventoryTransaction>> {
        let rows = sqlx::query_as::<_, InventoryTransaction>(
            r#"
            SELECT
                id, inventory_id, product_id, transaction_type, quantity,
                serial_numbers, supplier_id, batch_ref, notes,
                transaction_date, created_by, created_at
            FROM inventory_transactions
            WHERE product_id = ?1
            ORDER BY transaction_date DESC, created_at DESC
            LIMIT ?2
            "#,
        )
        .bind(product_id)
        .bind(limit)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows)
    }

    /// Lists the most recent audit rows across all products.
    pub async fn recent(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        limit: u32,
    ) -> DbResult<Vec<InventoryTransaction>> {
        let rows = sqlx::query_as::<_, InventoryTransaction>(
            r#"
            SELECT
                id, inventory_id, product_id, transaction_type, quantity,
                serial_numbers, supplier_id, batch_ref, notes,
                transaction_date, created_by, created_at
            FROM inventory_transactions
            ORDER BY transaction_date DESC, created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows)
    }
}

/// Generates a globally unique transaction id.
///
/// ## Format
/// `TXN-{YYYYMMDDHHMMSS}-{8 random hex chars}`
///
/// Only the uniqueness is load-bearing; the timestamp prefix keeps ids
/// roughly sortable for humans reading raw audit exports.
pub fn generate_transaction_id() -> String {
    let date_part = Utc::now().format("%Y%m%d%H%M%S");
    let suffix = Uuid::new_v4().simple().to_string();
    format!("TXN-{}-{}", date_part, &suffix[..8])
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_product, stock_product, test_db};
    use std::collections::HashSet;
    use stockwell_core::TransactionType;

    #[test]
    fn test_transaction_ids_are_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_transaction_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_transaction_id_format() {
        let id = generate_transaction_id();
        assert!(id.starts_with("TXN-"));
        assert_eq!(id.len(), "TXN-".len() + 14 + 1 + 8);
    }

    #[tokio::test]
    async fn test_append_and_history() {
        let db = test_db().await;
        seed_product(&db, "P001", false).await;
        let inventory_id = stock_product(&db, "P001", 5).await;

        let mut tx = db.begin().await.unwrap();
        let recorder = db.recorder();

        let created = recorder
            .append(
                &mut tx,
                NewTransaction {
                    inventory_id: inventory_id.clone(),
                    product_id: "P001".to_string(),
                    transaction_type: TransactionType::Out,
                    quantity: 2,
                    serial_numbers: vec!["SN-1".to_string(), "SN-2".to_string()],
                    supplier_id: None,
                    batch_ref: None,
                    notes: Some("shrinkage adjustment".to_string()),
                    transaction_date: Utc::now(),
                    created_by: Some("clerk-1".to_string()),
                },
            )
            .await
            .unwrap();

        let history = recorder.history(&mut tx, "P001", 10).await.unwrap();
        tx.commit().await.unwrap();

        // stock_product wrote the initial `in` row; ours is on top.
        assert_eq!(history.len(), 2);
        let row = history.iter().find(|t| t.id == created.id).unwrap();
        assert_eq!(row.transaction_type, TransactionType::Out);
        assert_eq!(row.quantity, 2);
        assert_eq!(row.serial_numbers, vec!["SN-1", "SN-2"]);
        assert_eq!(row.created_by.as_deref(), Some("clerk-1"));
    }
}
