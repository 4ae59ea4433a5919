//! # Supplier-Return Workflow ("smart deduction")
//!
//! Processes an outgoing return to a supplier as one atomic unit of work.
//!
//! ## Per Line Item
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Serialized line (serial list non-empty):                       │
//! │    resolve each serial ──► plan_serialized_return               │
//! │      available ──► +1 to the deduction                          │
//! │      defective ──► +0 (already left active stock)               │
//! │      sold/returned ──► InvalidReturnState, batch aborts         │
//! │    every accepted serial ──► transition to `returned`           │
//! │                                                                 │
//! │  Non-serialized line: deduction = quantity directly             │
//! │                                                                 │
//! │  deduction > 0 ──► guarded subtraction (hard InsufficientStock, │
//! │                    never the ledger's clamp)                    │
//! │  one `return_to_supplier` audit row with the TRUE deduction     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unlike a sale, which may settle at zero through the ledger's clamp, a
//! return that exceeds the recorded stock is an error the caller must see.

use sqlx::SqlitePool;
use tracing::info;

use stockwell_core::{
    deduction::plan_serialized_return, validation::validate_return_batch, CoreError,
    InventoryTransaction, NewTransaction, ReturnBatch, SerialNumber, SerialStatus,
    TransactionType,
};

use crate::catalog::ProductCatalog;
use crate::error::{DbError, LedgerResult};
use crate::repository::inventory::StockLedger;
use crate::repository::serial::SerialRegistry;
use crate::repository::transaction::TransactionRecorder;

/// Orchestrates Ledger + Registry + Recorder for outgoing supplier returns.
#[derive(Debug, Clone)]
pub struct SupplierReturnWorkflow {
    pool: SqlitePool,
    ledger: StockLedger,
    registry: SerialRegistry,
    recorder: TransactionRecorder,
    catalog: ProductCatalog,
}

impl SupplierReturnWorkflow {
    /// Creates a new SupplierReturnWorkflow.
    pub fn new(pool: SqlitePool) -> Self {
        SupplierReturnWorkflow {
            pool,
            ledger: StockLedger::new(),
            registry: SerialRegistry::new(),
            recorder: TransactionRecorder::new(),
            catalog: ProductCatalog::new(),
        }
    }

    /// Returns goods to a supplier, committing every line or none.
    ///
    /// Returns the audit rows written for the batch, one per line item. A
    /// line whose serials are all `defective` deducts nothing but still gets
    /// its audit row (quantity 0) - the physical shipment happened.
    pub async fn return_to_supplier(
        &self,
        batch: ReturnBatch,
    ) -> LedgerResult<Vec<InventoryTransaction>> {
        validate_return_batch(&batch)?;

        info!(
            supplier_id = %batch.supplier_id,
            lines = batch.lines.len(),
            reason = %batch.reason,
            "Processing supplier return"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut transactions = Vec::with_capacity(batch.lines.len());

        for line in &batch.lines {
            if !self.catalog.product_exists(&mut tx, &line.product_id).await? {
                return Err(CoreError::ProductNotFound(line.product_id.clone()).into());
            }

            let (quantity_to_deduct, returned_serials) = if line.serial_numbers.is_empty() {
                // Non-serialized return: the caller is trusted to be
                // returning active stock.
                (line.quantity, Vec::new())
            } else {
                let mut resolved: Vec<SerialNumber> =
                    Vec::with_capacity(line.serial_numbers.len());
                for serial_number in &line.serial_numbers {
                    let serial = self
                        .registry
                        .lookup(&mut tx, serial_number, &line.product_id)
                        .await?
                        .ok_or_else(|| CoreError::SerialNotFound {
                            serial: serial_number.clone(),
                            product_id: line.product_id.clone(),
                        })?;
                    resolved.push(serial);
                }

                let plan = plan_serialized_return(&resolved)?;

                let transition_note = format!(
                    "Returned to supplier {}: {}",
                    batch.supplier_id, batch.reason
                );
                for serial_number in &plan.serials_to_return {
                    self.registry
                        .transition(
                            &mut tx,
                            serial_number,
                            &line.product_id,
                            SerialStatus::Returned,
                            Some(&transition_note),
                        )
                        .await?;
                }

                (plan.quantity_to_deduct, plan.serials_to_return)
            };

            let record = if quantity_to_deduct > 0 {
                self.ledger
                    .deduct_guarded(&mut tx, &line.product_id, quantity_to_deduct)
                    .await?
            } else {
                // All-defective line: no quantity change, but the audit row
                // still needs the owning record.
                self.ledger.get_or_create(&mut tx, &line.product_id).await?
            };

            let serial_text = if returned_serials.is_empty() {
                "none".to_string()
            } else {
                returned_serials.join(", ")
            };
            let note = format!(
                "Return to supplier {} by {}; reason: {}; serials: {}",
                batch.supplier_id, batch.returned_by, batch.reason, serial_text
            );

            let transaction = self
                .recorder
                .append(
                    &mut tx,
                    NewTransaction {
                        inventory_id: record.id.clone(),
                        product_id: line.product_id.clone(),
                        transaction_type: TransactionType::ReturnToSupplier,
                        quantity: quantity_to_deduct,
                        serial_numbers: returned_serials,
                        supplier_id: Some(batch.supplier_id.clone()),
                        batch_ref: None,
                        notes: Some(note),
                        transaction_date: batch.return_date,
                        created_by: Some(batch.returned_by.clone()),
                    },
                )
                .await?;

            transactions.push(transaction);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            supplier_id = %batch.supplier_id,
            transactions = transactions.len(),
            "Supplier return recorded"
        );

        Ok(transactions)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::test_support::{seed_product, test_db};
    use chrono::Utc;
    use stockwell_core::{ReceiptBatch, ReceiptLine, ReturnLine};

    fn return_batch(lines: Vec<ReturnLine>) -> ReturnBatch {
        ReturnBatch {
            supplier_id: "SUP-7".to_string(),
            returned_by: "clerk-2".to_string(),
            return_date: Utc::now(),
            reason: "damaged in transit".to_string(),
            lines,
        }
    }

    fn return_line(product_id: &str, quantity: i64, serials: &[&str]) -> ReturnLine {
        ReturnLine {
            product_id: product_id.to_string(),
            quantity,
            serial_numbers: serials.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Receives `quantity` units of `product_id` (with serials, if given).
    async fn receive(db: &crate::pool::Database, product_id: &str, quantity: i64, serials: &[&str]) {
        db.receiving()
            .receive(ReceiptBatch {
                supplier_id: "SUP-7".to_string(),
                received_by: "clerk-1".to_string(),
                batch_ref: "B100".to_string(),
                received_date: Utc::now(),
                lines: vec![ReceiptLine {
                    product_id: product_id.to_string(),
                    quantity,
                    serial_numbers: serials.iter().map(|s| s.to_string()).collect(),
                }],
            })
            .await
            .unwrap();
    }

    /// Flags a serial defective through the registry, as the defect-handling
    /// flow would.
    async fn mark_defective(db: &crate::pool::Database, serial: &str, product_id: &str) {
        let mut tx = db.begin().await.unwrap();
        db.serials()
            .transition(
                &mut tx,
                serial,
                product_id,
                SerialStatus::Defective,
                Some("customer reported failure"),
            )
            .await
            .unwrap();
        // The defective unit leaves active stock when flagged.
        db.ledger()
            .adjust(
                &mut tx,
                product_id,
                -1,
                None,
                stockwell_core::AdjustOptions {
                    notes: Some(format!("Flagged {serial} defective")),
                    serial_numbers: vec![serial.to_string()],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_smart_deduction_mixed_serials() {
        let db = test_db().await;
        seed_product(&db, "P002", true).await;

        // 6 units on hand, S1 available, S2 flagged defective (stock drops
        // to 5 at that moment).
        receive(&db, "P002", 6, &["S1", "S2"]).await;
        mark_defective(&db, "S2", "P002").await;
        assert_eq!(db.inventory("P002").await.unwrap().unwrap().stock, 5);

        let transactions = db
            .returns()
            .return_to_supplier(return_batch(vec![return_line("P002", 0, &["S1", "S2"])]))
            .await
            .unwrap();

        // Only S1 was still active stock: 5 - 1 = 4.
        let record = db.inventory("P002").await.unwrap().unwrap();
        assert_eq!(record.stock, 4);

        assert_eq!(transactions.len(), 1);
        assert_eq!(
            transactions[0].transaction_type,
            TransactionType::ReturnToSupplier
        );
        assert_eq!(transactions[0].quantity, 1);
        assert_eq!(transactions[0].serial_numbers, vec!["S1", "S2"]);

        // Both physically left the building.
        let mut tx = db.begin().await.unwrap();
        for serial in ["S1", "S2"] {
            let row = db
                .serials()
                .lookup(&mut tx, serial, "P002")
                .await
                .unwrap()
                .unwrap();
            assert_eq!(row.status, SerialStatus::Returned, "{serial}");
        }
    }

    #[tokio::test]
    async fn test_non_serialized_return_deducts_quantity() {
        let db = test_db().await;
        seed_product(&db, "P001", false).await;
        receive(&db, "P001", 10, &[]).await;

        let transactions = db
            .returns()
            .return_to_supplier(return_batch(vec![return_line("P001", 4, &[])]))
            .await
            .unwrap();

        assert_eq!(db.inventory("P001").await.unwrap().unwrap().stock, 6);
        assert_eq!(transactions[0].quantity, 4);
        assert!(transactions[0].serial_numbers.is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_stock_fails_hard() {
        let db = test_db().await;
        seed_product(&db, "P001", false).await;
        receive(&db, "P001", 1, &[]).await;

        let err = db
            .returns()
            .return_to_supplier(return_batch(vec![return_line("P001", 3, &[])]))
            .await
            .unwrap_err();

        match err {
            LedgerError::Core(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 1);
                assert_eq!(requested, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // Stock untouched - no clamp-to-zero on this path.
        assert_eq!(db.inventory("P001").await.unwrap().unwrap().stock, 1);
    }

    #[tokio::test]
    async fn test_sold_serial_rejected_and_batch_rolls_back() {
        let db = test_db().await;
        seed_product(&db, "P001", false).await;
        seed_product(&db, "P002", true).await;
        receive(&db, "P001", 10, &[]).await;
        receive(&db, "P002", 2, &["S1", "S2"]).await;

        // S2 went out the door to a customer.
        let mut tx = db.begin().await.unwrap();
        db.serials()
            .transition(&mut tx, "S2", "P002", SerialStatus::Sold, None)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let err = db
            .returns()
            .return_to_supplier(return_batch(vec![
                return_line("P001", 5, &[]),
                return_line("P002", 0, &["S1", "S2"]),
            ]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::InvalidReturnState { .. })
        ));

        // The whole batch rolled back, including the valid first line.
        assert_eq!(db.inventory("P001").await.unwrap().unwrap().stock, 10);
        let mut tx = db.begin().await.unwrap();
        let s1 = db
            .serials()
            .lookup(&mut tx, "S1", "P002")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(s1.status, SerialStatus::Available);
    }

    #[tokio::test]
    async fn test_unknown_serial_rejected() {
        let db = test_db().await;
        seed_product(&db, "P002", true).await;
        receive(&db, "P002", 1, &["S1"]).await;

        let err = db
            .returns()
            .return_to_supplier(return_batch(vec![return_line("P002", 0, &["S404"])]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::SerialNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_all_defective_line_deducts_nothing() {
        let db = test_db().await;
        seed_product(&db, "P002", true).await;
        receive(&db, "P002", 3, &["S1", "S2", "S3"]).await;
        mark_defective(&db, "S1", "P002").await;
        mark_defective(&db, "S2", "P002").await;
        assert_eq!(db.inventory("P002").await.unwrap().unwrap().stock, 1);

        let transactions = db
            .returns()
            .return_to_supplier(return_batch(vec![return_line("P002", 0, &["S1", "S2"])]))
            .await
            .unwrap();

        // Deduction is zero, but the shipment is still on the audit trail.
        assert_eq!(db.inventory("P002").await.unwrap().unwrap().stock, 1);
        assert_eq!(transactions[0].quantity, 0);
        assert_eq!(transactions[0].serial_numbers, vec!["S1", "S2"]);
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let db = test_db().await;

        let err = db
            .returns()
            .return_to_supplier(return_batch(vec![return_line("P404", 1, &[])]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_return_note_carries_reason_and_supplier() {
        let db = test_db().await;
        seed_product(&db, "P001", false).await;
        receive(&db, "P001", 5, &[]).await;

        let transactions = db
            .returns()
            .return_to_supplier(return_batch(vec![return_line("P001", 2, &[])]))
            .await
            .unwrap();

        let note = transactions[0].notes.clone().unwrap();
        assert!(note.contains("SUP-7"));
        assert!(note.contains("damaged in transit"));
        assert!(note.contains("clerk-2"));
        assert_eq!(transactions[0].supplier_id.as_deref(), Some("SUP-7"));
    }
}
