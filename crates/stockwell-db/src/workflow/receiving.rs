//! # Receiving Workflow (Bulk Stock-In)
//!
//! Processes an incoming shipment spanning multiple products as one atomic
//! unit of work.
//!
//! ## Per Line Item
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  1. Validate: product exists, quantity > 0                      │
//! │  2. Ledger.adjust(+quantity) with supplier/date/batch context   │
//! │     └── emits the line's `in` audit row                         │
//! │  3. Register each serial with the Registry                      │
//! │     └── any collision with an existing record aborts the batch  │
//! │                                                                 │
//! │  Any failure anywhere rolls the WHOLE batch back.               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Serial-count/quantity equality is not enforced for serialized products -
//! that invariant belongs to the caller. A mismatch is logged so receiving
//! discrepancies show up in the operational logs.

use sqlx::SqlitePool;
use tracing::{info, warn};

use stockwell_core::{
    validation::validate_receipt_batch, AdjustOptions, InventoryTransaction, ReceiptBatch,
};

use crate::catalog::ProductCatalog;
use crate::error::{DbError, LedgerResult};
use crate::repository::inventory::StockLedger;
use crate::repository::serial::SerialRegistry;

/// Orchestrates Ledger + Registry + Recorder for incoming shipments.
#[derive(Debug, Clone)]
pub struct ReceivingWorkflow {
    pool: SqlitePool,
    ledger: StockLedger,
    registry: SerialRegistry,
    catalog: ProductCatalog,
}

impl ReceivingWorkflow {
    /// Creates a new ReceivingWorkflow.
    pub fn new(pool: SqlitePool) -> Self {
        ReceivingWorkflow {
            pool,
            ledger: StockLedger::new(),
            registry: SerialRegistry::new(),
            catalog: ProductCatalog::new(),
        }
    }

    /// Receives a shipment, committing every line or none.
    ///
    /// Returns the audit rows written for the batch, one per line item.
    pub async fn receive(&self, batch: ReceiptBatch) -> LedgerResult<Vec<InventoryTransaction>> {
        // Structural validation before any storage work.
        validate_receipt_batch(&batch)?;

        info!(
            batch_ref = %batch.batch_ref,
            supplier_id = %batch.supplier_id,
            lines = batch.lines.len(),
            "Receiving batch"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut transactions = Vec::with_capacity(batch.lines.len());

        for line in &batch.lines {
            if !line.serial_numbers.is_empty() {
                let requires_serial = self
                    .catalog
                    .requires_serial(&mut tx, &line.product_id)
                    .await?;
                if requires_serial && line.serial_numbers.len() as i64 != line.quantity {
                    // Lenient on purpose; the caller owns this invariant.
                    warn!(
                        product_id = %line.product_id,
                        quantity = line.quantity,
                        serials = line.serial_numbers.len(),
                        batch_ref = %batch.batch_ref,
                        "Serial count does not match received quantity"
                    );
                }
            }

            let serial_text = if line.serial_numbers.is_empty() {
                "none".to_string()
            } else {
                line.serial_numbers.join(", ")
            };
            let note = format!(
                "Stock in from supplier {} (batch {}), received by {}; serials: {}",
                batch.supplier_id, batch.batch_ref, batch.received_by, serial_text
            );

            let (_, transaction) = self
                .ledger
                .adjust(
                    &mut tx,
                    &line.product_id,
                    line.quantity,
                    None,
                    AdjustOptions {
                        supplier_id: Some(batch.supplier_id.clone()),
                        transaction_date: Some(batch.received_date),
                        batch_ref: Some(batch.batch_ref.clone()),
                        serial_numbers: line.serial_numbers.clone(),
                        notes: Some(note),
                        created_by: Some(batch.received_by.clone()),
                    },
                )
                .await?;

            let registration_note = format!(
                "Received in batch {} from supplier {}",
                batch.batch_ref, batch.supplier_id
            );
            for serial in &line.serial_numbers {
                self.registry
                    .register(
                        &mut tx,
                        serial,
                        &line.product_id,
                        Some(&batch.supplier_id),
                        Some(&registration_note),
                    )
                    .await?;
            }

            transactions.push(transaction);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            batch_ref = %batch.batch_ref,
            transactions = transactions.len(),
            "Batch received"
        );

        Ok(transactions)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
