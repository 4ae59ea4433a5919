//! # Domain Types
//!
//! Core domain types for the stock ledger and serial-number lifecycle.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                            │
//! │                                                                 │
//! │  ┌─────────────────┐ ┌─────────────────┐ ┌───────────────────┐  │
//! │  │ InventoryRecord │ │  SerialNumber   │ │ InventoryTxn      │  │
//! │  │ ─────────────── │ │ ─────────────── │ │ ───────────────── │  │
//! │  │ product_id      │ │ serial_number   │ │ id (txn id)       │  │
//! │  │ stock (>= 0)    │ │ status          │ │ transaction_type  │  │
//! │  │ reorder_point   │ │ supplier_id     │ │ quantity          │  │
//! │  └─────────────────┘ └─────────────────┘ └───────────────────┘  │
//! │                                                                 │
//! │  ┌─────────────────┐ ┌─────────────────┐                        │
//! │  │  SerialStatus   │ │ TransactionType │                        │
//! │  │ ─────────────── │ │ ─────────────── │                        │
//! │  │ Available       │ │ In              │                        │
//! │  │ Sold            │ │ Out             │                        │
//! │  │ Defective       │ │ ReturnToSupplier│                        │
//! │  │ Returned        │ └─────────────────┘                        │
//! │  └─────────────────┘                                            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Statuses and transaction types are closed enums backed by TEXT columns,
//! not free-form strings validated by convention.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Serial Status
// =============================================================================

/// The lifecycle status of an individually tracked unit.
///
/// ## State Machine
/// ```text
///               ┌──────► sold
///               │
///  available ───┼──────► defective ───► returned
///               │                          ▲
///               └──────────────────────────┘
/// ```
///
/// Transitions are monotonic: a unit never moves back to `available`.
/// `sold` units leave this engine's jurisdiction; returning them belongs to
/// the external sales-return flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum SerialStatus {
    /// Unit is on the shelf and counts toward active stock.
    Available,
    /// Unit was sold to a customer.
    Sold,
    /// Unit was found defective; already excluded from active stock.
    Defective,
    /// Unit was physically sent back to the supplier.
    Returned,
}

impl SerialStatus {
    /// Whether the transition table permits moving to `next`.
    ///
    /// The table is closed; anything not listed here is invalid:
    /// - `available → sold | defective | returned`
    /// - `defective → returned`
    pub fn can_transition_to(self, next: SerialStatus) -> bool {
        use SerialStatus::{Available, Defective, Returned, Sold};
        matches!(
            (self, next),
            (Available, Sold)
                | (Available, Defective)
                | (Available, Returned)
                | (Defective, Returned)
        )
    }

    /// Whether a unit in this status is counted in the aggregate `stock`.
    ///
    /// Only `available` units count; a `defective` unit already left the
    /// active-stock count at the moment it was flagged.
    pub fn counts_as_active_stock(self) -> bool {
        self == SerialStatus::Available
    }
}

impl Default for SerialStatus {
    fn default() -> Self {
        SerialStatus::Available
    }
}

// =============================================================================
// Transaction Type
// =============================================================================

/// The kind of stock movement an audit record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Positive adjustment (receiving, restock).
    In,
    /// Negative adjustment (sale, shrinkage).
    Out,
    /// Outgoing return shipped back to a supplier.
    ReturnToSupplier,
}

// =============================================================================
// Inventory Record
// =============================================================================

/// Aggregate stock state for one product.
///
/// Created lazily on the product's first stock movement; never deleted.
/// `stock` is never negative - the ledger clamps adjustments and the return
/// workflow pre-validates before subtracting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryRecord {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// The product this record tracks (unique per product).
    pub product_id: String,

    /// Currently active units: non-serialized count plus `available` serials.
    pub stock: i64,

    /// Threshold used by stats and reorder reports.
    pub reorder_point: i64,

    /// Last supplier who restocked this product.
    pub supplier_id: Option<String>,

    /// Timestamp of the most recent positive adjustment.
    pub last_restock_date: Option<DateTime<Utc>>,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl InventoryRecord {
    /// Whether stock has fallen to (or below) the reorder point.
    pub fn is_low_stock(&self) -> bool {
        self.stock > 0 && self.stock <= self.reorder_point
    }

    /// Whether the product is fully out of stock.
    pub fn is_out_of_stock(&self) -> bool {
        self.stock == 0
    }
}

// =============================================================================
// Serial Number
// =============================================================================

/// One physically serialized unit.
///
/// The (`serial_number`, `product_id`) pair is globally unique: a serial
/// cannot be re-registered for the same product while any prior record
/// exists, whatever its status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SerialNumber {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// The manufacturer or house serial printed on the unit.
    pub serial_number: String,

    /// Owning product.
    pub product_id: String,

    /// Current lifecycle status.
    pub status: SerialStatus,

    /// Supplier the unit was received from.
    pub supplier_id: Option<String>,

    /// Accumulated audit notes (registration, transitions).
    pub notes: Option<String>,

    /// When the serial was registered.
    pub created_at: DateTime<Utc>,

    /// When the serial last changed.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Inventory Transaction
// =============================================================================

/// Append-only audit record for one discrete stock movement.
///
/// One row per line item of a workflow: a shipment containing five products
/// produces five rows. Rows are never mutated or deleted after creation.
///
/// The serial list is stored as a typed JSON array column; `notes` carries
/// the same data joined into display text as a convenience.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryTransaction {
    /// Globally unique transaction id (timestamp plus random suffix).
    pub id: String,

    /// Owning inventory record.
    pub inventory_id: String,

    /// Product the movement applies to.
    pub product_id: String,

    /// Kind of movement.
    pub transaction_type: TransactionType,

    /// Non-negative magnitude of the movement.
    pub quantity: i64,

    /// Serials involved in this movement, if any.
    pub serial_numbers: Vec<String>,

    /// Supplier involved in this movement, if any.
    pub supplier_id: Option<String>,

    /// Shipment or return batch reference.
    pub batch_ref: Option<String>,

    /// Denormalized human-readable audit text.
    pub notes: Option<String>,

    /// Business date of the movement.
    pub transaction_date: DateTime<Utc>,

    /// Clerk or system actor that caused the movement.
    pub created_by: Option<String>,

    /// When the row was written.
    pub created_at: DateTime<Utc>,
}

#[cfg(feature = "sqlx")]
impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for InventoryTransaction {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;

        let raw_serials: String = row.try_get("serial_numbers")?;
        let serial_numbers: Vec<String> =
            serde_json::from_str(&raw_serials).map_err(|e| sqlx::Error::ColumnDecode {
                index: "serial_numbers".to_string(),
                source: Box::new(e),
            })?;

        Ok(InventoryTransaction {
            id: row.try_get("id")?,
            inventory_id: row.try_get("inventory_id")?,
            product_id: row.try_get("product_id")?,
            transaction_type: row.try_get("transaction_type")?,
            quantity: row.try_get("quantity")?,
            serial_numbers,
            supplier_id: row.try_get("supplier_id")?,
            batch_ref: row.try_get("batch_ref")?,
            notes: row.try_get("notes")?,
            transaction_date: row.try_get("transaction_date")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Input for appending a transaction row.
///
/// Only the Transaction Recorder turns this into a persisted
/// [`InventoryTransaction`]; workflows never write the table directly.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub inventory_id: String,
    pub product_id: String,
    pub transaction_type: TransactionType,
    pub quantity: i64,
    pub serial_numbers: Vec<String>,
    pub supplier_id: Option<String>,
    pub batch_ref: Option<String>,
    pub notes: Option<String>,
    pub transaction_date: DateTime<Utc>,
    pub created_by: Option<String>,
}

// =============================================================================
// Ledger Adjustment Options
// =============================================================================

/// Optional context for a single ledger adjustment.
///
/// Everything here flows into the emitted audit row; `supplier_id` and
/// `transaction_date` additionally update the inventory record itself.
#[derive(Debug, Clone, Default)]
pub struct AdjustOptions {
    /// Supplier responsible for the movement; updates the record's
    /// `supplier_id` when supplied.
    pub supplier_id: Option<String>,

    /// Business date of the movement; updates `last_restock_date` when
    /// supplied (otherwise positive deltas stamp the current time).
    pub transaction_date: Option<DateTime<Utc>>,

    /// Shipment or return batch reference for the audit row.
    pub batch_ref: Option<String>,

    /// Serials involved in the movement, for the audit row.
    pub serial_numbers: Vec<String>,

    /// Display text for the audit row.
    pub notes: Option<String>,

    /// Clerk or system actor for the audit row.
    pub created_by: Option<String>,
}

// =============================================================================
// Batch Inputs
// =============================================================================

/// One product line inside a receiving batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub product_id: String,
    pub quantity: i64,
    /// Serials to register for this line. May legitimately be empty for
    /// non-serialized products; for serialized products the caller is
    /// responsible for matching the quantity.
    #[serde(default)]
    pub serial_numbers: Vec<String>,
}

/// An incoming shipment spanning one or more products.
///
/// Processed as a single atomic unit of work: either every line commits or
/// none do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptBatch {
    pub supplier_id: String,
    pub received_by: String,
    pub batch_ref: String,
    pub received_date: DateTime<Utc>,
    pub lines: Vec<ReceiptLine>,
}

/// One product line inside a supplier-return batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnLine {
    pub product_id: String,
    /// Units to deduct for a non-serialized return. Ignored for the
    /// deduction when `serial_numbers` is non-empty - there the serials'
    /// statuses drive the arithmetic.
    pub quantity: i64,
    #[serde(default)]
    pub serial_numbers: Vec<String>,
}

/// An outgoing return shipped back to a supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnBatch {
    pub supplier_id: String,
    pub returned_by: String,
    pub return_date: DateTime<Utc>,
    pub reason: String,
    pub lines: Vec<ReturnLine>,
}

// =============================================================================
// Stats
// =============================================================================

/// Read-only rollup across all inventory records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSummary {
    /// Records with `stock > reorder_point`.
    pub in_stock: i64,
    /// Records with `0 < stock <= reorder_point`.
    pub low_stock: i64,
    /// Records with `stock == 0`.
    pub out_of_stock: i64,
    /// All records ever stocked.
    pub total: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use SerialStatus::{Available, Defective, Returned, Sold};

        assert!(Available.can_transition_to(Sold));
        assert!(Available.can_transition_to(Defective));
        assert!(Available.can_transition_to(Returned));
        assert!(Defective.can_transition_to(Returned));

        // No path back to available, ever.
        assert!(!Sold.can_transition_to(Available));
        assert!(!Defective.can_transition_to(Available));
        assert!(!Returned.can_transition_to(Available));

        // Returned is terminal.
        assert!(!Returned.can_transition_to(Sold));
        assert!(!Returned.can_transition_to(Defective));
        assert!(!Returned.can_transition_to(Returned));

        // Sold units never move through this engine.
        assert!(!Sold.can_transition_to(Returned));
        assert!(!Sold.can_transition_to(Defective));

        // Self-transitions are not a thing.
        assert!(!Available.can_transition_to(Available));
    }

    #[test]
    fn test_active_stock_accounting() {
        assert!(SerialStatus::Available.counts_as_active_stock());
        assert!(!SerialStatus::Sold.counts_as_active_stock());
        assert!(!SerialStatus::Defective.counts_as_active_stock());
        assert!(!SerialStatus::Returned.counts_as_active_stock());
    }

    #[test]
    fn test_serial_status_default() {
        assert_eq!(SerialStatus::default(), SerialStatus::Available);
    }

    #[test]
    fn test_low_stock_helpers() {
        let mut record = InventoryRecord {
            id: "r1".to_string(),
            product_id: "P001".to_string(),
            stock: 5,
            reorder_point: 10,
            supplier_id: None,
            last_restock_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(record.is_low_stock());
        assert!(!record.is_out_of_stock());

        record.stock = 0;
        assert!(!record.is_low_stock());
        assert!(record.is_out_of_stock());

        record.stock = 11;
        assert!(!record.is_low_stock());
        assert!(!record.is_out_of_stock());
    }

    #[test]
    fn test_status_serde_wire_names() {
        let json = serde_json::to_string(&SerialStatus::Defective).unwrap();
        assert_eq!(json, "\"defective\"");

        let json = serde_json::to_string(&TransactionType::ReturnToSupplier).unwrap();
        assert_eq!(json, "\"return_to_supplier\"");
    }
}
