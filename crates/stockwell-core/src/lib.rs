//! # stockwell-core: Pure Business Logic for the Stock Ledger Engine
//!
//! This crate is the **heart** of Stockwell. It contains the business rules of
//! the stock ledger and serial-number lifecycle as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Stockwell Architecture                       │
//! │                                                                 │
//! │  External callers (receiving clerks, returns processing, ...)  │
//! │       │                                                         │
//! │  ┌────▼────────────────────────────────────────────────────┐   │
//! │  │                stockwell-db (storage layer)             │   │
//! │  │   StockLedger · SerialRegistry · TransactionRecorder    │   │
//! │  │   ReceivingWorkflow · SupplierReturnWorkflow · Stats    │   │
//! │  └────┬────────────────────────────────────────────────────┘   │
//! │       │                                                         │
//! │  ┌────▼────────────────────────────────────────────────────┐   │
//! │  │           ★ stockwell-core (THIS CRATE) ★               │   │
//! │  │                                                         │   │
//! │  │   ┌─────────┐ ┌───────────┐ ┌───────────┐ ┌──────────┐ │   │
//! │  │   │  types  │ │ deduction │ │ validation│ │  error   │ │   │
//! │  │   │ records │ │  planner  │ │   rules   │ │ taxonomy │ │   │
//! │  │   └─────────┘ └───────────┘ └───────────┘ └──────────┘ │   │
//! │  │                                                         │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS    │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (InventoryRecord, SerialNumber, transactions)
//! - [`deduction`] - The smart-deduction planner for supplier returns
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every function is deterministic - same input = same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Closed Enums**: statuses and transaction types are tagged variants, never strings
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod deduction;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use stockwell_core::SerialStatus` instead of
// `use stockwell_core::types::SerialStatus`.

pub use deduction::{plan_serialized_return, ReturnPlan};
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Reorder threshold applied when a product's inventory record is created
/// without an explicit reorder point.
pub const DEFAULT_REORDER_POINT: i64 = 10;

/// Maximum line items allowed in a single receiving or return batch.
///
/// Prevents runaway batches; a real shipment manifest never approaches this.
pub const MAX_BATCH_LINES: usize = 500;

/// Maximum quantity accepted on a single line item.
pub const MAX_LINE_QUANTITY: i64 = 100_000;
