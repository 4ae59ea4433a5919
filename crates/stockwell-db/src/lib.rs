//! # stockwell-db: Storage Layer for the Stock Ledger Engine
//!
//! This crate provides database access for Stockwell. It uses SQLite for
//! local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Stockwell Data Flow                         │
//! │                                                                 │
//! │  External caller (receiving clerk, returns processing)          │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 stockwell-db (THIS CRATE)               │   │
//! │  │                                                         │   │
//! │  │  Workflows          Components           Infrastructure │   │
//! │  │  ┌──────────────┐   ┌────────────────┐   ┌────────────┐ │   │
//! │  │  │ Receiving    │──►│ StockLedger    │   │ pool.rs    │ │   │
//! │  │  │ SupplierRet. │──►│ SerialRegistry │   │ migrations │ │   │
//! │  │  └──────────────┘   │ TxnRecorder    │   │ error.rs   │ │   │
//! │  │  ┌──────────────┐   │ ProductCatalog │   └────────────┘ │   │
//! │  │  │ StockStats   │   └────────────────┘                  │   │
//! │  │  └──────────────┘                                       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  SQLite (WAL mode, foreign keys, busy timeout)                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and the [`Database`] facade
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage error types and the combined [`LedgerError`]
//! - [`repository`] - The three owning components (ledger, registry, recorder)
//! - [`workflow`] - Receiving and supplier-return orchestrations
//! - [`stats`] - Read-only reporting rollup
//! - [`catalog`] - Read surface over the external product catalog
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockwell_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/stockwell.db")).await?;
//!
//! // One atomic unit of work per workflow call
//! db.receiving().receive(shipment).await?;
//! db.returns().return_to_supplier(rma).await?;
//!
//! // Read surfaces
//! let summary = db.stock_summary().await?;
//! let serials = db.available_serials("P001").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod stats;
pub mod workflow;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, LedgerError, LedgerResult};
pub use pool::{Database, DbConfig};

// Component re-exports for convenience
pub use catalog::ProductCatalog;
pub use repository::inventory::StockLedger;
pub use repository::serial::SerialRegistry;
pub use repository::transaction::TransactionRecorder;
pub use stats::StockStats;
pub use workflow::receiving::ReceivingWorkflow;
pub use workflow::returns::SupplierReturnWorkflow;
