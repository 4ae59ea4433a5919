//! # Owning Components
//!
//! The three components that exclusively own the engine's tables:
//!
//! - [`inventory::StockLedger`] - every `inventory` mutation
//! - [`serial::SerialRegistry`] - every `serial_numbers` mutation
//! - [`transaction::TransactionRecorder`] - every `inventory_transactions` insert
//!
//! Workflows coordinate these but never touch the tables directly. Every
//! method takes an explicit `&mut Transaction<'_, Sqlite>`: the caller owns
//! the unit of work and its begin/commit; a transaction dropped on an error
//! path rolls back.

pub mod inventory;
pub mod serial;
pub mod transaction;
