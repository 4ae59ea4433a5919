//! # Workflows
//!
//! The two orchestrations external callers invoke:
//!
//! - [`receiving::ReceivingWorkflow`] - bulk stock-in for an incoming shipment
//! - [`returns::SupplierReturnWorkflow`] - outgoing returns with smart deduction
//!
//! Each call is one atomic unit of work: the workflow begins a transaction,
//! drives the Ledger, Registry and Recorder on it, and commits or rolls back
//! as a whole. Nothing partially commits.

pub mod receiving;
pub mod returns;
