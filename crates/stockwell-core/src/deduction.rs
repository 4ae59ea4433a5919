//! # Smart Deduction Planner
//!
//! The distinguishing business rule of the supplier-return workflow: which
//! returned serials actually decrement active stock.
//!
//! ## The Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              Serialized Supplier Return                         │
//! │                                                                 │
//! │  For each serial in the return line:                            │
//! │                                                                 │
//! │  available ──► counts toward the deduction (it was active)      │
//! │  defective ──► contributes 0 (already excluded when flagged)    │
//! │  sold      ──► InvalidReturnState (belongs to sales returns)    │
//! │  returned  ──► InvalidReturnState (already gone)                │
//! │                                                                 │
//! │  Every accepted serial then transitions to `returned`.          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A defective unit left the active-stock count when it was flagged;
//! deducting it again on the physical return would double-count the loss and
//! could drive stock negative. The planner exists to prevent exactly that.
//!
//! This module is pure: it looks at statuses and produces a plan. The return
//! workflow loads the serials, runs the planner, and applies the plan inside
//! its transaction.

use crate::error::{CoreError, CoreResult};
use crate::types::{SerialNumber, SerialStatus};

/// The computed outcome of planning a serialized return line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnPlan {
    /// Units to subtract from active stock (one per `available` serial).
    pub quantity_to_deduct: i64,
    /// Serials to transition to `returned`, in input order.
    pub serials_to_return: Vec<String>,
}

/// Plans a serialized return line from the serials' current statuses.
///
/// Fails with [`CoreError::InvalidReturnState`] if any serial is `sold` or
/// already `returned` - such a unit cannot reach a supplier through this
/// path. The caller is responsible for having resolved each requested serial
/// against the registry first (a missing serial is `SerialNotFound` at that
/// stage, before planning).
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use stockwell_core::deduction::plan_serialized_return;
/// use stockwell_core::types::{SerialNumber, SerialStatus};
///
/// let serial = |n: &str, status| SerialNumber {
///     id: n.to_string(),
///     serial_number: n.to_string(),
///     product_id: "P001".to_string(),
///     status,
///     supplier_id: None,
///     notes: None,
///     created_at: Utc::now(),
///     updated_at: Utc::now(),
/// };
///
/// let plan = plan_serialized_return(&[
///     serial("S1", SerialStatus::Available),
///     serial("S2", SerialStatus::Defective),
/// ])
/// .unwrap();
///
/// // Only the available unit decrements stock; both go back to the supplier.
/// assert_eq!(plan.quantity_to_deduct, 1);
/// assert_eq!(plan.serials_to_return, vec!["S1", "S2"]);
/// ```
pub fn plan_serialized_return(serials: &[SerialNumber]) -> CoreResult<ReturnPlan> {
    let mut quantity_to_deduct = 0i64;
    let mut serials_to_return = Vec::with_capacity(serials.len());

    for serial in serials {
        match serial.status {
            SerialStatus::Available => {
                quantity_to_deduct += 1;
            }
            SerialStatus::Defective => {
                // Already excluded from active stock when it was flagged.
            }
            SerialStatus::Sold | SerialStatus::Returned => {
                return Err(CoreError::InvalidReturnState {
                    serial: serial.serial_number.clone(),
                    status: serial.status,
                });
            }
        }
        serials_to_return.push(serial.serial_number.clone());
    }

    Ok(ReturnPlan {
        quantity_to_deduct,
        serials_to_return,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
