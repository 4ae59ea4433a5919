//! # Validation Module
//!
//! Input validation for batch line items and identifiers.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                          │
//! │                                                                 │
//! │  Layer 1: Caller (receiving UI, returns processing)             │
//! │  ├── Basic format checks, immediate user feedback               │
//! │           │                                                     │
//! │           ▼                                                     │
//! │  Layer 2: THIS MODULE - structural rules, before any write      │
//! │           │                                                     │
//! │           ▼                                                     │
//! │  Layer 3: Database (SQLite)                                     │
//! │  ├── CHECK (stock >= 0), UNIQUE (serial, product), FKs          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Batch validation runs before the unit of work opens, so a malformed batch
//! never touches storage at all.

use crate::error::ValidationError;
use crate::types::{ReceiptBatch, ReturnBatch};
use crate::{MAX_BATCH_LINES, MAX_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a product identifier.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 64 characters
pub fn validate_product_id(product_id: &str) -> ValidationResult<()> {
    let product_id = product_id.trim();

    if product_id.is_empty() {
        return Err(ValidationError::Required {
            field: "product_id".to_string(),
        });
    }

    if product_id.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "product_id".to_string(),
            max: 64,
        });
    }

    Ok(())
}

/// Validates a serial number string.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 100 characters
/// - Only alphanumeric characters, hyphens, underscores, dots
pub fn validate_serial_number(serial: &str) -> ValidationResult<()> {
    let serial = serial.trim();

    if serial.is_empty() {
        return Err(ValidationError::Required {
            field: "serial_number".to_string(),
        });
    }

    if serial.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "serial_number".to_string(),
            max: 100,
        });
    }

    if !serial
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ValidationError::InvalidFormat {
            field: "serial_number".to_string(),
            reason: "must contain only letters, numbers, hyphens, underscores, and dots"
                .to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_LINE_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Batch Validators
// =============================================================================

/// Structurally validates a receiving batch before the unit of work opens.
///
/// Per line: product id present, quantity positive, serials well-formed.
/// Serial-count/quantity equality is NOT checked here: the caller owns that
/// invariant for serialized products, and the receiving workflow only logs
/// a mismatch.
pub fn validate_receipt_batch(batch: &ReceiptBatch) -> ValidationResult<()> {
    if batch.supplier_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "supplier_id".to_string(),
        });
    }

    if batch.lines.is_empty() || batch.lines.len() > MAX_BATCH_LINES {
        return Err(ValidationError::BadBatchSize {
            max: MAX_BATCH_LINES,
        });
    }

    for line in &batch.lines {
        validate_product_id(&line.product_id)?;
        validate_quantity(line.quantity)?;
        for serial in &line.serial_numbers {
            validate_serial_number(serial)?;
        }
    }

    Ok(())
}

/// Structurally validates a supplier-return batch.
///
/// A non-serialized line (empty serial list) must carry a positive quantity;
/// a serialized line's deduction is driven by the serials' statuses, so its
/// quantity field is not constrained here.
pub fn validate_return_batch(batch: &ReturnBatch) -> ValidationResult<()> {
    if batch.supplier_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "supplier_id".to_string(),
        });
    }

    if batch.lines.is_empty() || batch.lines.len() > MAX_BATCH_LINES {
        return Err(ValidationError::BadBatchSize {
            max: MAX_BATCH_LINES,
        });
    }

    for line in &batch.lines {
        validate_product_id(&line.product_id)?;
        if line.serial_numbers.is_empty() {
            validate_quantity(line.quantity)?;
        } else {
            for serial in &line.serial_numbers {
                validate_serial_number(serial)?;
            }
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ReceiptLine, ReturnLine};
    use chrono::Utc;

    fn receipt(lines: Vec<ReceiptLine>) -> ReceiptBatch {
        ReceiptBatch {
            supplier_id: "SUP-7".to_string(),
            received_by: "clerk-1".to_string(),
            batch_ref: "B100".to_string(),
            received_date: Utc::now(),
            lines,
        }
    }

    #[test]
    fn test_validate_product_id() {
        assert!(validate_product_id("P001").is_ok());
        assert!(validate_product_id("").is_err());
        assert!(validate_product_id("   ").is_err());
        assert!(validate_product_id(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_serial_number() {
        assert!(validate_serial_number("SN-1").is_ok());
        assert!(validate_serial_number("IMEI.35491207").is_ok());
        assert!(validate_serial_number("").is_err());
        assert!(validate_serial_number("has space").is_err());
        assert!(validate_serial_number(&"A".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(100_000).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(100_001).is_err());
    }

    #[test]
    fn test_receipt_batch_rejects_bad_lines() {
        let batch = receipt(vec![]);
        assert!(validate_receipt_batch(&batch).is_err());

        let batch = receipt(vec![ReceiptLine {
            product_id: "P001".to_string(),
            quantity: 0,
            serial_numbers: vec![],
        }]);
        assert!(validate_receipt_batch(&batch).is_err());

        let batch = receipt(vec![ReceiptLine {
            product_id: "P001".to_string(),
            quantity: 2,
            serial_numbers: vec!["SN 1".to_string()],
        }]);
        assert!(validate_receipt_batch(&batch).is_err());
    }

    #[test]
    fn test_receipt_batch_allows_serial_count_mismatch() {
        // Lenient on purpose: the caller owns count-equality for serialized
        // products.
        let batch = receipt(vec![ReceiptLine {
            product_id: "P001".to_string(),
            quantity: 5,
            serial_numbers: vec!["SN-1".to_string(), "SN-2".to_string()],
        }]);
        assert!(validate_receipt_batch(&batch).is_ok());
    }

    #[test]
    fn test_return_batch_quantity_rules() {
        let base = ReturnBatch {
            supplier_id: "SUP-7".to_string(),
            returned_by: "clerk-1".to_string(),
            return_date: Utc::now(),
            reason: "damaged in transit".to_string(),
            lines: vec![],
        };

        // Non-serialized line needs a positive quantity.
        let mut batch = base.clone();
        batch.lines = vec![ReturnLine {
            product_id: "P001".to_string(),
            quantity: 0,
            serial_numbers: vec![],
        }];
        assert!(validate_return_batch(&batch).is_err());

        // Serialized line: serial statuses drive the deduction, quantity is
        // unconstrained.
        let mut batch = base.clone();
        batch.lines = vec![ReturnLine {
            product_id: "P001".to_string(),
            quantity: 0,
            serial_numbers: vec!["SN-1".to_string()],
        }];
        assert!(validate_return_batch(&batch).is_ok());
    }
}
