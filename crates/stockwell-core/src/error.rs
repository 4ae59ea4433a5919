//! # Error Types
//!
//! Domain-specific error types for stockwell-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Error Types                             │
//! │                                                                 │
//! │  stockwell-core errors (this file)                              │
//! │  ├── CoreError        - Business rule violations                │
//! │  └── ValidationError  - Input validation failures               │
//! │                                                                 │
//! │  stockwell-db errors (separate crate)                           │
//! │  ├── DbError          - Storage operation failures              │
//! │  └── LedgerError      - Core | Db, returned by workflows        │
//! │                                                                 │
//! │  Flow: ValidationError → CoreError → LedgerError → caller       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, serial, quantities)
//! 3. Errors are enum variants, never String
//! 4. Any error raised mid-batch aborts the enclosing transaction

use thiserror::Error;

use crate::types::SerialStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations detected while mutating
/// stock or serial state. They are raised synchronously inside the workflow
/// that detects them and abort the enclosing unit of work.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Referenced product does not exist in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Referenced serial number does not exist for the given product.
    #[error("Serial {serial} not found for product {product_id}")]
    SerialNotFound { serial: String, product_id: String },

    /// Serial already registered for that product.
    ///
    /// A serial cannot be re-registered for the same product while any prior
    /// record exists, whatever its status.
    #[error("Serial {serial} already registered for product {product_id}")]
    DuplicateSerial { serial: String, product_id: String },

    /// Serial status does not permit the requested transition.
    ///
    /// The transition table is closed:
    /// `available → sold | defective | returned`, `defective → returned`.
    #[error("Serial {serial} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        serial: String,
        from: SerialStatus,
        to: SerialStatus,
    },

    /// Serial status does not permit a supplier return.
    ///
    /// Only `available` and `defective` units can be sent back to a supplier
    /// through this engine; `sold` units belong to the sales-return flow.
    #[error("Serial {serial} is {status:?} and cannot be returned to a supplier")]
    InvalidReturnState { serial: String, status: SerialStatus },

    /// A guarded subtraction would drive stock negative.
    ///
    /// ## User Workflow
    /// ```text
    /// Return 3 units of P001
    ///      │
    ///      ▼
    /// Check stock: available=1
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: "P001", available: 1, requested: 3 }
    ///      │
    ///      ▼
    /// UI shows: "Only 1 unit of P001 in stock"
    /// ```
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when a line item or identifier doesn't meet
/// requirements. Used for early validation before any storage write.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., serial with forbidden characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A batch contains no line items, or too many.
    #[error("batch must contain between 1 and {max} line items")]
    BadBatchSize { max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: "P001".to_string(),
            available: 1,
            requested: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for P001: available 1, requested 3"
        );

        let err = CoreError::DuplicateSerial {
            serial: "SN-1".to_string(),
            product_id: "P002".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Serial SN-1 already registered for product P002"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "product_id".to_string(),
        };
        assert_eq!(err.to_string(), "product_id is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "product_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
