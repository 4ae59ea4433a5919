//! # Serial Registry
//!
//! The single owner of `serial_numbers` mutation: registration during
//! receiving, and status transitions along the closed lifecycle.
//!
//! ## Lifecycle
//! ```text
//!               ┌──────► sold
//!               │
//!  available ───┼──────► defective ───► returned
//!               │                          ▲
//!               └──────────────────────────┘
//! ```
//!
//! A serial is never re-registered for the same product while any prior
//! record exists, and never moves back to `available`.

use chrono::Utc;
use sqlx::{Sqlite, Transaction};
use tracing::debug;
use uuid::Uuid;

use stockwell_core::{CoreError, SerialNumber, SerialStatus};

use crate::error::{DbError, DbResult, LedgerResult};

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, serial_number, product_id, status, supplier_id,
        notes, created_at, updated_at
    FROM serial_numbers
"#;

/// Repository owning per-unit serial lifecycle state.
#[derive(Debug, Clone, Default)]
pub struct SerialRegistry;

impl SerialRegistry {
    /// Creates a new SerialRegistry.
    pub fn new() -> Self {
        SerialRegistry
    }

    /// Registers a new serialized unit with status `available`.
    ///
    /// Fails with `DuplicateSerial` if the (serial, product) pair already
    /// exists in any status; the composite UNIQUE index backs this check at
    /// the storage layer.
    pub async fn register(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        serial_number: &str,
        product_id: &str,
        supplier_id: Option<&str>,
        note: Option<&str>,
    ) -> LedgerResult<SerialNumber> {
        if self.lookup(tx, serial_number, product_id).await?.is_some() {
            return Err(CoreError::DuplicateSerial {
                serial: serial_number.to_string(),
                product_id: product_id.to_string(),
            }
            .into());
        }

        let now = Utc::now();
        let serial = SerialNumber {
            id: Uuid::new_v4().to_string(),
            serial_number: serial_number.to_string(),
            product_id: product_id.to_string(),
            status: SerialStatus::Available,
            supplier_id: supplier_id.map(str::to_string),
            notes: note.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        debug!(
            serial = %serial_number,
            product_id = %product_id,
            "Registering serial"
        );

        sqlx::query(
            r#"
            INSERT INTO serial_numbers (
                id, serial_number, product_id, status, supplier_id,
                notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&serial.id)
        .bind(&serial.serial_number)
        .bind(&serial.product_id)
        .bind(serial.status)
        .bind(&serial.supplier_id)
        .bind(&serial.notes)
        .bind(serial.created_at)
        .bind(serial.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        Ok(serial)
    }

    /// Looks up a serial for a product.
    pub async fn lookup(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        serial_number: &str,
        product_id: &str,
    ) -> DbResult<Option<SerialNumber>> {
        let serial = sqlx::query_as::<_, SerialNumber>(&format!(
            "{SELECT_COLUMNS} WHERE serial_number = ?1 AND product_id = ?2"
        ))
        .bind(serial_number)
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(serial)
    }

    /// Moves a serial to `new_status`, enforcing the transition table.
    ///
    /// Fails with `SerialNotFound` for an unknown pair and
    /// `InvalidTransition` for a move the table forbids. The transition note
    /// is appended to the serial's accumulated notes.
    pub async fn transition(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        serial_number: &str,
        product_id: &str,
        new_status: SerialStatus,
        note: Option<&str>,
    ) -> LedgerResult<SerialNumber> {
        let mut serial = self
            .lookup(tx, serial_number, product_id)
            .await?
            .ok_or_else(|| CoreError::SerialNotFound {
                serial: serial_number.to_string(),
                product_id: product_id.to_string(),
            })?;

        if !serial.status.can_transition_to(new_status) {
            return Err(CoreError::InvalidTransition {
                serial: serial_number.to_string(),
                from: serial.status,
                to: new_status,
            }
            .into());
        }

        let previous = serial.status;
        let now = Utc::now();
        let new_notes = match (&serial.notes, note) {
            (Some(existing), Some(added)) => Some(format!("{existing}\n{added}")),
            (None, Some(added)) => Some(added.to_string()),
            (existing, None) => existing.clone(),
        };

        // Status predicate guards against a concurrent transition of the
        // same unit committing between our read and this write.
        let result = sqlx::query(
            r#"
            UPDATE serial_numbers SET
                status = ?4,
                notes = ?5,
                updated_at = ?6
            WHERE serial_number = ?1 AND product_id = ?2 AND status = ?3
            "#,
        )
        .bind(serial_number)
        .bind(product_id)
        .bind(previous)
        .bind(new_status)
        .bind(&new_notes)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DbError::TransactionFailed(format!(
                "serial {serial_number} changed status concurrently"
            ))
            .into());
        }

        debug!(
            serial = %serial_number,
            product_id = %product_id,
            from = ?previous,
            to = ?new_status,
            "Serial transition"
        );

        serial.status = new_status;
        serial.notes = new_notes;
        serial.updated_at = now;

        Ok(serial)
    }

    /// Lists a product's serials with status `available`.
    pub async fn available_serials(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        product_id: &str,
    ) -> DbResult<Vec<SerialNumber>> {
        let serials = sqlx::query_as::<_, SerialNumber>(&format!(
            "{SELECT_COLUMNS} WHERE product_id = ?1 AND status = ?2 ORDER BY serial_number"
        ))
        .bind(product_id)
        .bind(SerialStatus::Available)
        .fetch_all(&mut **tx)
        .await?;

        Ok(serials)
    }

    /// Lists every serial registered for a product, any status.
    pub async fn serials_for_product(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        product_id: &str,
    ) -> DbResult<Vec<SerialNumber>> {
        let serials = sqlx::query_as::<_, SerialNumber>(&format!(
            "{SELECT_COLUMNS} WHERE product_id = ?1 ORDER BY serial_number"
        ))
        .bind(product_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(serials)
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

    #[tokio::test]
    async fn test_register_and_lookup() {
        let db = test_db().await;
        seed_product(&db, "P002", true).await;

        let mut tx = db.begin().await.unwrap();
        let registry = db.serials();

        let serial = registry
            .register(&mut tx, "SN-1", "P002", Some("SUP-7"), Some("batch B100"))
            .await
            .unwrap();
        assert_eq!(serial.status, SerialStatus::Available);

        let found = registry.lookup(&mut tx, "SN-1", "P002").await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().supplier_id.as_deref(), Some("SUP-7"));

        assert!(registry
            .lookup(&mut tx, "SN-2", "P002")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let db = test_db().await;
        seed_product(&db, "P002", true).await;

        let mut tx = db.begin().await.unwrap();
        let registry = db.serials();

        registry
            .register(&mut tx, "SN-1", "P002", None, None)
            .await
            .unwrap();

        let err = registry
            .register(&mut tx, "SN-1", "P002", None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::DuplicateSerial { .. })
        ));
    }

    #[tokio::test]
    async fn test_same_serial_different_products_is_fine() {
        let db = test_db().await;
        seed_product(&db, "P002", true).await;
        seed_product(&db, "P003", true).await;

        let mut tx = db.begin().await.unwrap();
        let registry = db.serials();

        registry
            .register(&mut tx, "SN-1", "P002", None, None)
            .await
            .unwrap();
        registry
            .register(&mut tx, "SN-1", "P003", None, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_transition_table_enforced() {
        let db = test_db().await;
        seed_product(&db, "P002", true).await;

        let mut tx = db.begin().await.unwrap();
        let registry = db.serials();

        registry
            .register(&mut tx, "SN-1", "P002", None, None)
            .await
            .unwrap();

        // available → defective → returned succeeds.
        let serial = registry
            .transition(
                &mut tx,
                "SN-1",
                "P002",
                SerialStatus::Defective,
                Some("customer reported dead pixel"),
            )
            .await
            .unwrap();
        assert_eq!(serial.status, SerialStatus::Defective);

        let serial = registry
            .transition(&mut tx, "SN-1", "P002", SerialStatus::Returned, None)
            .await
            .unwrap();
        assert_eq!(serial.status, SerialStatus::Returned);

        // returned → * always fails.
        for next in [
            SerialStatus::Available,
            SerialStatus::Sold,
            SerialStatus::Defective,
            SerialStatus::Returned,
        ] {
            let err = registry
                .transition(&mut tx, "SN-1", "P002", next, None)
                .await
                .unwrap_err();
            assert!(
                matches!(err, LedgerError::Core(CoreError::InvalidTransition { .. })),
                "returned → {next:?} should be invalid"
            );
        }
    }

    #[tokio::test]
    async fn test_no_transition_back_to_available() {
        let db = test_db().await;
        seed_product(&db, "P002", true).await;

        let mut tx = db.begin().await.unwrap();
        let registry = db.serials();

        registry
            .register(&mut tx, "SN-1", "P002", None, None)
            .await
            .unwrap();
        registry
            .transition(&mut tx, "SN-1", "P002", SerialStatus::Sold, None)
            .await
            .unwrap();

        let err = registry
            .transition(&mut tx, "SN-1", "P002", SerialStatus::Available, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_transition_of_unknown_serial() {
        let db = test_db().await;
        seed_product(&db, "P002", true).await;

        let mut tx = db.begin().await.unwrap();
        let err = db
            .serials()
            .transition(&mut tx, "SN-404", "P002", SerialStatus::Sold, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::SerialNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_transition_notes_accumulate() {
        let db = test_db().await;
        seed_product(&db, "P002", true).await;

        let mut tx = db.begin().await.unwrap();
        let registry = db.serials();

        registry
            .register(&mut tx, "SN-1", "P002", None, Some("received in B100"))
            .await
            .unwrap();
        let serial = registry
            .transition(
                &mut tx,
                "SN-1",
                "P002",
                SerialStatus::Defective,
                Some("failed power-on test"),
            )
            .await
            .unwrap();

        let notes = serial.notes.unwrap();
        assert!(notes.contains("received in B100"));
        assert!(notes.contains("failed power-on test"));
    }

    #[tokio::test]
    async fn test_available_serials_filters_by_status() {
        let db = test_db().await;
        seed_product(&db, "P002", true).await;

        let mut tx = db.begin().await.unwrap();
        let registry = db.serials();

        for sn in ["SN-1", "SN-2", "SN-3"] {
            registry
                .register(&mut tx, sn, "P002", None, None)
                .await
                .unwrap();
        }
        registry
            .transition(&mut tx, "SN-2", "P002", SerialStatus::Sold, None)
            .await
            .unwrap();

        let available = registry.available_serials(&mut tx, "P002").await.unwrap();
        let numbers: Vec<&str> = available.iter().map(|s| s.serial_number.as_str()).collect();
        assert_eq!(numbers, vec!["SN-1", "SN-3"]);

        let all = registry.serials_for_product(&mut tx, "P002").await.unwrap();
        assert_eq!(all.len(), 3);
    }
}
