//! Shared helpers for the crate's tests: an isolated in-memory database and
//! catalog/stock seeding.
//!
//! The catalog is owned by an external collaborator in production, so tests
//! seed `products` with raw SQL rather than through any engine API.

use chrono::Utc;

use stockwell_core::AdjustOptions;

use crate::pool::{Database, DbConfig};

/// Fresh in-memory database with migrations applied.
pub(crate) async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// Seeds one catalog product.
pub(crate) async fn seed_product(db: &Database, product_id: &str, requires_serial: bool) {
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO products (id, sku, name, requires_serial, is_active, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
        "#,
    )
    .bind(product_id)
    .bind(format!("SKU-{product_id}"))
    .bind(format!("Test product {product_id}"))
    .bind(requires_serial)
    .bind(now)
    .execute(db.pool())
    .await
    .unwrap();
}

/// Stocks a product through the ledger; returns the inventory record id.
pub(crate) async fn stock_product(db: &Database, product_id: &str, stock: i64) -> String {
    stock_product_with_reorder(db, product_id, stock, 10).await
}

/// Stocks a product with an explicit reorder point.
pub(crate) async fn stock_product_with_reorder(
    db: &Database,
    product_id: &str,
    stock: i64,
    reorder_point: i64,
) -> String {
    let mut tx = db.begin().await.unwrap();
    let (record, _) = db
        .ledger()
        .adjust(
            &mut tx,
            product_id,
            stock,
            Some(reorder_point),
            AdjustOptions::default(),
        )
        .await
        .unwrap();
    tx.commit().await.unwrap();
    record.id
}
