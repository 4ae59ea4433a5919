//! # Seed Data Generator
//!
//! Provisions a development database: a small product catalog and one sample
//! receiving batch, so the ledger, registry and audit trail have data to
//! poke at.
//!
//! ## Usage
//! ```bash
//! cargo run -p stockwell-db --bin seed
//! cargo run -p stockwell-db --bin seed -- --db ./data/stockwell.db
//! ```

use chrono::Utc;
use std::env;
use uuid::Uuid;

use stockwell_core::{ReceiptBatch, ReceiptLine};
use stockwell_db::{Database, DbConfig};

/// (sku, name, requires_serial) for the development catalog.
const CATALOG: &[(&str, &str, bool)] = &[
    ("TV-55-UHD", "55in UHD Television", true),
    ("PHONE-A12", "A12 Smartphone 128GB", true),
    ("LAPTOP-14", "14in Ultrabook", true),
    ("CABLE-HDMI", "HDMI Cable 2m", false),
    ("MOUSE-WL", "Wireless Mouse", false),
    ("BATT-AA4", "AA Batteries 4-pack", false),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./stockwell_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockwell Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./stockwell_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Stockwell Seed Data Generator");
    println!("=============================");
    println!("Database: {db_path}");
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(db.pool())
        .await?;
    if existing > 0 {
        println!("⚠ Database already has {existing} products; skipping seed.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // The catalog belongs to an external collaborator in production; the
    // seeder stands in for it with raw inserts.
    let now = Utc::now();
    let mut product_ids = Vec::new();
    for (sku, name, requires_serial) in CATALOG {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO products (id, sku, name, requires_serial, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
            "#,
        )
        .bind(&id)
        .bind(sku)
        .bind(name)
        .bind(requires_serial)
        .bind(now)
        .execute(db.pool())
        .await?;
        product_ids.push((id, *sku, *requires_serial));
    }
    println!("✓ Seeded {} catalog products", product_ids.len());

    // One sample shipment through the real workflow, serials included for
    // the serial-tracked products.
    let lines = product_ids
        .iter()
        .enumerate()
        .map(|(idx, (id, sku, requires_serial))| {
            let quantity = 5 + (idx as i64 % 3) * 5;
            let serial_numbers = if *requires_serial {
                (0..quantity).map(|n| format!("{sku}-{n:04}")).collect()
            } else {
                Vec::new()
            };
            ReceiptLine {
                product_id: id.clone(),
                quantity,
                serial_numbers,
            }
        })
        .collect();

    let transactions = db
        .receiving()
        .receive(ReceiptBatch {
            supplier_id: "SUP-1".to_string(),
            received_by: "seed".to_string(),
            batch_ref: "SEED-001".to_string(),
            received_date: now,
            lines,
        })
        .await?;
    println!("✓ Received sample batch ({} transactions)", transactions.len());

    let summary = db.stock_summary().await?;
    println!();
    println!(
        "Summary: {} in stock, {} low, {} out, {} total",
        summary.in_stock, summary.low_stock, summary.out_of_stock, summary.total
    );
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
