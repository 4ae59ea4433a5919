//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! ## Concurrency Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  One Unit of Work per Workflow Call             │
//! │                                                                 │
//! │  receive(batch) ──► BEGIN ── adjust ── register ── ... ── COMMIT│
//! │  return(batch)  ──► BEGIN ── plan ── deduct ── record ── COMMIT │
//! │                                                                 │
//! │  Components (Ledger/Registry/Recorder) never begin or commit:   │
//! │  they operate on the caller's transaction. A transaction        │
//! │  dropped on an error path rolls back, so partial batches are    │
//! │  never visible.                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled:
//! - Readers don't block writers, writers don't block readers
//! - SQLite serializes writers, which is what gives two concurrent
//!   mutations of the same product a defined order; the busy timeout makes
//!   the loser queue instead of failing immediately
//! - Better crash recovery

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use stockwell_core::{InventoryRecord, SerialNumber, StockSummary};

use crate::error::{DbError, DbResult, LedgerResult};
use crate::migrations;
use crate::repository::inventory::StockLedger;
use crate::repository::serial::SerialRegistry;
use crate::repository::transaction::TransactionRecorder;
use crate::stats::StockStats;
use crate::catalog::ProductCatalog;
use crate::workflow::receiving::ReceivingWorkflow;
use crate::workflow::returns::SupplierReturnWorkflow;

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/stockwell.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// How long a writer waits on a locked database before erroring.
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// The file will be created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the writer busy timeout.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let config = DbConfig::in_memory();
    /// let db = Database::new(config).await?;
    /// // Database is isolated, perfect for tests
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing component access.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./stockwell.db")).await?;
///
/// // Run a whole shipment as one unit of work
/// db.receiving().receive(batch).await?;
///
/// // Or compose your own unit of work from components
/// let mut tx = db.begin().await?;
/// let record = db.ledger().get(&mut tx, "P001").await?;
/// tx.commit().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite: WAL mode, NORMAL synchronous, foreign keys on,
    ///    busy timeout for queued writers
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        // sqlite://path with mode=rwc creates the file if not exists
        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            // WAL mode: readers don't block writers and vice versa
            .journal_mode(SqliteJournalMode::Wal)
            // NORMAL synchronous: safe from corruption, may lose the last
            // transaction on a crash
            .synchronous(SqliteSynchronous::Normal)
            // SQLite has foreign keys off by default for backwards compat
            .foreign_keys(true)
            // Same-key writers queue here instead of failing immediately
            .busy_timeout(config.busy_timeout)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations.
    ///
    /// Idempotent; automatically called by `new()` unless disabled in the
    /// config.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    ///
    /// For advanced queries not covered by the components. Prefer component
    /// methods when available.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Begins a new unit of work.
    ///
    /// Every component method takes the returned transaction explicitly;
    /// dropping it without `commit()` rolls everything back.
    pub async fn begin(&self) -> DbResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Returns the stock ledger (aggregate quantity owner).
    pub fn ledger(&self) -> StockLedger {
        StockLedger::new()
    }

    /// Returns the serial registry (per-unit lifecycle owner).
    pub fn serials(&self) -> SerialRegistry {
        SerialRegistry::new()
    }

    /// Returns the transaction recorder (audit trail owner).
    pub fn recorder(&self) -> TransactionRecorder {
        TransactionRecorder::new()
    }

    /// Returns the read-only product catalog surface.
    pub fn catalog(&self) -> ProductCatalog {
        ProductCatalog::new()
    }

    /// Returns the receiving workflow (bulk stock-in).
    pub fn receiving(&self) -> ReceivingWorkflow {
        ReceivingWorkflow::new(self.pool.clone())
    }

    /// Returns the supplier-return workflow.
    pub fn returns(&self) -> SupplierReturnWorkflow {
        SupplierReturnWorkflow::new(self.pool.clone())
    }

    /// Returns the read-only stats aggregator.
    pub fn stats(&self) -> StockStats {
        StockStats::new(self.pool.clone())
    }

    // =========================================================================
    // Convenience Reads
    // =========================================================================
    // Short-transaction wrappers for callers that only want a lookup and
    // don't compose a unit of work of their own.

    /// Fetches the inventory record for a product, if it was ever stocked.
    pub async fn inventory(&self, product_id: &str) -> LedgerResult<Option<InventoryRecord>> {
        let mut tx = self.begin().await?;
        let record = self.ledger().get(&mut tx, product_id).await?;
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(record)
    }

    /// Lists a product's serials with status `available`.
    pub async fn available_serials(&self, product_id: &str) -> LedgerResult<Vec<SerialNumber>> {
        let mut tx = self.begin().await?;
        let serials = self.serials().available_serials(&mut tx, product_id).await?;
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(serials)
    }

    /// Computes the in/low/out-of-stock rollup.
    pub async fn stock_summary(&self) -> DbResult<StockSummary> {
        self.stats().summary().await
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Closes the database connection pool.
    ///
    /// After calling close, all component operations will fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
