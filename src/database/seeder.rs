//! Schema Seeder
//!
//! Destroys any previous store at the target location and rebuilds it from
//! the embedded dataset inside a single transaction.

use crate::database::connection::Database;
use crate::database::fixtures::Dataset;
use crate::error::{Result, SqlChatError};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode};
use sqlx::{ConnectOptions, Connection};
use std::path::Path;

/// DDL for the three store tables, in creation order
pub const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS SUPPLIERS (
    SUPPLIER_ID INTEGER PRIMARY KEY AUTOINCREMENT,
    NAME TEXT NOT NULL,
    ADDRESS TEXT NOT NULL,
    CONTACT TEXT NOT NULL
)"#,
    r#"CREATE TABLE IF NOT EXISTS PRODUCTS (
    PRODUCT_ID INTEGER PRIMARY KEY AUTOINCREMENT,
    NAME TEXT NOT NULL,
    DESCRIPTION TEXT NOT NULL,
    PRICE REAL NOT NULL,
    SUPPLIER_ID INTEGER NOT NULL,
    FOREIGN KEY (SUPPLIER_ID) REFERENCES SUPPLIERS(SUPPLIER_ID)
)"#,
    r#"CREATE TABLE IF NOT EXISTS INVENTORY (
    INVENTORY_ID INTEGER PRIMARY KEY AUTOINCREMENT,
    PRODUCT_ID INTEGER NOT NULL,
    QUANTITY INTEGER NOT NULL,
    MIN_REQUIRED INTEGER NOT NULL,
    FOREIGN KEY (PRODUCT_ID) REFERENCES PRODUCTS(PRODUCT_ID)
)"#,
];

/// What a seeding run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    /// Whether a store from a previous run was found and deleted
    pub removed_previous: bool,
    pub suppliers: usize,
    pub products: usize,
    pub inventory: usize,
}

impl SeedReport {
    /// One-line status naming the store file
    pub fn removal_message(&self, path: &Path) -> String {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        if self.removed_previous {
            format!("File '{}' found and deleted.", name)
        } else {
            format!("File '{}' does not exist.", name)
        }
    }
}

/// Recreate the store at `path` and populate it with the embedded dataset
pub async fn seed(path: &Path) -> Result<SeedReport> {
    let dataset = Dataset::embedded()?;

    let removed_previous = remove_previous_store(path).await?;
    if removed_previous {
        tracing::info!(path = %path.display(), "removed store from previous run");
    } else {
        tracing::info!(path = %path.display(), "no previous store found");
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete)
        .foreign_keys(true);

    let mut conn = options
        .connect()
        .await
        .map_err(|e| SqlChatError::seed("creating the store", e))?;

    // Close the connection whether or not population succeeded.
    let populated = populate(&mut conn, &dataset).await;
    let closed = conn
        .close()
        .await
        .map_err(|e| SqlChatError::seed("closing the store", e));

    populated?;
    closed?;

    let report = SeedReport {
        removed_previous,
        suppliers: dataset.suppliers.len(),
        products: dataset.products.len(),
        inventory: dataset.inventory.len(),
    };
    tracing::info!(
        suppliers = report.suppliers,
        products = report.products,
        inventory = report.inventory,
        "store seeded"
    );
    Ok(report)
}

/// Seed the store, then open a read-only handle on it
pub async fn bootstrap(path: &Path) -> Result<(SeedReport, Database)> {
    let report = seed(path).await?;
    let database = Database::open(path).await?;
    Ok((report, database))
}

async fn remove_previous_store(path: &Path) -> Result<bool> {
    let exists = tokio::fs::try_exists(path)
        .await
        .map_err(|e| SqlChatError::seed("checking for a previous store", e))?;
    if !exists {
        return Ok(false);
    }

    tokio::fs::remove_file(path)
        .await
        .map_err(|e| SqlChatError::seed("deleting the previous store", e))?;

    // Leftover journal files would otherwise be replayed into the new store.
    for suffix in ["-journal", "-wal", "-shm"] {
        let mut side = path.as_os_str().to_owned();
        side.push(suffix);
        let side = Path::new(&side);
        if tokio::fs::try_exists(side).await.unwrap_or(false) {
            tokio::fs::remove_file(side)
                .await
                .map_err(|e| SqlChatError::seed("deleting a stale journal", e))?;
        }
    }
    Ok(true)
}

async fn populate(conn: &mut SqliteConnection, dataset: &Dataset) -> Result<()> {
    let mut tx = conn
        .begin()
        .await
        .map_err(|e| SqlChatError::seed("starting the transaction", e))?;

    for ddl in SCHEMA {
        sqlx::query(*ddl)
            .execute(&mut *tx)
            .await
            .map_err(|e| SqlChatError::seed("creating tables", e))?;
    }

    for supplier in &dataset.suppliers {
        sqlx::query("INSERT INTO SUPPLIERS (NAME, ADDRESS, CONTACT) VALUES (?, ?, ?)")
            .bind(&supplier.name)
            .bind(&supplier.address)
            .bind(&supplier.contact)
            .execute(&mut *tx)
            .await
            .map_err(|e| SqlChatError::seed("inserting suppliers", e))?;
    }

    for product in &dataset.products {
        sqlx::query(
            "INSERT INTO PRODUCTS (NAME, DESCRIPTION, PRICE, SUPPLIER_ID) VALUES (?, ?, ?, ?)",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.supplier_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| SqlChatError::seed("inserting products", e))?;
    }

    for row in &dataset.inventory {
        sqlx::query("INSERT INTO INVENTORY (PRODUCT_ID, QUANTITY, MIN_REQUIRED) VALUES (?, ?, ?)")
            .bind(row.product_id)
            .bind(row.quantity)
            .bind(row.min_required)
            .execute(&mut *tx)
            .await
            .map_err(|e| SqlChatError::seed("inserting inventory", e))?;
    }

    tx.commit()
        .await
        .map_err(|e| SqlChatError::seed("committing", e))?;
    tracing::debug!("seed transaction committed");
    Ok(())
}
