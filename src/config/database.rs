//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema (including the unique constraint on `purchase_ref_no` that backs
//! reference-code generation) always matches the Rust structs.

use crate::entities::{
    FileReference, Location, PurchaseItem, PurchaseOrder, PurchaseOrderItem, PurchaseRequest,
    Status, TypeProcurement, User, Vendor, Vot,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr,
    EntityTrait, Schema, TransactionTrait,
};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/procurement.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables (if missing) from the entity definitions.
///
/// Catalog and lookup tables are created before the tables that reference them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Status).await?;
    create_table(db, &schema, User).await?;
    create_table(db, &schema, Location).await?;
    create_table(db, &schema, Vot).await?;
    create_table(db, &schema, FileReference).await?;
    create_table(db, &schema, TypeProcurement).await?;
    create_table(db, &schema, Vendor).await?;
    create_table(db, &schema, PurchaseRequest).await?;
    create_table(db, &schema, PurchaseItem).await?;
    create_table(db, &schema, PurchaseOrder).await?;
    create_table(db, &schema, PurchaseOrderItem).await?;

    info!("Database tables ensured");
    Ok(())
}

/// Begins a transaction that already holds the database write lock.
///
/// `SQLite` starts transactions deferred, and a transaction that has read cannot upgrade to
/// a write lock while another writer is active; it fails with "database is locked"
/// without waiting. Writing first makes concurrent writers queue on the busy timeout.
pub async fn begin_write(db: &DatabaseConnection) -> Result<DatabaseTransaction> {
    let txn = db.begin().await?;
    if txn.get_database_backend() == DbBackend::Sqlite {
        txn.execute_unprepared("UPDATE statuses SET id = id WHERE 0").await?;
    }
    Ok(txn)
}

/// Whether `err` is `SQLite` lock contention (`SQLITE_BUSY` / `SQLITE_LOCKED`).
pub fn is_lock_contention(err: &DbErr) -> bool {
    let message = err.to_string();
    message.contains("database is locked") || message.contains("database table is locked")
}
