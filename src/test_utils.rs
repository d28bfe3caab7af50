//! Shared test utilities for `ProcurementDesk`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test fixtures with sensible defaults.

use crate::{
    config::reference::{STATUS_ACTIVE, STATUS_INACTIVE},
    core::{
        input::{ItemInput, RequestHeader},
        status::{RequestStatus, seed_statuses},
        user::create_user,
    },
    entities::{self, User, purchase_request},
    errors::{Error, Result},
    storage::{AttachmentUpload, BlobStorage},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, DatabaseConnection, Set, prelude::*};
use std::{
    collections::HashMap,
    path::Path,
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

/// Creates an in-memory `SQLite` database with all tables initialized and statuses seeded.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    seed_statuses(&db).await?;
    Ok(db)
}

/// Creates a file-backed `SQLite` database under `dir` with a pool of `max_connections`,
/// tables initialized and statuses seeded. Use this when transactions must really overlap;
/// in-memory databases are limited to a single connection.
pub async fn setup_pooled_test_db(dir: &Path, max_connections: u32) -> Result<DatabaseConnection> {
    let url = format!("sqlite://{}?mode=rwc", dir.join("test.sqlite").display());
    let mut options = ConnectOptions::new(url);
    options
        .max_connections(max_connections)
        .min_connections(1)
        .sqlx_logging(false);

    let db = sea_orm::Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    seed_statuses(&db).await?;
    Ok(db)
}

/// Ids of the lookup rows created by [`seed_test_lookups`].
#[derive(Debug, Clone, Copy)]
pub struct TestLookups {
    pub type_procurement_id: i64,
    /// File code `400-11`
    pub file_reference_id: i64,
    /// VOT code `232`
    pub vot_id: i64,
    /// VOT code `999`, inactive
    pub inactive_vot_id: i64,
    pub vendor_id: i64,
    pub inactive_vendor_id: i64,
}

/// Inserts one active row per lookup table plus an inactive VOT and vendor.
pub async fn seed_test_lookups(db: &DatabaseConnection) -> Result<TestLookups> {
    let type_procurement = entities::type_procurement::ActiveModel {
        procurement_code: Set("10".to_string()),
        procurement_description: Set("Supplies".to_string()),
        status: Set(STATUS_ACTIVE),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let file_reference = entities::file_reference::ActiveModel {
        file_code: Set("400-11".to_string()),
        file_description: Set("General procurement".to_string()),
        parent_file_code: Set("400".to_string()),
        status: Set(STATUS_ACTIVE),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let vot = entities::vot::ActiveModel {
        vot_code: Set("232".to_string()),
        vot_description: Set("Office supplies".to_string()),
        status: Set(STATUS_ACTIVE),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let inactive_vot = entities::vot::ActiveModel {
        vot_code: Set("999".to_string()),
        vot_description: Set("Retired".to_string()),
        status: Set(STATUS_INACTIVE),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let vendor = entities::vendor::ActiveModel {
        vendor_code: Set("V-001".to_string()),
        name: Set("Acme Supplies".to_string()),
        email: Set(Some("sales@acme.test".to_string())),
        phone: Set(None),
        address: Set(None),
        status: Set(STATUS_ACTIVE),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let inactive_vendor = entities::vendor::ActiveModel {
        vendor_code: Set("V-002".to_string()),
        name: Set("Dormant Trading".to_string()),
        email: Set(None),
        phone: Set(None),
        address: Set(None),
        status: Set(STATUS_INACTIVE),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(TestLookups {
        type_procurement_id: type_procurement.id,
        file_reference_id: file_reference.id,
        vot_id: vot.id,
        inactive_vot_id: inactive_vot.id,
        vendor_id: vendor.id,
        inactive_vendor_id: inactive_vendor.id,
    })
}

/// Creates a test user located in `MY-SGR` with no staff id.
///
/// # Defaults
/// * `email`: `<name>@example.com`
pub async fn create_test_user(db: &DatabaseConnection, name: &str) -> Result<entities::user::Model> {
    create_user(
        db,
        name.to_string(),
        format!("{}@example.com", name.to_lowercase()),
        None,
        Some("MY-SGR".to_string()),
    )
    .await
}

/// Sets up a database with statuses, lookups and one applicant.
pub async fn setup_with_applicant()
-> Result<(DatabaseConnection, TestLookups, entities::user::Model)> {
    let db = setup_test_db().await?;
    let lookups = seed_test_lookups(&db).await?;
    let applicant = create_test_user(&db, "applicant").await?;
    Ok((db, lookups, applicant))
}

/// A valid header: budget 1000.00, no explicit location.
pub fn sample_header(lookups: &TestLookups) -> RequestHeader {
    RequestHeader {
        title: "Printer toner".to_string(),
        note: Some("Replacement for level 3 printers".to_string()),
        budget: Decimal::new(100_000, 2),
        type_procurement_id: lookups.type_procurement_id,
        file_reference_id: lookups.file_reference_id,
        vot_id: lookups.vot_id,
        location_iso_code: None,
    }
}

/// Two items totalling 350.00.
pub fn sample_items() -> Vec<ItemInput> {
    vec![
        ItemInput::new("Toner cartridge", 2, Decimal::new(15_000, 2)),
        ItemInput::new("Drum unit", 1, Decimal::new(5_000, 2)),
    ]
}

/// Inserts a request row directly, bypassing workflow validation.
///
/// The row belongs to a shared fixture user, created on first use.
pub async fn insert_raw_request(
    db: &DatabaseConnection,
    lookups: &TestLookups,
    location: &str,
    reference_code: &str,
    deleted: bool,
) -> Result<purchase_request::Model> {
    let owner = match User::find()
        .filter(entities::user::Column::Email.eq("fixture@example.com"))
        .one(db)
        .await?
    {
        Some(user) => user,
        None => create_test_user(db, "fixture").await?,
    };

    let now = Utc::now();
    purchase_request::ActiveModel {
        user_id: Set(owner.id),
        applicant_id: Set(format!("U{:05}", owner.id)),
        title: Set("Fixture".to_string()),
        note: Set(None),
        budget: Set(Decimal::new(10_000, 2)),
        location_iso_code: Set(location.to_string()),
        type_procurement_id: Set(lookups.type_procurement_id),
        file_reference_id: Set(lookups.file_reference_id),
        vot_id: Set(lookups.vot_id),
        status_id: Set(RequestStatus::Pending.id()),
        submitted_at: Set(now),
        approved_by: Set(None),
        approved_at: Set(None),
        approval_remarks: Set(None),
        purchase_ref_no: Set(reference_code.to_string()),
        attachment_path: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(deleted.then_some(now)),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// In-memory blob store for tests
#[derive(Debug, Default)]
pub struct MemoryBlobStorage {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    sequence: AtomicU64,
}

impl MemoryBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.lock().map(|blobs| blobs.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, path: &str) -> bool {
        self.blobs
            .lock()
            .map(|blobs| blobs.contains_key(path))
            .unwrap_or_default()
    }
}

fn poisoned() -> Error {
    Error::Io(std::io::Error::other("blob store lock poisoned"))
}

impl BlobStorage for MemoryBlobStorage {
    async fn store(&self, upload: &AttachmentUpload) -> Result<String> {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let ext = upload.extension().unwrap_or_default();
        let path = format!("purchase_requests/{seq}.{ext}");
        self.blobs
            .lock()
            .map_err(|_| poisoned())?
            .insert(path.clone(), upload.bytes.clone());
        Ok(path)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.blobs.lock().map_err(|_| poisoned())?.remove(path);
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.blobs.lock().map_err(|_| poisoned())?.contains_key(path))
    }

    fn url(&self, path: &str) -> String {
        format!("memory://{path}")
    }
}
