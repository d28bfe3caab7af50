//! Reference data store - lookup resolution and seeding for the code tables.
//!
//! Locations, vots, file references, procurement types and vendors share one shape at the
//! workflow boundary: a short code, a description and an active flag. Inactive or
//! tombstoned rows still resolve, so historical requests keep their references, but they
//! cannot be selected for new requests.

use crate::{
    config::reference::{
        Config, FileReferenceSeed, LocationSeed, STATUS_ACTIVE, TypeProcurementSeed, VendorSeed,
        VotSeed,
    },
    core::input::normalize_location,
    entities::{
        FileReference, Location, TypeProcurement, Vendor, Vot, file_reference, location,
        type_procurement, vendor, vot,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::fmt;
use tracing::{debug, info, instrument};

/// The kinds of lookup table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Location,
    Vot,
    FileReference,
    TypeProcurement,
    Vendor,
}

impl LookupKind {
    /// Entity label used in `NotFound` errors
    #[must_use]
    pub const fn entity_name(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Vot => "vot",
            Self::FileReference => "file reference",
            Self::TypeProcurement => "type procurement",
            Self::Vendor => "vendor",
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entity_name())
    }
}

/// A resolved lookup row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupEntry {
    pub kind: LookupKind,
    pub id: i64,
    pub code: String,
    pub description: String,
    /// Active flag set and not tombstoned
    pub active: bool,
}

fn is_active(status: i32, deleted_at: Option<&DateTimeUtc>) -> bool {
    status == STATUS_ACTIVE && deleted_at.is_none()
}

impl From<location::Model> for LookupEntry {
    fn from(row: location::Model) -> Self {
        Self {
            kind: LookupKind::Location,
            id: row.id,
            active: is_active(row.status, row.deleted_at.as_ref()),
            code: row.location_iso_code,
            description: row.location_name,
        }
    }
}

impl From<vot::Model> for LookupEntry {
    fn from(row: vot::Model) -> Self {
        Self {
            kind: LookupKind::Vot,
            id: row.id,
            active: is_active(row.status, row.deleted_at.as_ref()),
            code: row.vot_code,
            description: row.vot_description,
        }
    }
}

impl From<file_reference::Model> for LookupEntry {
    fn from(row: file_reference::Model) -> Self {
        Self {
            kind: LookupKind::FileReference,
            id: row.id,
            active: is_active(row.status, row.deleted_at.as_ref()),
            code: row.file_code,
            description: row.file_description,
        }
    }
}

impl From<type_procurement::Model> for LookupEntry {
    fn from(row: type_procurement::Model) -> Self {
        Self {
            kind: LookupKind::TypeProcurement,
            id: row.id,
            active: is_active(row.status, row.deleted_at.as_ref()),
            code: row.procurement_code,
            description: row.procurement_description,
        }
    }
}

impl From<vendor::Model> for LookupEntry {
    fn from(row: vendor::Model) -> Self {
        Self {
            kind: LookupKind::Vendor,
            id: row.id,
            active: is_active(row.status, row.deleted_at.as_ref()),
            code: row.vendor_code,
            description: row.name,
        }
    }
}

/// Resolves a lookup id into its code, description and active flag.
///
/// # Errors
/// `NotFound` when no row with that id exists.
pub async fn resolve<C>(db: &C, kind: LookupKind, id: i64) -> Result<LookupEntry>
where
    C: ConnectionTrait,
{
    let entry = match kind {
        LookupKind::Location => Location::find_by_id(id).one(db).await?.map(Into::into),
        LookupKind::Vot => Vot::find_by_id(id).one(db).await?.map(Into::into),
        LookupKind::FileReference => FileReference::find_by_id(id).one(db).await?.map(Into::into),
        LookupKind::TypeProcurement => {
            TypeProcurement::find_by_id(id).one(db).await?.map(Into::into)
        }
        LookupKind::Vendor => Vendor::find_by_id(id).one(db).await?.map(Into::into),
    };
    entry.ok_or_else(|| Error::not_found(kind.entity_name(), id))
}

/// Resolves a lookup that a new (or changed) request wants to reference.
///
/// # Errors
/// `NotFound` for a missing row, `Validation` on `field` for an inactive one.
pub async fn resolve_selectable<C>(
    db: &C,
    kind: LookupKind,
    id: i64,
    field: &str,
) -> Result<LookupEntry>
where
    C: ConnectionTrait,
{
    let entry = resolve(db, kind, id).await?;
    if !entry.active {
        return Err(Error::validation(
            field,
            format!("The selected {kind} ({}) is not active.", entry.code),
        ));
    }
    Ok(entry)
}

/// Lists the rows of one lookup table that may be selected, ordered by code.
pub async fn list_active(db: &DatabaseConnection, kind: LookupKind) -> Result<Vec<LookupEntry>> {
    let entries: Vec<LookupEntry> = match kind {
        LookupKind::Location => Location::find()
            .filter(location::Column::Status.eq(STATUS_ACTIVE))
            .filter(location::Column::DeletedAt.is_null())
            .order_by_asc(location::Column::LocationIsoCode)
            .all(db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect(),
        LookupKind::Vot => Vot::find()
            .filter(vot::Column::Status.eq(STATUS_ACTIVE))
            .filter(vot::Column::DeletedAt.is_null())
            .order_by_asc(vot::Column::VotCode)
            .all(db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect(),
        LookupKind::FileReference => FileReference::find()
            .filter(file_reference::Column::Status.eq(STATUS_ACTIVE))
            .filter(file_reference::Column::DeletedAt.is_null())
            .order_by_asc(file_reference::Column::FileCode)
            .all(db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect(),
        LookupKind::TypeProcurement => TypeProcurement::find()
            .filter(type_procurement::Column::Status.eq(STATUS_ACTIVE))
            .filter(type_procurement::Column::DeletedAt.is_null())
            .order_by_asc(type_procurement::Column::ProcurementCode)
            .all(db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect(),
        LookupKind::Vendor => Vendor::find()
            .filter(vendor::Column::Status.eq(STATUS_ACTIVE))
            .filter(vendor::Column::DeletedAt.is_null())
            .order_by_asc(vendor::Column::VendorCode)
            .all(db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect(),
    };
    Ok(entries)
}

/// Counts of rows seeded per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub locations: usize,
    pub vots: usize,
    pub file_references: usize,
    pub type_procurements: usize,
    pub vendors: usize,
}

async fn seed_location(db: &DatabaseConnection, seed: &LocationSeed) -> Result<()> {
    let code = normalize_location(&seed.location_iso_code);
    let existing = Location::find()
        .filter(location::Column::LocationIsoCode.eq(code.as_str()))
        .one(db)
        .await?;

    let mut row = existing.map_or_else(
        || location::ActiveModel {
            location_iso_code: Set(code.clone()),
            ..Default::default()
        },
        Into::into,
    );
    row.location_name = Set(seed.location_name.trim().to_uppercase());
    row.parent_iso_code = Set(normalize_location(&seed.parent_iso_code));
    row.status = Set(seed.status);
    row.deleted_at = Set(None);
    row.save(db).await?;
    Ok(())
}

async fn seed_vot(db: &DatabaseConnection, seed: &VotSeed) -> Result<()> {
    let code = seed.vot_code.trim().to_string();
    let existing = Vot::find()
        .filter(vot::Column::VotCode.eq(code.as_str()))
        .one(db)
        .await?;

    let mut row = existing.map_or_else(
        || vot::ActiveModel {
            vot_code: Set(code.clone()),
            ..Default::default()
        },
        Into::into,
    );
    row.vot_description = Set(seed.vot_description.clone());
    row.status = Set(seed.status);
    row.deleted_at = Set(None);
    row.save(db).await?;
    Ok(())
}

async fn seed_file_reference(db: &DatabaseConnection, seed: &FileReferenceSeed) -> Result<()> {
    let code = seed.file_code.trim().to_string();
    let existing = FileReference::find()
        .filter(file_reference::Column::FileCode.eq(code.as_str()))
        .one(db)
        .await?;

    let mut row = existing.map_or_else(
        || file_reference::ActiveModel {
            file_code: Set(code.clone()),
            ..Default::default()
        },
        Into::into,
    );
    row.file_description = Set(seed.file_description.clone());
    row.parent_file_code = Set(seed.parent_file_code.trim().to_string());
    row.status = Set(seed.status);
    row.deleted_at = Set(None);
    row.save(db).await?;
    Ok(())
}

async fn seed_type_procurement(db: &DatabaseConnection, seed: &TypeProcurementSeed) -> Result<()> {
    let code = seed.procurement_code.trim().to_string();
    let existing = TypeProcurement::find()
        .filter(type_procurement::Column::ProcurementCode.eq(code.as_str()))
        .one(db)
        .await?;

    let mut row = existing.map_or_else(
        || type_procurement::ActiveModel {
            procurement_code: Set(code.clone()),
            ..Default::default()
        },
        Into::into,
    );
    row.procurement_description = Set(seed.procurement_description.clone());
    row.status = Set(seed.status);
    row.deleted_at = Set(None);
    row.save(db).await?;
    Ok(())
}

async fn seed_vendor(db: &DatabaseConnection, seed: &VendorSeed) -> Result<()> {
    let code = seed.vendor_code.trim().to_uppercase();
    let existing = Vendor::find()
        .filter(vendor::Column::VendorCode.eq(code.as_str()))
        .one(db)
        .await?;

    let mut row = existing.map_or_else(
        || vendor::ActiveModel {
            vendor_code: Set(code.clone()),
            ..Default::default()
        },
        Into::into,
    );
    row.name = Set(seed.name.clone());
    row.email = Set(seed.email.clone());
    row.phone = Set(seed.phone.clone());
    row.address = Set(seed.address.clone());
    row.status = Set(seed.status);
    row.deleted_at = Set(None);
    row.save(db).await?;
    Ok(())
}

/// Upserts every lookup row from the configuration, restoring tombstoned rows.
///
/// Running it twice with the same configuration leaves the tables unchanged.
#[instrument(skip_all)]
pub async fn seed_reference_data(db: &DatabaseConnection, config: &Config) -> Result<SeedSummary> {
    for seed in &config.locations {
        seed_location(db, seed).await?;
    }
    for seed in &config.vots {
        seed_vot(db, seed).await?;
    }
    for seed in &config.file_references {
        seed_file_reference(db, seed).await?;
    }
    for seed in &config.type_procurements {
        seed_type_procurement(db, seed).await?;
    }
    for seed in &config.vendors {
        seed_vendor(db, seed).await?;
        debug!("Seeded vendor {}", seed.vendor_code);
    }

    let summary = SeedSummary {
        locations: config.locations.len(),
        vots: config.vots.len(),
        file_references: config.file_references.len(),
        type_procurements: config.type_procurements.len(),
        vendors: config.vendors.len(),
    };
    info!(?summary, "Reference data seeded");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::reference::STATUS_INACTIVE;
    use crate::test_utils::setup_test_db;

    fn sample_config() -> Config {
        toml::from_str(
            r#"
            [[locations]]
            location_iso_code = " my-sgr "
            location_name = "Selangor"
            parent_iso_code = "my"

            [[vots]]
            vot_code = "20000"
            vot_description = "Services and Supplies"

            [[vots]]
            vot_code = "50000"
            vot_description = "Other Expenditures"
            status = 2

            [[file_references]]
            file_code = "FIN"
            file_description = "Finance"
            parent_file_code = "ROOT"

            [[type_procurements]]
            procurement_code = "30"
            procurement_description = "Tender"

            [[vendors]]
            vendor_code = "alpha"
            name = "Alpha Supplies Sdn Bhd"
            "#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_seed_reference_data_normalizes_and_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let config = sample_config();

        let summary = seed_reference_data(&db, &config).await?;
        assert_eq!(summary.vots, 2);
        seed_reference_data(&db, &config).await?;

        let locations = Location::find().all(&db).await?;
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].location_iso_code, "MY-SGR");
        assert_eq!(locations[0].location_name, "SELANGOR");
        assert_eq!(locations[0].parent_iso_code, "MY");

        assert_eq!(Vot::find().all(&db).await?.len(), 2);
        let vendors = Vendor::find().all(&db).await?;
        assert_eq!(vendors[0].vendor_code, "ALPHA");
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_restores_tombstoned_rows() -> Result<()> {
        let db = setup_test_db().await?;
        let config = sample_config();
        seed_reference_data(&db, &config).await?;

        let fin = FileReference::find().one(&db).await?.unwrap();
        let mut tombstoned: file_reference::ActiveModel = fin.into();
        tombstoned.deleted_at = Set(Some(chrono::Utc::now()));
        let tombstoned = tombstoned.update(&db).await?;
        assert!(!resolve(&db, LookupKind::FileReference, tombstoned.id).await?.active);

        seed_reference_data(&db, &config).await?;
        assert!(resolve(&db, LookupKind::FileReference, tombstoned.id).await?.active);
        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_and_list_active() -> Result<()> {
        let db = setup_test_db().await?;
        seed_reference_data(&db, &sample_config()).await?;

        let active_vots = list_active(&db, LookupKind::Vot).await?;
        assert_eq!(active_vots.len(), 1);
        assert_eq!(active_vots[0].code, "20000");
        assert_eq!(active_vots[0].description, "Services and Supplies");

        let inactive = Vot::find()
            .filter(vot::Column::Status.eq(STATUS_INACTIVE))
            .one(&db)
            .await?
            .unwrap();
        let entry = resolve(&db, LookupKind::Vot, inactive.id).await?;
        assert!(!entry.active);
        assert_eq!(entry.code, "50000");

        let err = resolve_selectable(&db, LookupKind::Vot, inactive.id, "vot_id")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "vot_id"));

        let missing = resolve(&db, LookupKind::TypeProcurement, 999).await;
        assert!(matches!(
            missing,
            Err(Error::NotFound { entity: "type procurement", .. })
        ));

        let location = list_active(&db, LookupKind::Location).await?;
        assert_eq!(location[0].code, "MY-SGR");
        Ok(())
    }
}
