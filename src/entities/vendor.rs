//! Vendor entity - Suppliers that purchase orders are raised against.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Vendor model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vendors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique short code
    #[sea_orm(unique)]
    pub vendor_code: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// 1 = active, 2 = inactive
    pub status: i32,
    /// Tombstone for soft deletion
    pub deleted_at: Option<DateTimeUtc>,
}

/// Vendor has no navigable relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
