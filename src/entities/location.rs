//! Location entity - ISO-style location codes forming a tree (country, state, district, office).
//!
//! Codes are stored trimmed and uppercased. The root row points at itself.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Location model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique short code
    #[sea_orm(unique)]
    pub location_iso_code: String,
    pub location_name: String,
    /// ISO code of the parent location
    pub parent_iso_code: String,
    /// 1 = active, 2 = inactive
    pub status: i32,
    /// Tombstone for soft deletion
    pub deleted_at: Option<DateTimeUtc>,
}

/// Location has no navigable relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
