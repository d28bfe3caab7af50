//! Procurement type entity - The procurement method, e.g. direct purchase, quotation, tender.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Procurement type model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "type_procurements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique short code
    #[sea_orm(unique)]
    pub procurement_code: String,
    pub procurement_description: String,
    /// 1 = active, 2 = inactive
    pub status: i32,
    /// Tombstone for soft deletion
    pub deleted_at: Option<DateTimeUtc>,
}

/// Procurement type has no navigable relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
