//! Vot entity - Expenditure classification (votes of expenditure) a request is charged to.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Vot model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique short code
    #[sea_orm(unique)]
    pub vot_code: String,
    pub vot_description: String,
    /// 1 = active, 2 = inactive
    pub status: i32,
    /// Tombstone for soft deletion
    pub deleted_at: Option<DateTimeUtc>,
}

/// Vot has no navigable relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
