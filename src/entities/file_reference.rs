//! File reference entity - Filing classification codes, arranged as a parent/child tree.
//!
//! `parent_file_code` points at the parent's `file_code`; top-level codes use `ROOT`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// File reference model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "file_references")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique short code
    #[sea_orm(unique)]
    pub file_code: String,
    pub file_description: String,
    /// Code of the parent file reference
    pub parent_file_code: String,
    /// 1 = active, 2 = inactive
    pub status: i32,
    /// Tombstone for soft deletion
    pub deleted_at: Option<DateTimeUtc>,
}

/// File reference has no navigable relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
