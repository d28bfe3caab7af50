//! User entity - Accounts that submit and decide purchase requests.
//!
//! Authentication lives elsewhere; this table only carries what the workflow needs:
//! the staff identifier stamped on requests and the user's default location.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    /// Human-readable staff identifier, assigned lazily on first submission
    #[sea_orm(unique)]
    pub staff_id: Option<String>,
    /// Default location scope for this user's requests
    pub location_iso_code: Option<String>,
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user owns many purchase requests
    #[sea_orm(has_many = "super::purchase_request::Entity")]
    PurchaseRequests,
}

impl Related<super::purchase_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
