//! Status entity - The fixed catalog of workflow states.
//!
//! Seeded once with Pending, Approved and Rejected. Requests reference it by id.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status catalog model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "statuses")]
pub struct Model {
    /// Stable identifier, assigned by the seeder rather than auto-incremented
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    /// Unique status name (`Pending`, `Approved`, `Rejected`)
    #[sea_orm(unique)]
    pub name: String,
    /// Human-readable description
    pub description: Option<String>,
}

/// Defines relationships between Status and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One status is referenced by many requests
    #[sea_orm(has_many = "super::purchase_request::Entity")]
    PurchaseRequests,
}

impl Related<super::purchase_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
