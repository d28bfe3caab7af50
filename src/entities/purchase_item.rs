//! Purchase item entity - One line item of a purchase request.
//!
//! Items are owned by exactly one request and are replaced as a whole set on update.
//! `total_price` is `quantity * unit_price` unless the submitter supplied an explicit value.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchase item model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning request
    pub purchase_request_id: i64,
    /// Copy of the owning request's reference number, for reporting
    pub purchase_ref_no: Option<String>,
    pub item_name: String,
    pub item_code: Option<String>,
    pub purpose: Option<String>,
    /// Unit of measure, e.g. `pcs`, `box`, `kg`
    pub unit: Option<String>,
    pub quantity: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub unit_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_price: Decimal,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    /// Tombstone, set when the owning request is deleted
    pub deleted_at: Option<DateTimeUtc>,
}

/// Defines relationships between `PurchaseItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one purchase request
    #[sea_orm(
        belongs_to = "super::purchase_request::Entity",
        from = "Column::PurchaseRequestId",
        to = "super::purchase_request::Column::Id",
        on_delete = "Cascade"
    )]
    PurchaseRequest,
}

impl Related<super::purchase_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
