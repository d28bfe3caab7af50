//! Purchase order entity - An order raised against a vendor for an approved request.
//!
//! At most one order exists per approved request (`approved_request_id` is unique).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchase order header model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique order number, `PO-{request id}-{unix timestamp}`
    #[sea_orm(unique)]
    pub po_number: String,
    /// The approved request this order fulfils
    #[sea_orm(unique)]
    pub approved_request_id: i64,
    pub vendor_id: i64,
    /// Sum of the copied item totals
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_price: Decimal,
    /// Order status; starts as `Created`
    pub status: String,
    pub created_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

/// Defines relationships between `PurchaseOrder` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One order has many items
    #[sea_orm(has_many = "super::purchase_order_item::Entity")]
    Items,
    /// The vendor the order is placed with
    #[sea_orm(
        belongs_to = "super::vendor::Entity",
        from = "Column::VendorId",
        to = "super::vendor::Column::Id"
    )]
    Vendor,
    /// The approved request behind the order
    #[sea_orm(
        belongs_to = "super::purchase_request::Entity",
        from = "Column::ApprovedRequestId",
        to = "super::purchase_request::Column::Id"
    )]
    PurchaseRequest,
}

impl Related<super::purchase_order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
