//! Purchase request entity - The aggregate root of the approval workflow.
//!
//! A request is owned by the submitting user, carries its budget ceiling and lookup
//! references, and moves through the status catalog exactly once (Pending to Approved or
//! Rejected). `purchase_ref_no` is generated at submission and never rewritten.
//! Deletion is a tombstone (`deleted_at`), so rows stay countable for code generation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchase request header model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_requests")]
pub struct Model {
    /// Surrogate identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user account
    pub user_id: i64,
    /// Staff identifier of the applicant at submission time
    pub applicant_id: String,
    /// Short title of the request
    pub title: String,
    /// Free-text note
    pub note: Option<String>,
    /// Declared budget ceiling
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub budget: Decimal,
    /// Uppercase location scope tag (may be empty)
    pub location_iso_code: String,
    /// Procurement method
    pub type_procurement_id: i64,
    /// Filing classification
    pub file_reference_id: i64,
    /// Expenditure classification
    pub vot_id: i64,
    /// Foreign key into the `statuses` catalog
    pub status_id: i32,
    /// When the request was first submitted
    pub submitted_at: DateTimeUtc,
    /// User id of the approver who decided the request
    pub approved_by: Option<i64>,
    /// When the decision was recorded
    pub approved_at: Option<DateTimeUtc>,
    /// Optional remarks left with the decision
    pub approval_remarks: Option<String>,
    /// Generated reference number, unique across all requests
    #[sea_orm(unique)]
    pub purchase_ref_no: String,
    /// Path of the stored attachment, if any
    pub attachment_path: Option<String>,
    /// Row creation time
    pub created_at: DateTimeUtc,
    /// Last modification time
    pub updated_at: DateTimeUtc,
    /// Tombstone; set when the request is deleted
    pub deleted_at: Option<DateTimeUtc>,
}

/// Defines relationships between `PurchaseRequest` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One request has many line items
    #[sea_orm(has_many = "super::purchase_item::Entity")]
    Items,
    /// Each request is owned by one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Current workflow status
    #[sea_orm(
        belongs_to = "super::status::Entity",
        from = "Column::StatusId",
        to = "super::status::Column::Id"
    )]
    Status,
    /// Referenced vot
    #[sea_orm(
        belongs_to = "super::vot::Entity",
        from = "Column::VotId",
        to = "super::vot::Column::Id"
    )]
    Vot,
    /// Referenced file reference
    #[sea_orm(
        belongs_to = "super::file_reference::Entity",
        from = "Column::FileReferenceId",
        to = "super::file_reference::Column::Id"
    )]
    FileReference,
    /// Referenced procurement type
    #[sea_orm(
        belongs_to = "super::type_procurement::Entity",
        from = "Column::TypeProcurementId",
        to = "super::type_procurement::Column::Id"
    )]
    TypeProcurement,
}

impl Related<super::purchase_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Status.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
