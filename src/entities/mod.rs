//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod file_reference;
pub mod location;
pub mod purchase_item;
pub mod purchase_order;
pub mod purchase_order_item;
pub mod purchase_request;
pub mod status;
pub mod type_procurement;
pub mod user;
pub mod vendor;
pub mod vot;

// Re-export specific types to avoid conflicts
pub use file_reference::{
    Column as FileReferenceColumn, Entity as FileReference, Model as FileReferenceModel,
};
pub use location::{Column as LocationColumn, Entity as Location, Model as LocationModel};
pub use purchase_item::{
    Column as PurchaseItemColumn, Entity as PurchaseItem, Model as PurchaseItemModel,
};
pub use purchase_order::{
    Column as PurchaseOrderColumn, Entity as PurchaseOrder, Model as PurchaseOrderModel,
};
pub use purchase_order_item::{
    Column as PurchaseOrderItemColumn, Entity as PurchaseOrderItem,
    Model as PurchaseOrderItemModel,
};
pub use purchase_request::{
    Column as PurchaseRequestColumn, Entity as PurchaseRequest, Model as PurchaseRequestModel,
};
pub use status::{Column as StatusColumn, Entity as Status, Model as StatusModel};
pub use type_procurement::{
    Column as TypeProcurementColumn, Entity as TypeProcurement, Model as TypeProcurementModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
pub use vendor::{Column as VendorColumn, Entity as Vendor, Model as VendorModel};
pub use vot::{Column as VotColumn, Entity as Vot, Model as VotModel};
