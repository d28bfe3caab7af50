//! Purchase orders raised against a vendor for an approved request.

use crate::{
    config::database::begin_write,
    core::{
        reference::{LookupKind, resolve_selectable},
        status::{RequestStatus, status_from_id},
    },
    entities::{
        PurchaseItem, PurchaseOrder, PurchaseOrderItem, PurchaseRequest, purchase_item,
        purchase_order, purchase_order_item, purchase_request,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, SqlErr, prelude::*};
use tracing::{info, instrument};

/// Status of a freshly raised order
pub const PO_STATUS_CREATED: &str = "Created";

/// An order header together with its items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseOrderDetail {
    pub order: purchase_order::Model,
    pub items: Vec<purchase_order_item::Model>,
}

fn already_raised(request_id: i64) -> Error {
    Error::Conflict {
        message: format!("A purchase order already exists for request {request_id}."),
    }
}

/// Raises the purchase order for an approved request, copying its items.
///
/// # Errors
/// - `NotFound` if the request or vendor does not exist
/// - `InvalidState` unless the request is Approved
/// - `Validation` if the vendor is inactive
/// - `Conflict` if the request already has an order
#[instrument(skip(db))]
pub async fn create_purchase_order(
    db: &DatabaseConnection,
    request_id: i64,
    vendor_id: i64,
) -> Result<PurchaseOrderDetail> {
    let txn = begin_write(db).await?;

    let request = PurchaseRequest::find_by_id(request_id)
        .filter(purchase_request::Column::DeletedAt.is_null())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("purchase request", request_id))?;
    if status_from_id(request.status_id)? != RequestStatus::Approved {
        return Err(Error::invalid_state(
            "Only approved requests can be turned into purchase orders.",
        ));
    }

    resolve_selectable(&txn, LookupKind::Vendor, vendor_id, "vendor_id").await?;

    let existing = PurchaseOrder::find()
        .filter(purchase_order::Column::ApprovedRequestId.eq(request_id))
        .count(&txn)
        .await?;
    if existing > 0 {
        return Err(already_raised(request_id));
    }

    let items = PurchaseItem::find()
        .filter(purchase_item::Column::PurchaseRequestId.eq(request_id))
        .filter(purchase_item::Column::DeletedAt.is_null())
        .order_by_asc(purchase_item::Column::Id)
        .all(&txn)
        .await?;
    let total_price: Decimal = items.iter().map(|item| item.total_price).sum();

    let now = Utc::now();
    let order = purchase_order::ActiveModel {
        po_number: Set(format!("PO-{request_id}-{}", now.timestamp())),
        approved_request_id: Set(request_id),
        vendor_id: Set(vendor_id),
        total_price: Set(total_price),
        status: Set(PO_STATUS_CREATED.to_string()),
        created_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => already_raised(request_id),
        _ => err.into(),
    })?;

    let mut copied = Vec::with_capacity(items.len());
    for item in &items {
        let row = purchase_order_item::ActiveModel {
            purchase_order_id: Set(order.id),
            item_name: Set(item.item_name.clone()),
            quantity: Set(item.quantity),
            unit_price: Set(item.unit_price),
            created_at: Set(now),
            ..Default::default()
        };
        copied.push(row.insert(&txn).await?);
    }

    txn.commit().await?;
    info!(
        po_number = %order.po_number,
        total = %total_price,
        "Purchase order created"
    );

    Ok(PurchaseOrderDetail {
        order,
        items: copied,
    })
}

/// Finds a live order with its items.
pub async fn get_purchase_order(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Option<PurchaseOrderDetail>> {
    let Some(order) = PurchaseOrder::find_by_id(order_id)
        .filter(purchase_order::Column::DeletedAt.is_null())
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let items = PurchaseOrderItem::find()
        .filter(purchase_order_item::Column::PurchaseOrderId.eq(order_id))
        .order_by_asc(purchase_order_item::Column::Id)
        .all(db)
        .await?;
    Ok(Some(PurchaseOrderDetail { order, items }))
}
