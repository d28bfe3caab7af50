//! Purchase request aggregate - submission, editing, deletion and restore.
//!
//! A request and its items are written together in one database transaction. Submission
//! validates the budget, stamps the applicant's staff id, generates the reference code and
//! persists header and items atomically. Only the owner may edit, delete or restore a
//! request, and only while it is Pending. The reference code is never regenerated.
//!
//! Attachments live in a [`BlobStorage`]. A new blob is written before the transaction and
//! removed again if the transaction fails. A replaced blob is removed only after the new
//! path has been committed.

use crate::{
    config::database::{begin_write, is_lock_contention},
    core::{
        budget::validate_budget,
        input::{ItemInput, RequestHeader, normalize_location, validate_submission},
        reference::{LookupKind, resolve_selectable},
        reference_code::{CodeScope, is_reference_collision, next_reference_code},
        status::{RequestStatus, status_from_id},
        user::ensure_staff_id,
    },
    entities::{PurchaseItem, PurchaseRequest, User, purchase_item, purchase_request},
    errors::{Error, Result},
    storage::{AttachmentUpload, BlobStorage},
};
use chrono::Utc;
use sea_orm::{DatabaseTransaction, QueryOrder, Set, prelude::*};
use tracing::{info, instrument, warn};

/// How many times submission computes a reference code before giving up with `Conflict`.
/// Lock contention on the reference scope counts as a collision.
pub const MAX_REFERENCE_ATTEMPTS: usize = 2;

/// Everything the owner submits for a create or update
#[derive(Debug, Clone)]
pub struct Submission {
    pub header: RequestHeader,
    pub items: Vec<ItemInput>,
    /// New attachment; on update it replaces the current one
    pub attachment: Option<AttachmentUpload>,
}

impl Submission {
    pub const fn new(header: RequestHeader, items: Vec<ItemInput>) -> Self {
        Self {
            header,
            items,
            attachment: None,
        }
    }

    #[must_use]
    pub fn with_attachment(mut self, attachment: AttachmentUpload) -> Self {
        self.attachment = Some(attachment);
        self
    }

    fn validate(&self) -> Result<()> {
        validate_submission(&self.header, &self.items)?;
        validate_budget(self.header.budget, &self.items)?;
        if let Some(attachment) = &self.attachment {
            attachment.validate()?;
        }
        Ok(())
    }
}

/// A request header together with its live items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRequestDetail {
    pub request: purchase_request::Model,
    pub items: Vec<purchase_item::Model>,
}

impl PurchaseRequestDetail {
    /// Current workflow status.
    pub fn status(&self) -> Result<RequestStatus> {
        status_from_id(self.request.status_id)
    }
}

enum Attempt<T> {
    Persisted(T),
    Collision(String),
}

/// Loads a live (not tombstoned) request header.
async fn find_live_request<C>(db: &C, request_id: i64) -> Result<purchase_request::Model>
where
    C: ConnectionTrait,
{
    PurchaseRequest::find_by_id(request_id)
        .filter(purchase_request::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("purchase request", request_id))
}

async fn find_items<C>(db: &C, request_id: i64) -> Result<Vec<purchase_item::Model>>
where
    C: ConnectionTrait,
{
    PurchaseItem::find()
        .filter(purchase_item::Column::PurchaseRequestId.eq(request_id))
        .filter(purchase_item::Column::DeletedAt.is_null())
        .order_by_asc(purchase_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Ownership first, then state: a non-owner is always refused with `Forbidden`.
fn ensure_owner_and_pending(
    request: &purchase_request::Model,
    actor_id: i64,
    action: &str,
) -> Result<()> {
    if request.user_id != actor_id {
        return Err(Error::Forbidden);
    }
    if status_from_id(request.status_id)? != RequestStatus::Pending {
        return Err(Error::invalid_state(format!(
            "Only pending requests can be {action}."
        )));
    }
    Ok(())
}

async fn insert_items(
    txn: &DatabaseTransaction,
    request: &purchase_request::Model,
    items: &[ItemInput],
) -> Result<Vec<purchase_item::Model>> {
    let now = Utc::now();
    let mut persisted = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let total_price = item.resolved_total().ok_or_else(|| {
            Error::validation(format!("items.{index}.unit_price"), "The item total is too large.")
        })?;

        let row = purchase_item::ActiveModel {
            purchase_request_id: Set(request.id),
            purchase_ref_no: Set(Some(request.purchase_ref_no.clone())),
            item_name: Set(item.item_name.trim().to_string()),
            item_code: Set(item.item_code.clone()),
            purpose: Set(item.purpose.clone()),
            unit: Set(item.unit.clone()),
            quantity: Set(item.quantity),
            unit_price: Set(item.unit_price),
            total_price: Set(total_price),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        };
        persisted.push(row.insert(txn).await?);
    }

    Ok(persisted)
}

/// One submission attempt in its own transaction.
async fn try_submit(
    db: &DatabaseConnection,
    owner_id: i64,
    submission: &Submission,
    attachment_path: Option<&str>,
) -> Result<Attempt<PurchaseRequestDetail>> {
    let header = &submission.header;
    let txn = begin_write(db).await?;

    let owner = User::find_by_id(owner_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("user", owner_id))?;
    let owner_location = owner.location_iso_code.clone();
    let applicant_id = ensure_staff_id(&txn, owner).await?;

    resolve_selectable(
        &txn,
        LookupKind::TypeProcurement,
        header.type_procurement_id,
        "type_procurement_id",
    )
    .await?;
    resolve_selectable(
        &txn,
        LookupKind::FileReference,
        header.file_reference_id,
        "file_reference_id",
    )
    .await?;
    resolve_selectable(&txn, LookupKind::Vot, header.vot_id, "vot_id").await?;

    let location = header
        .location_iso_code
        .as_deref()
        .or(owner_location.as_deref())
        .map(normalize_location)
        .unwrap_or_default();

    let scope = CodeScope {
        location_iso_code: location.clone(),
        file_reference_id: header.file_reference_id,
        vot_id: header.vot_id,
    };
    let reference_code = next_reference_code(&txn, &scope).await?;

    let now = Utc::now();
    let row = purchase_request::ActiveModel {
        user_id: Set(owner_id),
        applicant_id: Set(applicant_id),
        title: Set(header.title.trim().to_string()),
        note: Set(header.note.clone()),
        budget: Set(header.budget),
        location_iso_code: Set(location),
        type_procurement_id: Set(header.type_procurement_id),
        file_reference_id: Set(header.file_reference_id),
        vot_id: Set(header.vot_id),
        status_id: Set(RequestStatus::Pending.id()),
        submitted_at: Set(now),
        approved_by: Set(None),
        approved_at: Set(None),
        approval_remarks: Set(None),
        purchase_ref_no: Set(reference_code.clone()),
        attachment_path: Set(attachment_path.map(str::to_string)),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    };

    let request = match row.insert(&txn).await {
        Ok(request) => request,
        Err(err) if is_reference_collision(&err) => {
            txn.rollback().await?;
            return Ok(Attempt::Collision(reference_code));
        }
        Err(err) => return Err(err.into()),
    };

    let items = insert_items(&txn, &request, &submission.items).await?;
    txn.commit().await?;

    Ok(Attempt::Persisted(PurchaseRequestDetail { request, items }))
}

/// Runs `attempt` until it persists, retrying collisions and lock contention up to
/// [`MAX_REFERENCE_ATTEMPTS`] times. Exhaustion is `Conflict`.
async fn retry_on_collision<T, F, Fut>(mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Attempt<T>>>,
{
    let mut last_code = None;
    for n in 1..=MAX_REFERENCE_ATTEMPTS {
        match attempt().await {
            Ok(Attempt::Persisted(value)) => return Ok(value),
            Ok(Attempt::Collision(code)) => {
                warn!(attempt = n, code = %code, "Reference code already taken");
                last_code = Some(code);
            }
            Err(Error::Database(err)) if is_lock_contention(&err) => {
                warn!(attempt = n, "Reference scope busy: {}", err);
            }
            Err(e) => return Err(e),
        }
    }

    let message = match last_code {
        Some(code) => format!("Reference code {code} is already in use; please resubmit."),
        None => "The reference code could not be allocated; please resubmit.".to_string(),
    };
    Err(Error::Conflict { message })
}

async fn submit_with_retry(
    db: &DatabaseConnection,
    owner_id: i64,
    submission: &Submission,
    attachment_path: Option<&str>,
) -> Result<PurchaseRequestDetail> {
    retry_on_collision(|| try_submit(db, owner_id, submission, attachment_path)).await
}

/// Removes a blob nothing references any more. Failures are logged, not returned.
async fn discard_blob<S: BlobStorage>(storage: &S, path: &str) {
    if let Err(e) = storage.delete(path).await {
        warn!("Failed to remove orphaned attachment {}: {}", path, e);
    }
}

/// Submits a new purchase request in the Pending state.
///
/// # Errors
/// - `Validation` for malformed input, budget violations or inactive lookups
/// - `NotFound` if the owner or a referenced lookup does not exist
/// - `Conflict` if the reference code keeps colliding after retry
#[instrument(skip(db, storage, submission))]
pub async fn create_purchase_request<S: BlobStorage>(
    db: &DatabaseConnection,
    storage: &S,
    owner_id: i64,
    submission: Submission,
) -> Result<PurchaseRequestDetail> {
    submission.validate()?;

    let attachment_path = match &submission.attachment {
        Some(upload) => Some(storage.store(upload).await?),
        None => None,
    };

    match submit_with_retry(db, owner_id, &submission, attachment_path.as_deref()).await {
        Ok(detail) => {
            info!(
                request_id = detail.request.id,
                reference = %detail.request.purchase_ref_no,
                "Purchase request submitted"
            );
            Ok(detail)
        }
        Err(e) => {
            if let Some(path) = &attachment_path {
                discard_blob(storage, path).await;
            }
            Err(e)
        }
    }
}

async fn apply_update(
    db: &DatabaseConnection,
    request_id: i64,
    actor_id: i64,
    submission: &Submission,
    new_attachment: Option<&str>,
) -> Result<purchase_request::Model> {
    let header = &submission.header;
    let txn = begin_write(db).await?;

    let current = find_live_request(&txn, request_id).await?;
    ensure_owner_and_pending(&current, actor_id, "edited")?;

    // Historical references stay valid; only a newly chosen lookup must be active.
    if header.type_procurement_id != current.type_procurement_id {
        resolve_selectable(
            &txn,
            LookupKind::TypeProcurement,
            header.type_procurement_id,
            "type_procurement_id",
        )
        .await?;
    }
    if header.file_reference_id != current.file_reference_id {
        resolve_selectable(
            &txn,
            LookupKind::FileReference,
            header.file_reference_id,
            "file_reference_id",
        )
        .await?;
    }
    if header.vot_id != current.vot_id {
        resolve_selectable(&txn, LookupKind::Vot, header.vot_id, "vot_id").await?;
    }

    let mut changes = purchase_request::ActiveModel {
        title: Set(header.title.trim().to_string()),
        note: Set(header.note.clone()),
        budget: Set(header.budget),
        type_procurement_id: Set(header.type_procurement_id),
        file_reference_id: Set(header.file_reference_id),
        vot_id: Set(header.vot_id),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    if let Some(location) = &header.location_iso_code {
        changes.location_iso_code = Set(normalize_location(location));
    }
    if let Some(path) = new_attachment {
        changes.attachment_path = Set(Some(path.to_string()));
    }

    // Guarded on Pending so a decision committed since the read above wins.
    let result = PurchaseRequest::update_many()
        .set(changes)
        .filter(purchase_request::Column::Id.eq(request_id))
        .filter(purchase_request::Column::StatusId.eq(RequestStatus::Pending.id()))
        .filter(purchase_request::Column::DeletedAt.is_null())
        .exec(&txn)
        .await?;
    if result.rows_affected != 1 {
        return Err(Error::invalid_state("Only pending requests can be edited."));
    }

    PurchaseItem::delete_many()
        .filter(purchase_item::Column::PurchaseRequestId.eq(request_id))
        .exec(&txn)
        .await?;

    let updated = find_live_request(&txn, request_id).await?;
    insert_items(&txn, &updated, &submission.items).await?;
    txn.commit().await?;

    Ok(current)
}

/// Edits a Pending request owned by `actor_id`, replacing its item set wholesale.
///
/// # Errors
/// - `NotFound` if the request does not exist (or is deleted)
/// - `Forbidden` if the actor is not the owner
/// - `InvalidState` unless the request is Pending
/// - `Validation` for malformed input, budget violations or newly selected inactive lookups
#[instrument(skip(db, storage, submission))]
pub async fn update_purchase_request<S: BlobStorage>(
    db: &DatabaseConnection,
    storage: &S,
    request_id: i64,
    actor_id: i64,
    submission: Submission,
) -> Result<PurchaseRequestDetail> {
    // Fail fast before storing a blob; apply_update re-checks under the write lock.
    let existing = find_live_request(db, request_id).await?;
    ensure_owner_and_pending(&existing, actor_id, "edited")?;
    submission.validate()?;

    let new_attachment = match &submission.attachment {
        Some(upload) => Some(storage.store(upload).await?),
        None => None,
    };

    let previous = match apply_update(
        db,
        request_id,
        actor_id,
        &submission,
        new_attachment.as_deref(),
    )
    .await
    {
        Ok(previous) => previous,
        Err(e) => {
            if let Some(path) = &new_attachment {
                discard_blob(storage, path).await;
            }
            return Err(e);
        }
    };

    // Committed: a leftover old blob is only logged.
    if new_attachment.is_some() {
        if let Some(old_path) = previous.attachment_path.as_deref() {
            discard_blob(storage, old_path).await;
        }
    }

    info!(request_id, "Purchase request updated");
    get_purchase_request(db, request_id)
        .await?
        .ok_or_else(|| Error::not_found("purchase request", request_id))
}

/// Deletes a Pending request owned by `actor_id`.
///
/// The request and its items are tombstoned in one transaction; the attachment is removed
/// once that has committed. The tombstoned request still counts towards its
/// reference-code scope.
///
/// # Errors
/// `NotFound`, `Forbidden` or `InvalidState` as for [`update_purchase_request`].
#[instrument(skip(db, storage))]
pub async fn delete_purchase_request<S: BlobStorage>(
    db: &DatabaseConnection,
    storage: &S,
    request_id: i64,
    actor_id: i64,
) -> Result<()> {
    let txn = begin_write(db).await?;

    let request = find_live_request(&txn, request_id).await?;
    ensure_owner_and_pending(&request, actor_id, "deleted")?;

    let now = Utc::now();
    let result = PurchaseRequest::update_many()
        .set(purchase_request::ActiveModel {
            deleted_at: Set(Some(now)),
            attachment_path: Set(None),
            updated_at: Set(now),
            ..Default::default()
        })
        .filter(purchase_request::Column::Id.eq(request_id))
        .filter(purchase_request::Column::StatusId.eq(RequestStatus::Pending.id()))
        .filter(purchase_request::Column::DeletedAt.is_null())
        .exec(&txn)
        .await?;
    if result.rows_affected != 1 {
        return Err(Error::invalid_state("Only pending requests can be deleted."));
    }

    PurchaseItem::update_many()
        .set(purchase_item::ActiveModel {
            deleted_at: Set(Some(now)),
            ..Default::default()
        })
        .filter(purchase_item::Column::PurchaseRequestId.eq(request_id))
        .filter(purchase_item::Column::DeletedAt.is_null())
        .exec(&txn)
        .await?;

    txn.commit().await?;

    if let Some(path) = request.attachment_path.as_deref() {
        discard_blob(storage, path).await;
    }
    info!(request_id, "Purchase request deleted");
    Ok(())
}

/// Restores a deleted request (and its items) for its owner.
///
/// # Errors
/// - `NotFound` if no such request exists
/// - `Forbidden` if the actor is not the owner
/// - `InvalidState` if the request is not deleted
#[instrument(skip(db))]
pub async fn restore_purchase_request(
    db: &DatabaseConnection,
    request_id: i64,
    actor_id: i64,
) -> Result<PurchaseRequestDetail> {
    let txn = begin_write(db).await?;

    let request = PurchaseRequest::find_by_id(request_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("purchase request", request_id))?;
    if request.user_id != actor_id {
        return Err(Error::Forbidden);
    }
    if request.deleted_at.is_none() {
        return Err(Error::invalid_state("Only deleted requests can be restored."));
    }

    PurchaseRequest::update_many()
        .set(purchase_request::ActiveModel {
            deleted_at: Set(None),
            updated_at: Set(Utc::now()),
            ..Default::default()
        })
        .filter(purchase_request::Column::Id.eq(request_id))
        .exec(&txn)
        .await?;

    // Replaced items are hard-deleted, so every tombstoned item went down with the request.
    PurchaseItem::update_many()
        .set(purchase_item::ActiveModel {
            deleted_at: Set(None),
            ..Default::default()
        })
        .filter(purchase_item::Column::PurchaseRequestId.eq(request_id))
        .filter(purchase_item::Column::DeletedAt.is_not_null())
        .exec(&txn)
        .await?;

    let restored = PurchaseRequestDetail {
        request: find_live_request(&txn, request_id).await?,
        items: find_items(&txn, request_id).await?,
    };
    txn.commit().await?;

    info!(request_id, "Purchase request restored");
    Ok(restored)
}

/// Finds a live request with its items.
pub async fn get_purchase_request(
    db: &DatabaseConnection,
    request_id: i64,
) -> Result<Option<PurchaseRequestDetail>> {
    let Some(request) = PurchaseRequest::find_by_id(request_id)
        .filter(purchase_request::Column::DeletedAt.is_null())
        .one(db)
        .await?
    else {
        return Ok(None);
    };
    let items = find_items(db, request_id).await?;
    Ok(Some(PurchaseRequestDetail { request, items }))
}

/// Finds a live request for its owner.
///
/// # Errors
/// `NotFound` if missing, `Forbidden` if `actor_id` is not the owner.
pub async fn get_owned_purchase_request(
    db: &DatabaseConnection,
    request_id: i64,
    actor_id: i64,
) -> Result<PurchaseRequestDetail> {
    let detail = get_purchase_request(db, request_id)
        .await?
        .ok_or_else(|| Error::not_found("purchase request", request_id))?;
    if detail.request.user_id != actor_id {
        return Err(Error::Forbidden);
    }
    Ok(detail)
}
