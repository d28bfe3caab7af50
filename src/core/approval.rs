//! Approval workflow - the one-shot Pending → Approved/Rejected decision.
//!
//! Access control is the caller's concern; any approver id is accepted. The decision is
//! written with a status-guarded update inside a transaction, so of two approvers racing
//! on the same request exactly one succeeds and the other sees `InvalidState`.

use crate::{
    config::database::begin_write,
    core::status::{RequestStatus, status_from_id},
    entities::{PurchaseRequest, purchase_request},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use tracing::{info, instrument};

const MAX_COMMENT_LEN: usize = 1000;

/// Outcome an approver can record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    /// Status the request moves to.
    pub const fn target(self) -> RequestStatus {
        match self {
            Self::Approve => RequestStatus::Approved,
            Self::Reject => RequestStatus::Rejected,
        }
    }

    const fn past_tense(self) -> &'static str {
        match self {
            Self::Approve => "approved",
            Self::Reject => "rejected",
        }
    }
}

/// Trims the comment, treating blank as absent.
fn normalize_comment(comment: Option<String>) -> Result<Option<String>> {
    let comment = comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    if let Some(c) = &comment {
        if c.chars().count() > MAX_COMMENT_LEN {
            return Err(Error::validation(
                "comment",
                format!("The comment must not be greater than {MAX_COMMENT_LEN} characters."),
            ));
        }
    }
    Ok(comment)
}

/// Records `decision` on a Pending request.
///
/// Line items are not touched.
///
/// # Errors
/// - `Validation` if the comment is too long
/// - `NotFound` if the request does not exist (or is deleted)
/// - `InvalidState` unless the request is still Pending at write time
#[instrument(skip(db, comment))]
pub async fn decide_purchase_request(
    db: &DatabaseConnection,
    request_id: i64,
    approver_id: i64,
    decision: Decision,
    comment: Option<String>,
) -> Result<purchase_request::Model> {
    let comment = normalize_comment(comment)?;
    let refused = || {
        Error::invalid_state(format!(
            "Only pending requests can be {}.",
            decision.past_tense()
        ))
    };

    let txn = begin_write(db).await?;

    let current = PurchaseRequest::find_by_id(request_id)
        .filter(purchase_request::Column::DeletedAt.is_null())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("purchase request", request_id))?;
    if status_from_id(current.status_id)? != RequestStatus::Pending {
        return Err(refused());
    }

    let now = Utc::now();
    let result = PurchaseRequest::update_many()
        .set(purchase_request::ActiveModel {
            status_id: Set(decision.target().id()),
            approved_by: Set(Some(approver_id)),
            approved_at: Set(Some(now)),
            approval_remarks: Set(comment),
            updated_at: Set(now),
            ..Default::default()
        })
        .filter(purchase_request::Column::Id.eq(request_id))
        .filter(purchase_request::Column::StatusId.eq(RequestStatus::Pending.id()))
        .filter(purchase_request::Column::DeletedAt.is_null())
        .exec(&txn)
        .await?;
    // Someone else decided between our read and our write
    if result.rows_affected != 1 {
        return Err(refused());
    }

    let decided = PurchaseRequest::find_by_id(request_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("purchase request", request_id))?;
    txn.commit().await?;

    info!(
        request_id,
        approver_id,
        status = %decision.target(),
        "Purchase request decided"
    );
    Ok(decided)
}

/// Approves a Pending request. See [`decide_purchase_request`].
pub async fn approve_purchase_request(
    db: &DatabaseConnection,
    request_id: i64,
    approver_id: i64,
    comment: Option<String>,
) -> Result<purchase_request::Model> {
    decide_purchase_request(db, request_id, approver_id, Decision::Approve, comment).await
}

/// Rejects a Pending request. See [`decide_purchase_request`].
pub async fn reject_purchase_request(
    db: &DatabaseConnection,
    request_id: i64,
    approver_id: i64,
    comment: Option<String>,
) -> Result<purchase_request::Model> {
    decide_purchase_request(db, request_id, approver_id, Decision::Reject, comment).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::purchase_request::{
            Submission, create_purchase_request, delete_purchase_request, get_purchase_request,
        },
        test_utils::{
            MemoryBlobStorage, create_test_user, sample_header, sample_items, setup_pooled_test_db,
            setup_with_applicant,
        },
    };

    async fn submitted(db: &DatabaseConnection) -> Result<(purchase_request::Model, i64, i64)> {
        let lookups = crate::test_utils::seed_test_lookups(db).await?;
        let applicant = create_test_user(db, "applicant").await?;
        let approver = create_test_user(db, "manager").await?;
        let detail = create_purchase_request(
            db,
            &MemoryBlobStorage::new(),
            applicant.id,
            Submission::new(sample_header(&lookups), sample_items()),
        )
        .await?;
        Ok((detail.request, applicant.id, approver.id))
    }

    #[tokio::test]
    async fn test_approve_records_decision() -> Result<()> {
        let db = crate::test_utils::setup_test_db().await?;
        let (request, _, approver) = submitted(&db).await?;

        let approved =
            approve_purchase_request(&db, request.id, approver, Some("  Within budget ".into()))
                .await?;

        assert_eq!(approved.status_id, RequestStatus::Approved.id());
        assert_eq!(approved.approved_by, Some(approver));
        assert!(approved.approved_at.is_some());
        assert_eq!(approved.approval_remarks.as_deref(), Some("Within budget"));
        assert_eq!(approved.purchase_ref_no, request.purchase_ref_no);
        Ok(())
    }

    #[tokio::test]
    async fn test_decision_is_one_shot() -> Result<()> {
        let db = crate::test_utils::setup_test_db().await?;
        let (request, _, approver) = submitted(&db).await?;

        approve_purchase_request(&db, request.id, approver, None).await?;

        let again = approve_purchase_request(&db, request.id, approver, None).await;
        assert!(matches!(
            again,
            Err(Error::InvalidState { ref message }) if message == "Only pending requests can be approved."
        ));
        let flip = reject_purchase_request(&db, request.id, approver, Some("No".into())).await;
        assert!(matches!(
            flip,
            Err(Error::InvalidState { ref message }) if message == "Only pending requests can be rejected."
        ));

        let stored = get_purchase_request(&db, request.id).await?.unwrap();
        assert_eq!(stored.request.status_id, RequestStatus::Approved.id());
        assert!(stored.request.approval_remarks.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_reject_blank_comment_is_null() -> Result<()> {
        let db = crate::test_utils::setup_test_db().await?;
        let (request, _, approver) = submitted(&db).await?;

        let rejected = reject_purchase_request(&db, request.id, approver, Some("   ".into())).await?;
        assert_eq!(rejected.status_id, RequestStatus::Rejected.id());
        assert!(rejected.approval_remarks.is_none());
        assert_eq!(rejected.approved_by, Some(approver));

        let detail = get_purchase_request(&db, request.id).await?.unwrap();
        assert_eq!(detail.items.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_decisions_one_wins() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let db = setup_pooled_test_db(dir.path(), 4).await?;
        let (request, _, approver) = submitted(&db).await?;

        let (a, b) = tokio::join!(
            approve_purchase_request(&db, request.id, approver, None),
            reject_purchase_request(&db, request.id, approver, None)
        );

        let (winner, loser) = match (a, b) {
            (Ok(decided), Err(e)) | (Err(e), Ok(decided)) => (decided, e),
            (a, b) => panic!("expected exactly one decision, got {a:?} and {b:?}"),
        };
        assert!(matches!(loser, Error::InvalidState { .. }), "loser got {loser:?}");

        let stored = get_purchase_request(&db, request.id).await?.unwrap();
        assert_eq!(stored.request.status_id, winner.status_id);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_and_deleted_requests() -> Result<()> {
        let (db, lookups, applicant) = setup_with_applicant().await?;
        let storage = MemoryBlobStorage::new();

        let result = approve_purchase_request(&db, 77, applicant.id, None).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));

        let detail = create_purchase_request(
            &db,
            &storage,
            applicant.id,
            Submission::new(sample_header(&lookups), sample_items()),
        )
        .await?;
        delete_purchase_request(&db, &storage, detail.request.id, applicant.id).await?;

        let result = approve_purchase_request(&db, detail.request.id, applicant.id, None).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_comment_too_long() {
        let db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Sqlite).into_connection();
        let result = approve_purchase_request(&db, 1, 1, Some("x".repeat(1001))).await;
        assert!(matches!(result, Err(Error::Validation { ref field, .. }) if field == "comment"));
    }
}
