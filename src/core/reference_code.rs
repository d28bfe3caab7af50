//! Reference code generation - `AIM/{location}/{file_code}/{vot_code}/{running}`.
//!
//! The running number is sequential within a scope, the tuple
//! `(location_iso_code, file_reference_id, vot_id)`. It is computed as the number of
//! requests already in that scope (tombstoned ones included) plus one, inside the same
//! transaction that inserts the new header.
//!
//! Counting alone cannot stop two concurrent submissions from producing the same code.
//! The unique constraint on `purchase_requests.purchase_ref_no` rejects the second insert,
//! and [`is_reference_collision`] lets the caller recognise that failure and retry.

use crate::{
    entities::{FileReference, PurchaseRequest, Vot, purchase_request},
    errors::Result,
};
use sea_orm::{DbErr, PaginatorTrait, SqlErr, prelude::*};

/// Fixed prefix of every reference code
pub const REFERENCE_PREFIX: &str = "AIM";

const LOCATION_FALLBACK: &str = "LOC";
const FILE_FALLBACK: &str = "FILE";
const VOT_FALLBACK: &str = "VOT";

/// The scope within which running numbers are sequential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeScope {
    /// Normalized location tag, possibly empty
    pub location_iso_code: String,
    pub file_reference_id: i64,
    pub vot_id: i64,
}

fn or_fallback<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
}

/// Formats a reference code. Empty or missing parts are replaced by `LOC`, `FILE` and
/// `VOT`; the running number is written without zero padding.
#[must_use]
pub fn format_reference_code(
    location: &str,
    file_code: Option<&str>,
    vot_code: Option<&str>,
    running: u64,
) -> String {
    format!(
        "{REFERENCE_PREFIX}/{}/{}/{}/{running}",
        or_fallback(Some(location), LOCATION_FALLBACK),
        or_fallback(file_code, FILE_FALLBACK),
        or_fallback(vot_code, VOT_FALLBACK),
    )
}

/// Counts every request in the scope, including tombstoned ones.
pub async fn count_in_scope<C>(db: &C, scope: &CodeScope) -> Result<u64>
where
    C: ConnectionTrait,
{
    PurchaseRequest::find()
        .filter(purchase_request::Column::LocationIsoCode.eq(scope.location_iso_code.as_str()))
        .filter(purchase_request::Column::FileReferenceId.eq(scope.file_reference_id))
        .filter(purchase_request::Column::VotId.eq(scope.vot_id))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Computes the next reference code for the scope.
///
/// Must run on the transaction that will insert the request so the count and the insert
/// see the same snapshot.
pub async fn next_reference_code<C>(db: &C, scope: &CodeScope) -> Result<String>
where
    C: ConnectionTrait,
{
    let file_code = FileReference::find_by_id(scope.file_reference_id)
        .one(db)
        .await?
        .map(|row| row.file_code);
    let vot_code = Vot::find_by_id(scope.vot_id)
        .one(db)
        .await?
        .map(|row| row.vot_code);

    let running = count_in_scope(db, scope).await? + 1;

    Ok(format_reference_code(
        &scope.location_iso_code,
        file_code.as_deref(),
        vot_code.as_deref(),
        running,
    ))
}

/// True when the error is a unique-constraint violation on `purchase_ref_no`.
#[must_use]
pub fn is_reference_collision(err: &DbErr) -> bool {
    matches!(
        err.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(message)) if message.contains("purchase_ref_no")
    )
}
