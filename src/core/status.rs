//! Status registry - The fixed set of workflow states and their catalog ids.
//!
//! Requests store a `status_id` foreign key into the `statuses` table. Code never
//! branches on the stored name; it converts the id into [`RequestStatus`] and matches
//! on the enum. The catalog is seeded with fixed ids so the mapping is stable.

use crate::{
    entities::{Status, status},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use std::fmt;
use tracing::debug;

/// Workflow state of a purchase request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    /// Submitted and awaiting a decision (initial state)
    Pending,
    /// Approved by an approver (terminal)
    Approved,
    /// Rejected by an approver (terminal)
    Rejected,
}

impl RequestStatus {
    /// Every status, in catalog order
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    /// Catalog id of this status
    #[must_use]
    pub const fn id(self) -> i32 {
        match self {
            Self::Pending => 1,
            Self::Approved => 2,
            Self::Rejected => 3,
        }
    }

    /// Canonical catalog name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    const fn description(self) -> &'static str {
        match self {
            Self::Pending => "Waiting for approval",
            Self::Approved => "Request has been approved",
            Self::Rejected => "Request has been rejected",
        }
    }

    /// Resolves a catalog id.
    #[must_use]
    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.id() == id)
    }

    /// Resolves a status name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.name().eq_ignore_ascii_case(name))
    }

    /// Approved and Rejected are final; no transition leaves them.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Converts a stored `status_id` into a [`RequestStatus`].
///
/// An id outside the catalog means the row is corrupt, which is reported as a
/// `NotFound` on the status catalog.
pub fn status_from_id(status_id: i32) -> Result<RequestStatus> {
    RequestStatus::from_id(status_id).ok_or_else(|| Error::not_found("status", status_id))
}

/// Seeds the status catalog, inserting missing rows and refreshing descriptions.
///
/// Safe to run on every startup.
pub async fn seed_statuses<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    for state in RequestStatus::ALL {
        let existing = Status::find()
            .filter(status::Column::Name.eq(state.name()))
            .one(db)
            .await?;

        match existing {
            Some(row) if row.id != state.id() => {
                return Err(Error::Config {
                    message: format!(
                        "Status '{}' is catalogued with id {} but {} is required",
                        state.name(),
                        row.id,
                        state.id()
                    ),
                });
            }
            Some(row) => {
                let mut active: status::ActiveModel = row.into();
                active.description = Set(Some(state.description().to_string()));
                active.update(db).await?;
            }
            None => {
                status::ActiveModel {
                    id: Set(state.id()),
                    name: Set(state.name().to_string()),
                    description: Set(Some(state.description().to_string())),
                }
                .insert(db)
                .await?;
                debug!("Seeded status {}", state);
            }
        }
    }
    Ok(())
}

/// Looks up the catalog name for a status id.
pub async fn status_name(db: &DatabaseConnection, status_id: i32) -> Result<String> {
    Status::find_by_id(status_id)
        .one(db)
        .await?
        .map(|row| row.name)
        .ok_or_else(|| Error::not_found("status", status_id))
}

/// Returns the full status catalog ordered by id.
pub async fn get_status_catalog(db: &DatabaseConnection) -> Result<Vec<status::Model>> {
    use sea_orm::QueryOrder;

    Status::find()
        .order_by_asc(status::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
