//! User operations needed by the workflow.
//!
//! Account management belongs to the identity provider. The workflow only needs to create
//! fixture accounts and to make sure every applicant has a staff identifier.

use crate::{
    core::input::normalize_location,
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::debug;

/// Staff identifier assigned to accounts without one: `U` followed by the id, zero-padded
/// to five digits.
#[must_use]
pub fn format_staff_id(user_id: i64) -> String {
    format!("U{user_id:05}")
}

/// Creates a user account.
pub async fn create_user(
    db: &DatabaseConnection,
    name: String,
    email: String,
    staff_id: Option<String>,
    location_iso_code: Option<String>,
) -> Result<user::Model> {
    if name.trim().is_empty() {
        return Err(Error::validation("name", "The name field is required."));
    }
    if email.trim().is_empty() {
        return Err(Error::validation("email", "The email field is required."));
    }

    let user = user::ActiveModel {
        name: Set(name.trim().to_string()),
        email: Set(email.trim().to_lowercase()),
        staff_id: Set(staff_id),
        location_iso_code: Set(location_iso_code.map(|code| normalize_location(&code))),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    user.insert(db).await.map_err(Into::into)
}

/// Finds a user by id.
pub async fn get_user_by_id<C>(db: &C, user_id: i64) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Returns the user's staff id, generating and persisting one if it is missing.
///
/// Call this on the transaction of the submission so the assignment rolls back with it.
pub async fn ensure_staff_id<C>(db: &C, user: user::Model) -> Result<String>
where
    C: ConnectionTrait,
{
    if let Some(staff_id) = user.staff_id.as_deref().filter(|id| !id.trim().is_empty()) {
        return Ok(staff_id.to_string());
    }

    let staff_id = format_staff_id(user.id);
    let mut active: user::ActiveModel = user.into();
    active.staff_id = Set(Some(staff_id.clone()));
    active.update(db).await?;
    debug!("Assigned staff id {}", staff_id);
    Ok(staff_id)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;

    #[test]
    fn test_format_staff_id() {
        assert_eq!(format_staff_id(7), "U00007");
        assert_eq!(format_staff_id(123_456), "U123456");
    }

    #[tokio::test]
    async fn test_ensure_staff_id_assigns_once() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_user(
            &db,
            "Aina".to_string(),
            "Aina@Example.com".to_string(),
            None,
            Some("my-sgr".to_string()),
        )
        .await?;
        assert_eq!(user.email, "aina@example.com");
        assert_eq!(user.location_iso_code.as_deref(), Some("MY-SGR"));

        let staff_id = ensure_staff_id(&db, user.clone()).await?;
        assert_eq!(staff_id, format_staff_id(user.id));

        let reloaded = get_user_by_id(&db, user.id).await?.unwrap();
        assert_eq!(reloaded.staff_id.as_deref(), Some(staff_id.as_str()));
        assert_eq!(ensure_staff_id(&db, reloaded).await?, staff_id);
        Ok(())
    }

    #[tokio::test]
    async fn test_existing_staff_id_is_kept() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_user(
            &db,
            "Farid".to_string(),
            "farid@example.com".to_string(),
            Some("STF-001".to_string()),
            None,
        )
        .await?;
        assert_eq!(ensure_staff_id(&db, user).await?, "STF-001");
        Ok(())
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Sqlite).into_connection();
        let result = create_user(&db, " ".to_string(), "x@example.com".to_string(), None, None).await;
        assert!(matches!(result, Err(Error::Validation { ref field, .. }) if field == "name"));
    }
}
