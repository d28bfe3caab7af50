//! Unified error type for the procurement workflow.
//!
//! Every fallible operation in the crate returns [`Result`]. The workflow-facing
//! variants (`Validation`, `NotFound`, `Forbidden`, `InvalidState`, `Conflict`) each map
//! to one stable [`ErrorCategory`] so a presentation layer can render them uniformly.

use sea_orm::DbErr;
use thiserror::Error;

/// Stable message category for each kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Input or budget rule violation, reported against a field
    Validation,
    /// A referenced row does not exist
    NotFound,
    /// The actor may not perform the operation
    Forbidden,
    /// The operation is not valid in the current lifecycle state
    State,
    /// Transient collision; the whole operation may be retried
    Conflict,
    /// Infrastructure failure (database, filesystem, configuration)
    Internal,
}

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// A field-scoped validation failure (`field` is e.g. `budget` or `items.2.unit_price`)
    #[error("{field}: {message}")]
    Validation {
        /// Field key the message belongs to
        field: String,
        /// Human-readable message
        message: String,
    },

    /// Referenced entity was not found
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind (e.g. "purchase request", "vot")
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// Actor is not allowed to act on the resource
    #[error("Forbidden")]
    Forbidden,

    /// Operation is invalid for the current workflow state
    #[error("{message}")]
    InvalidState {
        /// Describes the state the operation requires
        message: String,
    },

    /// Unresolved collision, safe to retry from the caller
    #[error("Conflict: {message}")]
    Conflict {
        /// What collided
        message: String,
    },

    /// Configuration loading or parsing error
    #[error("Configuration error: {message}")]
    Config {
        /// Details of the configuration problem
        message: String,
    },

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Filesystem error (attachment storage, config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Builds a [`Error::Validation`] for the given field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Builds a [`Error::NotFound`] for the given entity and id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Builds a [`Error::InvalidState`] with the given message.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Maps the error onto its stable message category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Forbidden => ErrorCategory::Forbidden,
            Self::InvalidState { .. } => ErrorCategory::State,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) => ErrorCategory::Internal,
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
