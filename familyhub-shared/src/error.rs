/// Error taxonomy for the service layer
///
/// Every service function returns `Result<T, ServiceError>`. The variants map
/// one-to-one onto the HTTP statuses the API reports (404, 403, 409, 422, 500);
/// the mapping itself lives in the API crate.
///
/// Any error returned from a service leaves the caller's transaction
/// uncommitted, so dropping it rolls back every write staged so far.

use crate::auth::authorization::AuthzError;

/// Service result type alias
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors raised by the service layer
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Referenced entity does not exist or is not visible in the requested family
    #[error("{0}")]
    NotFound(String),

    /// Entity exists but the acting user lacks membership or role
    #[error("{0}")]
    Forbidden(String),

    /// Application-level uniqueness violation
    #[error("{0}")]
    Conflict(String),

    /// Structurally valid but semantically invalid input
    #[error("{0}")]
    Unprocessable(String),

    /// Unexpected storage failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    /// Maps a unique-constraint violation to `Conflict`, anything else to `Database`
    ///
    /// The service layer checks for duplicates before inserting, but two
    /// concurrent requests can both pass that check. The storage constraint
    /// catches the loser, and this turns its failure into the same `Conflict`
    /// the pre-check would have produced.
    pub fn conflict_on_unique(err: sqlx::Error, message: impl Into<String>) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ServiceError::Conflict(message.into())
            }
            _ => ServiceError::Database(err),
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::FamilyNotFound(_) => ServiceError::NotFound("Family not found.".to_string()),
            AuthzError::NotMember(_) => {
                ServiceError::Forbidden("Not authorized for this family.".to_string())
            }
            AuthzError::InsufficientRole { required, .. } => ServiceError::Forbidden(format!(
                "This action requires the '{}' role in the family.",
                required.as_str()
            )),
            AuthzError::DatabaseError(err) => ServiceError::Database(err),
        }
    }
}
