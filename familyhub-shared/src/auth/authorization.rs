/// Family-scoped authorization checks
///
/// Every family-scoped read or write (anything other than creating a family)
/// starts with [`require_family_membership`]: the family must exist, and the
/// acting user must hold a membership in it.
///
/// Existence is checked first, so a missing family is reported as not found
/// even to users who could never have been members of it.
///
/// # Example
///
/// ```no_run
/// use familyhub_shared::auth::authorization::require_family_membership;
/// use sqlx::PgConnection;
///
/// # async fn example(conn: &mut PgConnection) -> Result<(), Box<dyn std::error::Error>> {
/// require_family_membership(conn, 1, 42).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgConnection;
use tracing::{debug, warn};

use crate::models::family::Family;
use crate::models::membership::{Membership, MembershipRole};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// The family does not exist
    #[error("Family {0} not found")]
    FamilyNotFound(i64),

    /// User is not a member of the family
    #[error("Not a member of family {0}")]
    NotMember(i64),

    /// User doesn't have required role
    #[error("Insufficient permissions: requires {required:?}, has {actual:?}")]
    InsufficientRole {
        required: MembershipRole,
        actual: MembershipRole,
    },

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Checks that a family exists and that a user is a member of it
///
/// # Errors
///
/// - `AuthzError::FamilyNotFound` if the family row is absent
/// - `AuthzError::NotMember` if no membership links the user to the family
pub async fn require_family_membership(
    conn: &mut PgConnection,
    family_id: i64,
    user_id: i64,
) -> Result<(), AuthzError> {
    if !Family::exists(&mut *conn, family_id).await? {
        warn!(family_id, "Auth check failed: family not found");
        return Err(AuthzError::FamilyNotFound(family_id));
    }

    if !Membership::is_member(&mut *conn, family_id, user_id).await? {
        warn!(family_id, user_id, "Auth check failed: user is not a member");
        return Err(AuthzError::NotMember(family_id));
    }

    debug!(family_id, user_id, "Auth check passed");
    Ok(())
}

/// Checks that a user holds at least `required_role` in an existing family
///
/// Performs the same existence check as [`require_family_membership`] first.
pub async fn require_family_role(
    conn: &mut PgConnection,
    family_id: i64,
    user_id: i64,
    required_role: MembershipRole,
) -> Result<(), AuthzError> {
    if !Family::exists(&mut *conn, family_id).await? {
        warn!(family_id, "Role check failed: family not found");
        return Err(AuthzError::FamilyNotFound(family_id));
    }

    let role = Membership::get_role(&mut *conn, family_id, user_id)
        .await?
        .ok_or(AuthzError::NotMember(family_id))?;

    if !role.has_permission(&required_role) {
        warn!(
            family_id,
            user_id,
            role = role.as_str(),
            required = required_role.as_str(),
            "Role check failed"
        );
        return Err(AuthzError::InsufficientRole {
            required: required_role,
            actual: role,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authz_error_display() {
        let err = AuthzError::NotMember(3);
        assert!(err.to_string().contains("Not a member"));

        let err = AuthzError::FamilyNotFound(3);
        assert_eq!(err.to_string(), "Family 3 not found");

        let err = AuthzError::InsufficientRole {
            required: MembershipRole::Admin,
            actual: MembershipRole::Member,
        };
        assert!(err.to_string().contains("Admin"));
    }
}
