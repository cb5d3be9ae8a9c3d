/// Family service
///
/// Family creation is the one family-scoped write that does not require a
/// prior membership: the creator becomes the family's first admin in the
/// same transaction.

use sqlx::PgConnection;
use tracing::info;

use crate::auth::authorization::{require_family_membership, require_family_role};
use crate::auth::CurrentUser;
use crate::error::{ServiceError, ServiceResult};
use crate::models::family::{CreateFamily, Family};
use crate::models::membership::{AddMember, CreateMembership, Membership, MembershipRole};
use crate::models::user::User;
use crate::services::Pagination;

const DUPLICATE_FAMILY: &str = "Family with this name already exists.";

/// Creates a family and makes `owner` its admin
///
/// # Errors
///
/// - `ServiceError::Conflict` if a family with the same name exists
pub async fn create_family_with_owner(
    conn: &mut PgConnection,
    data: &CreateFamily,
    owner: &CurrentUser,
) -> ServiceResult<Family> {
    if Family::find_by_name(&mut *conn, &data.family_name).await?.is_some() {
        return Err(ServiceError::Conflict(DUPLICATE_FAMILY.to_string()));
    }

    let family = Family::create(&mut *conn, data)
        .await
        .map_err(|e| ServiceError::conflict_on_unique(e, DUPLICATE_FAMILY))?;

    Membership::create(
        &mut *conn,
        CreateMembership {
            family_id: family.id,
            user_id: owner.id,
            role: MembershipRole::Admin,
        },
    )
    .await?;

    info!(
        family_id = family.id,
        user_id = owner.id,
        family_name = %family.family_name,
        "Family created with owner membership"
    );

    Ok(family)
}

/// Returns a family the user belongs to
///
/// # Errors
///
/// - `ServiceError::NotFound` if the family does not exist
/// - `ServiceError::Forbidden` if the user is not a member
pub async fn get_family_or_forbidden(
    conn: &mut PgConnection,
    family_id: i64,
    user: &CurrentUser,
) -> ServiceResult<Family> {
    require_family_membership(&mut *conn, family_id, user.id).await?;

    Family::find_by_id(&mut *conn, family_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Family not found.".to_string()))
}

/// Lists the families the user is a member of
pub async fn list_families_for_user(
    conn: &mut PgConnection,
    user: &CurrentUser,
    page: Pagination,
) -> ServiceResult<Vec<Family>> {
    let families = Family::list_for_user(&mut *conn, user.id, page.limit, page.skip).await?;
    Ok(families)
}

/// Adds an existing user to a family; only admins may do this
///
/// # Errors
///
/// - `ServiceError::NotFound` if the family or the user does not exist
/// - `ServiceError::Forbidden` if the actor is not an admin of the family
/// - `ServiceError::Conflict` if the user is already a member
pub async fn add_member(
    conn: &mut PgConnection,
    family_id: i64,
    actor: &CurrentUser,
    data: &AddMember,
) -> ServiceResult<Membership> {
    require_family_role(&mut *conn, family_id, actor.id, MembershipRole::Admin).await?;

    if User::find_by_id(&mut *conn, data.user_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!(
            "User with ID {} not found.",
            data.user_id
        )));
    }

    let duplicate = format!("User {} is already a member of this family.", data.user_id);

    if Membership::is_member(&mut *conn, family_id, data.user_id).await? {
        return Err(ServiceError::Conflict(duplicate));
    }

    let membership = Membership::create(
        &mut *conn,
        CreateMembership {
            family_id,
            user_id: data.user_id,
            role: data.role,
        },
    )
    .await
    .map_err(|e| ServiceError::conflict_on_unique(e, duplicate))?;

    info!(
        family_id,
        user_id = data.user_id,
        added_by = actor.id,
        role = membership.role.as_str(),
        "Member added to family"
    );

    Ok(membership)
}

/// Lists a family's memberships, oldest first
pub async fn list_members(
    conn: &mut PgConnection,
    family_id: i64,
    user: &CurrentUser,
) -> ServiceResult<Vec<Membership>> {
    require_family_membership(&mut *conn, family_id, user.id).await?;

    let members = Membership::list_by_family(&mut *conn, family_id).await?;
    Ok(members)
}

// Database-backed tests live in tests/family_service_tests.rs
