/// Family endpoints
///
/// # Endpoints
///
/// - `POST /api/v1/families/` - Create a family; the caller becomes its admin
/// - `GET /api/v1/families/` - List the caller's families
/// - `GET /api/v1/families/:family_id` - Get one family
/// - `GET /api/v1/families/:family_id/members/` - List members
/// - `POST /api/v1/families/:family_id/members/` - Add a member (admins only)

use crate::{
    app::AppState,
    error::ApiResult,
    response::ApiResponse,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use familyhub_shared::{
    auth::CurrentUser,
    db::session,
    models::{
        family::{CreateFamily, Family},
        membership::{AddMember, Membership, MembershipRole},
    },
    services::{family as family_service, Pagination},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Family representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyRead {
    pub id: i64,
    pub family_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Family> for FamilyRead {
    fn from(family: Family) -> Self {
        Self {
            id: family.id,
            family_name: family.family_name,
            created_at: family.created_at,
            updated_at: family.updated_at,
        }
    }
}

/// Membership representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipRead {
    pub user_id: i64,
    pub family_id: i64,
    pub role: MembershipRole,
    pub joined_at: DateTime<Utc>,
}

impl From<Membership> for MembershipRead {
    fn from(membership: Membership) -> Self {
        Self {
            user_id: membership.user_id,
            family_id: membership.family_id,
            role: membership.role,
            joined_at: membership.joined_at,
        }
    }
}

/// Create family
///
/// # Request Body
///
/// ```json
/// { "family_name": "Smith Family" }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: A family with this name exists
/// - `422 Unprocessable Entity`: Invalid name
pub async fn create_family(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<CreateFamily>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<FamilyRead>>)> {
    let Json(req) = payload?;
    req.validate()?;

    let mut tx = session::begin(&state.db).await?;
    let family = family_service::create_family_with_owner(&mut tx, &req, &user).await?;
    session::commit(tx).await?;

    let message = format!("Family '{}' created successfully.", family.family_name);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(FamilyRead::from(family), message)),
    ))
}

/// List the current user's families
pub async fn list_families(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    page: Result<Query<Pagination>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<FamilyRead>>>> {
    let Query(page) = page?;
    page.validate()?;

    let mut tx = session::begin(&state.db).await?;
    let families = family_service::list_families_for_user(&mut tx, &user, page).await?;
    session::commit(tx).await?;

    Ok(Json(ApiResponse::data(
        families.into_iter().map(FamilyRead::from).collect(),
    )))
}

/// Get family
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a member
/// - `404 Not Found`: Family does not exist
pub async fn get_family(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    family_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ApiResponse<FamilyRead>>> {
    let Path(family_id) = family_id?;

    let mut tx = session::begin(&state.db).await?;
    let family = family_service::get_family_or_forbidden(&mut tx, family_id, &user).await?;
    session::commit(tx).await?;

    Ok(Json(ApiResponse::data(FamilyRead::from(family))))
}

/// List family members
pub async fn list_members(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    family_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ApiResponse<Vec<MembershipRead>>>> {
    let Path(family_id) = family_id?;

    let mut tx = session::begin(&state.db).await?;
    let members = family_service::list_members(&mut tx, family_id, &user).await?;
    session::commit(tx).await?;

    Ok(Json(ApiResponse::data(
        members.into_iter().map(MembershipRead::from).collect(),
    )))
}

/// Add a member
///
/// # Request Body
///
/// ```json
/// { "user_id": 2, "role": "member" }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an admin of the family
/// - `404 Not Found`: Family or user does not exist
/// - `409 Conflict`: User is already a member
pub async fn add_member(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    family_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<AddMember>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<MembershipRead>>)> {
    let Path(family_id) = family_id?;
    let Json(req) = payload?;

    let mut tx = session::begin(&state.db).await?;
    let membership = family_service::add_member(&mut tx, family_id, &user, &req).await?;
    session::commit(tx).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            MembershipRead::from(membership),
            "Member added successfully.",
        )),
    ))
}
