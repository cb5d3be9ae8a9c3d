/// Label endpoints
///
/// All endpoints are scoped to a family the caller belongs to.
///
/// # Endpoints
///
/// - `POST /api/v1/families/:family_id/labels/` - Create label
/// - `GET /api/v1/families/:family_id/labels/` - List labels (`skip`, `limit`)
/// - `GET /api/v1/families/:family_id/labels/:label_id` - Get label
/// - `PUT /api/v1/families/:family_id/labels/:label_id` - Partial update
/// - `DELETE /api/v1/families/:family_id/labels/:label_id` - Delete label

use crate::{app::AppState, error::ApiResult, response::ApiResponse};
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
    models::label::{CreateLabel, Label, UpdateLabel},
    services::{label as label_service, Pagination},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Label representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelRead {
    pub id: i64,
    pub name: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact label representation embedded in tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelSummary {
    pub id: i64,
    pub name: String,
    pub color: Option<String>,
}

impl From<Label> for LabelRead {
    fn from(label: Label) -> Self {
        Self {
            id: label.id,
            name: label.name,
            color: label.color,
            created_at: label.created_at,
            updated_at: label.updated_at,
        }
    }
}

impl From<Label> for LabelSummary {
    fn from(label: Label) -> Self {
        Self {
            id: label.id,
            name: label.name,
            color: label.color,
        }
    }
}

/// Create label
///
/// # Request Body
///
/// ```json
/// { "name": "Chores", "color": "#FFDDC1" }
/// ```
///
/// # Errors
///
/// - `403 Forbidden` / `404 Not Found`: Membership check failed
/// - `409 Conflict`: Name already used in this family
pub async fn create_label(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    family_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CreateLabel>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<LabelRead>>)> {
    let Path(family_id) = family_id?;
    let Json(req) = payload?;
    req.validate()?;

    let mut tx = session::begin(&state.db).await?;
    let label = label_service::create_label(&mut tx, &req, family_id, &user).await?;
    session::commit(tx).await?;

    let message = format!("Label '{}' created successfully.", label.name);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(LabelRead::from(label), message)),
    ))
}

/// List labels
pub async fn list_labels(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    family_id: Result<Path<i64>, PathRejection>,
    page: Result<Query<Pagination>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<LabelRead>>>> {
    let Path(family_id) = family_id?;
    let Query(page) = page?;
    page.validate()?;

    let mut tx = session::begin(&state.db).await?;
    let labels = label_service::list_labels(&mut tx, family_id, &user, page).await?;
    session::commit(tx).await?;

    Ok(Json(ApiResponse::data(
        labels.into_iter().map(LabelRead::from).collect(),
    )))
}

/// Get label
///
/// A label belonging to another family is reported as `404 Not Found`.
pub async fn get_label(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ids: Result<Path<(i64, i64)>, PathRejection>,
) -> ApiResult<Json<ApiResponse<LabelRead>>> {
    let Path((family_id, label_id)) = ids?;

    let mut tx = session::begin(&state.db).await?;
    let label = label_service::get_label(&mut tx, label_id, family_id, &user).await?;
    session::commit(tx).await?;

    Ok(Json(ApiResponse::data(LabelRead::from(label))))
}

/// Update label
///
/// Only fields present in the body change; `"color": null` clears the color.
///
/// # Errors
///
/// - `404 Not Found`: Label not in this family
/// - `409 Conflict`: New name used by another label
pub async fn update_label(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ids: Result<Path<(i64, i64)>, PathRejection>,
    payload: Result<Json<UpdateLabel>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<LabelRead>>> {
    let Path((family_id, label_id)) = ids?;
    let Json(req) = payload?;
    req.validate()?;

    let mut tx = session::begin(&state.db).await?;
    let label = label_service::update_label(&mut tx, label_id, &req, family_id, &user).await?;
    session::commit(tx).await?;

    Ok(Json(ApiResponse::with_message(
        LabelRead::from(label),
        "Label updated successfully.",
    )))
}

/// Delete label
///
/// Tasks carrying the label simply lose it.
pub async fn delete_label(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ids: Result<Path<(i64, i64)>, PathRejection>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let Path((family_id, label_id)) = ids?;

    let mut tx = session::begin(&state.db).await?;
    label_service::delete_label(&mut tx, label_id, family_id, &user).await?;
    session::commit(tx).await?;

    Ok(Json(ApiResponse::message("Label deleted successfully.")))
}
