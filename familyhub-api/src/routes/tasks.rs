/// Task endpoints
///
/// All endpoints are scoped to a family the caller belongs to. Task bodies
/// carry the resolved assignee and labels alongside the raw IDs.
///
/// # Endpoints
///
/// - `POST /api/v1/families/:family_id/tasks/` - Create task
/// - `GET /api/v1/families/:family_id/tasks/` - List tasks (`skip`, `limit`)
/// - `GET /api/v1/families/:family_id/tasks/:task_id` - Get task
/// - `PUT /api/v1/families/:family_id/tasks/:task_id` - Partial update
/// - `DELETE /api/v1/families/:family_id/tasks/:task_id` - Delete task

use crate::{
    app::AppState,
    error::ApiResult,
    response::ApiResponse,
    routes::{labels::LabelSummary, users::UserSummary},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use familyhub_shared::{
    auth::CurrentUser,
    db::session,
    models::{
        routine::RoutineSettings,
        task::{CreateTask, TaskType, UpdateTask},
    },
    services::{
        task::{self as task_service, TaskDetails},
        Pagination,
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Task representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRead {
    pub id: i64,
    pub family_id: i64,
    pub title: String,
    pub notes: Option<String>,
    pub is_done: bool,
    pub task_type: TaskType,
    pub due_date: Option<NaiveDate>,
    pub next_occurrence_date: Option<NaiveDate>,
    pub priority: Option<i32>,
    pub routine_settings: Option<RoutineSettings>,
    pub parent_task_id: Option<i64>,
    pub assignee: Option<UserSummary>,
    pub labels: Vec<LabelSummary>,
    pub label_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TaskDetails> for TaskRead {
    fn from(details: TaskDetails) -> Self {
        let TaskDetails {
            task,
            assignee,
            labels,
        } = details;

        Self {
            id: task.id,
            family_id: task.family_id,
            title: task.title,
            notes: task.notes,
            is_done: task.is_done,
            task_type: task.task_type,
            due_date: task.due_date,
            next_occurrence_date: task.next_occurrence_date,
            priority: task.priority,
            routine_settings: task.routine_settings.map(|settings| settings.0),
            parent_task_id: task.parent_task_id,
            assignee: assignee.map(UserSummary::from),
            label_ids: labels.iter().map(|l| l.id).collect(),
            labels: labels.into_iter().map(LabelSummary::from).collect(),
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Create task
///
/// # Request Body
///
/// ```json
/// {
///   "title": "Take out trash",
///   "task_type": "routine",
///   "routine_settings": {"repeat_every": "weekly", "weekdays": [0, 3]},
///   "assignee_id": 2,
///   "label_ids": [1]
/// }
/// ```
///
/// # Errors
///
/// - `403 Forbidden` / `404 Not Found`: Membership check failed
/// - `404 Not Found`: Assignee, parent task or a label does not exist in the family
/// - `422 Unprocessable Entity`: Assignee is not a family member, or invalid body
pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    family_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CreateTask>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<TaskRead>>)> {
    let Path(family_id) = family_id?;
    let Json(req) = payload?;
    req.validate()?;

    let mut tx = session::begin(&state.db).await?;
    let details = task_service::create_task(&mut tx, &req, family_id, &user).await?;
    session::commit(tx).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            TaskRead::from(details),
            "Task created successfully.",
        )),
    ))
}

/// List tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    family_id: Result<Path<i64>, PathRejection>,
    page: Result<Query<Pagination>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<TaskRead>>>> {
    let Path(family_id) = family_id?;
    let Query(page) = page?;
    page.validate()?;

    let mut tx = session::begin(&state.db).await?;
    let tasks = task_service::list_tasks(&mut tx, family_id, &user, page).await?;
    session::commit(tx).await?;

    Ok(Json(ApiResponse::data(
        tasks.into_iter().map(TaskRead::from).collect(),
    )))
}

/// Get task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ids: Result<Path<(i64, i64)>, PathRejection>,
) -> ApiResult<Json<ApiResponse<TaskRead>>> {
    let Path((family_id, task_id)) = ids?;

    let mut tx = session::begin(&state.db).await?;
    let details = task_service::get_task(&mut tx, task_id, family_id, &user).await?;
    session::commit(tx).await?;

    Ok(Json(ApiResponse::data(TaskRead::from(details))))
}

/// Update task
///
/// Only fields present in the body change. `null` clears nullable fields;
/// `label_ids` replaces the whole label set.
///
/// # Errors
///
/// - `404 Not Found`: Task, new parent, new assignee or a label not in the family
/// - `422 Unprocessable Entity`: Assignee not a member, or the new parent is
///   the task itself or one of its subtasks
pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ids: Result<Path<(i64, i64)>, PathRejection>,
    payload: Result<Json<UpdateTask>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<TaskRead>>> {
    let Path((family_id, task_id)) = ids?;
    let Json(req) = payload?;
    req.validate()?;

    let mut tx = session::begin(&state.db).await?;
    let details = task_service::update_task(&mut tx, task_id, &req, family_id, &user).await?;
    session::commit(tx).await?;

    Ok(Json(ApiResponse::with_message(
        TaskRead::from(details),
        "Task updated successfully.",
    )))
}

/// Delete task
///
/// Subtasks are kept and detached from the deleted parent.
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ids: Result<Path<(i64, i64)>, PathRejection>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let Path((family_id, task_id)) = ids?;

    let mut tx = session::begin(&state.db).await?;
    task_service::delete_task(&mut tx, task_id, family_id, &user).await?;
    session::commit(tx).await?;

    Ok(Json(ApiResponse::message("Task deleted successfully.")))
}
