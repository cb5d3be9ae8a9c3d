/// User endpoints
///
/// # Endpoints
///
/// - `GET /api/v1/users/me` - The user resolved from `X-User-Id`

use crate::{app::AppState, error::{ApiError, ApiResult}, response::ApiResponse};
use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use familyhub_shared::{auth::CurrentUser, models::user::User};
use serde::{Deserialize, Serialize};

/// Full user representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRead {
    pub id: i64,
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact user representation embedded in other resources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<User> for UserRead {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            avatar_url: user.avatar_url,
        }
    }
}

/// Returns the current user
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or unknown `X-User-Id`
/// - `404 Not Found`: User deleted after the middleware resolved it
pub async fn read_current_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<ApiResponse<UserRead>>> {
    let mut conn = state.db.acquire().await?;

    let user = User::find_by_id(&mut conn, current.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    Ok(Json(ApiResponse::data(UserRead::from(user))))
}
