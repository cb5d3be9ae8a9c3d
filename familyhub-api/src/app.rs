/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use familyhub_api::{app::AppState, config::Config};
/// use familyhub_shared::db::pool::create_pool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.database.pool_config()?).await?;
/// let state = AppState::new(pool, config);
/// let app = familyhub_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::get,
    Router,
};
use familyhub_shared::{auth::CurrentUser, models::user::User};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Header carrying the acting user's ID
pub const USER_ID_HEADER: &str = "x-user-id";

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /                              # Welcome message (public)
/// ├── GET /health                        # Health check (public)
/// └── /api/v1/                           # Requires X-User-Id
///     ├── GET  /users/me
///     ├── /families/
///     │   ├── GET, POST /
///     │   ├── GET  /:family_id
///     │   └── GET, POST /:family_id/members/
///     ├── /families/:family_id/labels/
///     │   ├── GET, POST /
///     │   └── GET, PUT, DELETE /:label_id
///     └── /families/:family_id/tasks/
///         ├── GET, POST /
///         └── GET, PUT, DELETE /:task_id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Current user resolution (matched `/api/v1` routes only; unknown paths 404)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes
    let public_routes = Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check));

    let v1_routes = Router::new()
        .route("/users/me", get(routes::users::read_current_user))
        .route(
            "/families/",
            get(routes::families::list_families).post(routes::families::create_family),
        )
        .route("/families/:family_id", get(routes::families::get_family))
        .route(
            "/families/:family_id/members/",
            get(routes::families::list_members).post(routes::families::add_member),
        )
        .route(
            "/families/:family_id/labels/",
            get(routes::labels::list_labels).post(routes::labels::create_label),
        )
        .route(
            "/families/:family_id/labels/:label_id",
            get(routes::labels::get_label)
                .put(routes::labels::update_label)
                .delete(routes::labels::delete_label),
        )
        .route(
            "/families/:family_id/tasks/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/families/:family_id/tasks/:task_id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            current_user_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.cors_allows_any() {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                HeaderName::from_static(USER_ID_HEADER),
            ])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Parses the `X-User-Id` header value
fn parse_user_id(req: &Request) -> Result<i64, ApiError> {
    let raw = req
        .headers()
        .get(USER_ID_HEADER)
        .ok_or_else(|| ApiError::Unauthorized("Missing X-User-Id header".to_string()))?;

    raw.to_str()
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .ok_or_else(|| ApiError::Unauthorized("Invalid X-User-Id header".to_string()))
}

/// Current user middleware layer
///
/// Resolves the acting user from the `X-User-Id` header and injects a
/// `CurrentUser` into request extensions. The header is checked before any
/// database access; the lookup connection is returned to the pool before the
/// handler runs.
async fn current_user_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = parse_user_id(&req)?;

    let user = {
        let mut conn = state.db.acquire().await?;
        User::find_by_id(&mut conn, user_id).await?
    };

    let user = user.ok_or_else(|| {
        tracing::warn!(user_id, "Request for unknown user");
        ApiError::Unauthorized("Unknown user".to_string())
    })?;

    req.extensions_mut().insert(CurrentUser::from(user));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with(header: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/api/v1/users/me");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_parse_user_id() {
        assert_eq!(parse_user_id(&request_with(Some("42"))).unwrap(), 42);
        assert_eq!(parse_user_id(&request_with(Some(" 7 "))).unwrap(), 7);
    }

    #[test]
    fn test_parse_user_id_rejects_missing_or_invalid() {
        for header in [None, Some("abc"), Some(""), Some("1.5")] {
            let err = parse_user_id(&request_with(header)).unwrap_err();
            assert!(matches!(err, ApiError::Unauthorized(_)));
        }
    }
}
