/// User model and database operations
///
/// Users are identities provisioned by an external identity provider; the
/// `oidc_subject` column holds the provider's stable subject identifier.
/// A user belongs to families through memberships and may be the assignee,
/// creator or updater of tasks and labels.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     oidc_subject VARCHAR(255) NOT NULL UNIQUE,
///     email VARCHAR(255) UNIQUE,
///     name VARCHAR(100),
///     avatar_url VARCHAR(255),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use familyhub_shared::models::user::{CreateUser, User};
/// use sqlx::PgConnection;
///
/// # async fn example(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
/// let user = User::create(conn, CreateUser {
///     oidc_subject: "google|1234".to_string(),
///     email: Some("user@example.com".to_string()),
///     name: Some("Jane Doe".to_string()),
///     avatar_url: None,
/// }).await?;
///
/// let found = User::find_by_oidc_subject(conn, "google|1234").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

/// User model representing an identity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Subject identifier issued by the identity provider
    pub oidc_subject: String,

    /// Optional email address (unique when present)
    pub email: Option<String>,

    /// Optional display name
    pub name: Option<String>,

    /// Optional avatar/profile picture URL
    pub avatar_url: Option<String>,

    /// When the user was created
    pub created_at: DateTime<Utc>,

    /// When the user was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Subject identifier issued by the identity provider
    pub oidc_subject: String,

    /// Optional email address
    pub email: Option<String>,

    /// Optional display name
    pub name: Option<String>,

    /// Optional avatar URL
    pub avatar_url: Option<String>,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the subject or email already exists, or if the
    /// database connection fails
    pub async fn create(conn: &mut PgConnection, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (oidc_subject, email, name, avatar_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, oidc_subject, email, name, avatar_url, created_at, updated_at
            "#,
        )
        .bind(data.oidc_subject)
        .bind(data.email)
        .bind(data.name)
        .bind(data.avatar_url)
        .fetch_one(&mut *conn)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(conn: &mut PgConnection, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, oidc_subject, email, name, avatar_url, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(user)
    }

    /// Finds a user by identity-provider subject
    pub async fn find_by_oidc_subject(
        conn: &mut PgConnection,
        oidc_subject: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, oidc_subject, email, name, avatar_url, created_at, updated_at
            FROM users
            WHERE oidc_subject = $1
            "#,
        )
        .bind(oidc_subject)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(user)
    }

    /// Loads several users at once
    ///
    /// Unknown IDs are skipped. Results are ordered by ID.
    pub async fn find_many(conn: &mut PgConnection, ids: &[i64]) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, oidc_subject, email, name, avatar_url, created_at, updated_at
            FROM users
            WHERE id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(ids)
        .fetch_all(&mut *conn)
        .await?;

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_deserialize_optional_fields() {
        let data: CreateUser = serde_json::from_str(r#"{"oidc_subject": "dev|1"}"#).unwrap();
        assert_eq!(data.oidc_subject, "dev|1");
        assert!(data.email.is_none());
        assert!(data.name.is_none());
        assert!(data.avatar_url.is_none());
    }

    // Database operations are covered by the integration tests in tests/
}
