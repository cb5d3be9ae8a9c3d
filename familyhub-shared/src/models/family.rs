/// Family model and database operations
///
/// A family is the tenancy boundary: every label and task belongs to exactly
/// one family and is only visible to that family's members.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE families (
///     id BIGSERIAL PRIMARY KEY,
///     family_name VARCHAR(100) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use validator::Validate;

/// Family model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Family {
    /// Unique family ID
    pub id: i64,

    /// Display name, unique across families
    pub family_name: String,

    /// When the family was created
    pub created_at: DateTime<Utc>,

    /// When the family was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a family
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFamily {
    /// Family display name
    #[validate(length(min = 1, max = 100, message = "Family name must be 1-100 characters"))]
    pub family_name: String,
}

impl Family {
    /// Creates a new family
    ///
    /// # Errors
    ///
    /// Returns a database error carrying a unique violation if the name is
    /// already taken
    pub async fn create(conn: &mut PgConnection, data: &CreateFamily) -> Result<Self, sqlx::Error> {
        let family = sqlx::query_as::<_, Family>(
            r#"
            INSERT INTO families (family_name)
            VALUES ($1)
            RETURNING id, family_name, created_at, updated_at
            "#,
        )
        .bind(&data.family_name)
        .fetch_one(&mut *conn)
        .await?;

        Ok(family)
    }

    /// Finds a family by ID
    pub async fn find_by_id(conn: &mut PgConnection, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let family = sqlx::query_as::<_, Family>(
            r#"
            SELECT id, family_name, created_at, updated_at
            FROM families
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(family)
    }

    /// Finds a family by exact name (used for the duplicate check)
    pub async fn find_by_name(conn: &mut PgConnection, name: &str) -> Result<Option<Self>, sqlx::Error> {
        let family = sqlx::query_as::<_, Family>(
            r#"
            SELECT id, family_name, created_at, updated_at
            FROM families
            WHERE family_name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(family)
    }

    /// Checks whether a family row exists
    pub async fn exists(conn: &mut PgConnection, id: i64) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM families WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;

        Ok(exists)
    }

    /// Lists the families a user is a member of, ordered by ID
    pub async fn list_for_user(
        conn: &mut PgConnection,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let families = sqlx::query_as::<_, Family>(
            r#"
            SELECT f.id, f.family_name, f.created_at, f.updated_at
            FROM families f
            JOIN family_memberships m ON m.family_id = f.id
            WHERE m.user_id = $1
            ORDER BY f.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await?;

        Ok(families)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_family_validation() {
        let ok = CreateFamily {
            family_name: "Smith Family".to_string(),
        };
        assert!(ok.validate().is_ok());

        let empty = CreateFamily {
            family_name: String::new(),
        };
        assert!(empty.validate().is_err());

        let too_long = CreateFamily {
            family_name: "x".repeat(101),
        };
        assert!(too_long.validate().is_err());
    }
}
