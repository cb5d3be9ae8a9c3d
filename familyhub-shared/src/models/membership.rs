/// Membership model and database operations
///
/// A membership links a user to a family with a role. At most one membership
/// exists per (user, family) pair.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE membership_role AS ENUM ('admin', 'member');
///
/// CREATE TABLE family_memberships (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     family_id BIGINT NOT NULL REFERENCES families(id) ON DELETE CASCADE,
///     role membership_role NOT NULL DEFAULT 'member',
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (user_id, family_id)
/// );
/// ```
///
/// # Roles
///
/// - **admin**: everything a member can do, plus adding members
/// - **member**: read and write the family's labels and tasks
///
/// # Example
///
/// ```no_run
/// use familyhub_shared::models::membership::{CreateMembership, Membership, MembershipRole};
/// use sqlx::PgConnection;
///
/// # async fn example(conn: &mut PgConnection, family_id: i64, user_id: i64) -> Result<(), sqlx::Error> {
/// Membership::create(conn, CreateMembership {
///     family_id,
///     user_id,
///     role: MembershipRole::Member,
/// }).await?;
///
/// assert!(Membership::is_member(conn, family_id, user_id).await?);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

/// Roles a user can hold within a family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "membership_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MembershipRole {
    /// Can manage the family's members
    Admin,

    /// Regular family member
    Member,
}

impl Default for MembershipRole {
    fn default() -> Self {
        MembershipRole::Member
    }
}

impl MembershipRole {
    /// Converts role to its storage/display string
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipRole::Admin => "admin",
            MembershipRole::Member => "member",
        }
    }

    /// Checks if this role has at least the permission level of `required`
    ///
    /// Hierarchy: Admin > Member
    pub fn has_permission(&self, required: &MembershipRole) -> bool {
        self.permission_level() >= required.permission_level()
    }

    fn permission_level(&self) -> u8 {
        match self {
            MembershipRole::Admin => 2,
            MembershipRole::Member => 1,
        }
    }
}

/// Membership model representing a user-family relationship
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Membership ID
    pub id: i64,

    /// User ID
    pub user_id: i64,

    /// Family ID
    pub family_id: i64,

    /// Role within the family
    pub role: MembershipRole,

    /// When the user joined the family
    pub joined_at: DateTime<Utc>,
}

/// Input for creating a new membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    /// Family ID
    pub family_id: i64,

    /// User ID
    pub user_id: i64,

    /// Role to assign (defaults to Member)
    #[serde(default)]
    pub role: MembershipRole,
}

/// Request to add an existing user to a family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMember {
    pub user_id: i64,

    #[serde(default)]
    pub role: MembershipRole,
}

impl Membership {
    /// Creates a new membership (adds a user to a family)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Membership already exists (unique constraint violation)
    /// - Family or user doesn't exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(conn: &mut PgConnection, data: CreateMembership) -> Result<Self, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO family_memberships (family_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, family_id, role, joined_at
            "#,
        )
        .bind(data.family_id)
        .bind(data.user_id)
        .bind(data.role)
        .fetch_one(&mut *conn)
        .await?;

        Ok(membership)
    }

    /// Checks if a user is a member of a family (any role)
    pub async fn is_member(
        conn: &mut PgConnection,
        family_id: i64,
        user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM family_memberships
                WHERE family_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(family_id)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(exists)
    }

    /// Gets a user's role in a family
    ///
    /// # Returns
    ///
    /// The user's role if they are a member, None otherwise
    pub async fn get_role(
        conn: &mut PgConnection,
        family_id: i64,
        user_id: i64,
    ) -> Result<Option<MembershipRole>, sqlx::Error> {
        let role: Option<MembershipRole> = sqlx::query_scalar(
            r#"
            SELECT role FROM family_memberships
            WHERE family_id = $1 AND user_id = $2
            "#,
        )
        .bind(family_id)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(role)
    }

    /// Lists all memberships of a family, oldest first
    pub async fn list_by_family(conn: &mut PgConnection, family_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let memberships = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, user_id, family_id, role, joined_at
            FROM family_memberships
            WHERE family_id = $1
            ORDER BY joined_at, id
            "#,
        )
        .bind(family_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(memberships)
    }
}
