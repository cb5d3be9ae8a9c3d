/// Label model and database operations
///
/// Labels are family-scoped tags attached to tasks through `task_labels`.
/// Every lookup here takes the family ID so a label from another family is
/// indistinguishable from a missing one.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE labels (
///     id BIGSERIAL PRIMARY KEY,
///     family_id BIGINT NOT NULL REFERENCES families(id) ON DELETE CASCADE,
///     name VARCHAR(50) NOT NULL,
///     color VARCHAR(7),
///     created_by_id BIGINT REFERENCES users(id) ON DELETE SET NULL,
///     updated_by_id BIGINT REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (family_id, name)
/// );
/// ```

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use validator::{Validate, ValidationError};

use super::double_option;

const LABEL_COLUMNS: &str =
    "id, family_id, name, color, created_by_id, updated_by_id, created_at, updated_at";

/// Label model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Label {
    pub id: i64,
    pub family_id: i64,
    pub name: String,
    /// Display color, e.g. `#FFDDC1`
    pub color: Option<String>,
    pub created_by_id: Option<i64>,
    pub updated_by_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a label
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLabel {
    #[validate(length(min = 1, max = 50, message = "Label name must be 1-50 characters"))]
    pub name: String,

    #[validate(length(max = 7, message = "Color must be at most 7 characters"))]
    pub color: Option<String>,
}

/// Partial label update
///
/// Absent fields are left untouched. `color: null` clears the color;
/// `name: null` is treated as absent since a label always has a name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_update_label"))]
pub struct UpdateLabel {
    #[validate(length(min = 1, max = 50, message = "Label name must be 1-50 characters"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub color: Option<Option<String>>,
}

fn validate_update_label(data: &UpdateLabel) -> Result<(), ValidationError> {
    if let Some(Some(color)) = &data.color {
        if color.chars().count() > 7 {
            let mut err = ValidationError::new("length");
            err.message = Some(Cow::from("Color must be at most 7 characters"));
            return Err(err);
        }
    }
    Ok(())
}

impl Label {
    /// Creates a label in a family with creator = updater = `user_id`
    ///
    /// # Errors
    ///
    /// Returns a unique violation if the name is already used in the family
    pub async fn create(
        conn: &mut PgConnection,
        family_id: i64,
        data: &CreateLabel,
        user_id: i64,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO labels (family_id, name, color, created_by_id, updated_by_id) \
             VALUES ($1, $2, $3, $4, $4) \
             RETURNING {LABEL_COLUMNS}"
        );

        let label = sqlx::query_as::<_, Label>(&sql)
            .bind(family_id)
            .bind(&data.name)
            .bind(&data.color)
            .bind(user_id)
            .fetch_one(&mut *conn)
            .await?;

        Ok(label)
    }

    /// Finds a label by ID, scoped to a family
    pub async fn find_in_family(
        conn: &mut PgConnection,
        label_id: i64,
        family_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {LABEL_COLUMNS} FROM labels WHERE id = $1 AND family_id = $2");

        let label = sqlx::query_as::<_, Label>(&sql)
            .bind(label_id)
            .bind(family_id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(label)
    }

    /// Finds a label by exact name within a family
    pub async fn find_by_name(
        conn: &mut PgConnection,
        family_id: i64,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {LABEL_COLUMNS} FROM labels WHERE family_id = $1 AND name = $2");

        let label = sqlx::query_as::<_, Label>(&sql)
            .bind(family_id)
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(label)
    }

    /// Loads the labels among `ids` that belong to the family, ordered by ID
    pub async fn find_many_in_family(
        conn: &mut PgConnection,
        family_id: i64,
        ids: &[i64],
    ) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {LABEL_COLUMNS} FROM labels WHERE family_id = $1 AND id = ANY($2) ORDER BY id"
        );

        let labels = sqlx::query_as::<_, Label>(&sql)
            .bind(family_id)
            .bind(ids)
            .fetch_all(&mut *conn)
            .await?;

        Ok(labels)
    }

    /// Lists a page of a family's labels in insertion order
    pub async fn list_by_family(
        conn: &mut PgConnection,
        family_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {LABEL_COLUMNS} FROM labels WHERE family_id = $1 ORDER BY id LIMIT $2 OFFSET $3"
        );

        let labels = sqlx::query_as::<_, Label>(&sql)
            .bind(family_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await?;

        Ok(labels)
    }

    /// Applies a partial update and stamps the updater
    ///
    /// # Returns
    ///
    /// The updated label, or None if it does not exist in the family
    pub async fn update(
        conn: &mut PgConnection,
        label_id: i64,
        family_id: i64,
        data: &UpdateLabel,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let (set_color, color) = match &data.color {
            Some(color) => (true, color.clone()),
            None => (false, None),
        };

        let sql = format!(
            "UPDATE labels \
             SET name = COALESCE($3, name), \
                 color = CASE WHEN $4 THEN $5 ELSE color END, \
                 updated_by_id = $6, \
                 updated_at = NOW() \
             WHERE id = $1 AND family_id = $2 \
             RETURNING {LABEL_COLUMNS}"
        );

        let label = sqlx::query_as::<_, Label>(&sql)
            .bind(label_id)
            .bind(family_id)
            .bind(&data.name)
            .bind(set_color)
            .bind(color)
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(label)
    }

    /// Deletes a label; its task associations go with it
    ///
    /// # Returns
    ///
    /// True if a row was deleted
    pub async fn delete(conn: &mut PgConnection, label_id: i64, family_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM labels WHERE id = $1 AND family_id = $2")
            .bind(label_id)
            .bind(family_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_label_validation() {
        let ok = CreateLabel {
            name: "Chores".to_string(),
            color: Some("#FFDDC1".to_string()),
        };
        assert!(ok.validate().is_ok());

        let long_color = CreateLabel {
            name: "Chores".to_string(),
            color: Some("#FFDDC1AA".to_string()),
        };
        assert!(long_color.validate().is_err());

        let empty_name = CreateLabel {
            name: String::new(),
            color: None,
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_update_label_distinguishes_null_from_absent() {
        let absent: UpdateLabel = serde_json::from_str(r#"{"name": "Errands"}"#).unwrap();
        assert_eq!(absent.name.as_deref(), Some("Errands"));
        assert!(absent.color.is_none());

        let cleared: UpdateLabel = serde_json::from_str(r#"{"color": null}"#).unwrap();
        assert_eq!(cleared.color, Some(None));

        let set: UpdateLabel = serde_json::from_str(r##"{"color": "#000000"}"##).unwrap();
        assert_eq!(set.color, Some(Some("#000000".to_string())));
    }

    #[test]
    fn test_update_label_validation() {
        let too_long: UpdateLabel = serde_json::from_str(r##"{"color": "#12345678"}"##).unwrap();
        assert!(too_long.validate().is_err());

        let empty_name: UpdateLabel = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert!(empty_name.validate().is_err());

        let clear: UpdateLabel = serde_json::from_str(r#"{"color": null}"#).unwrap();
        assert!(clear.validate().is_ok());
    }
}
